//! Administrative areas of mainland China and the special regions.
//!
//! Province and prefecture names are static tables; district rows come from the
//! embedded `areas.json` and are grouped into province → city → district trees.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

const AREAS_JSON: &str = include_str!("areas.json");

/// Province code → province tree, built from the embedded data on first use.
pub static AREA_MAP: LazyLock<HashMap<String, Area>> =
    LazyLock::new(|| match build_area_map(AREAS_JSON) {
        Ok(areas) => areas,
        Err(e) => {
            tracing::error!(error = %e, "Failed to parse embedded area data");
            HashMap::new()
        }
    });

/// A node in the area tree. Districts have no children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Area {
    pub code: String,
    pub name: String,
    pub children: Vec<Area>,
}

/// One district row of the data file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaItem {
    pub code: String,
    pub name: String,
    pub city_code: String,
    pub province_code: String,
}

/// Group flat district rows into province trees keyed by province code.
///
/// Cities are ordered by code, districts keep their order in the input. Unknown
/// province or city codes get an empty name.
pub fn build_area_map(json: &str) -> Result<HashMap<String, Area>, serde_json::Error> {
    let items: Vec<AreaItem> = serde_json::from_str(json)?;

    let mut grouped: BTreeMap<String, BTreeMap<String, Vec<AreaItem>>> = BTreeMap::new();
    for item in items {
        grouped
            .entry(item.province_code.clone())
            .or_default()
            .entry(item.city_code.clone())
            .or_default()
            .push(item);
    }

    let areas = grouped
        .into_iter()
        .map(|(province_code, cities)| {
            let children = cities
                .into_iter()
                .map(|(city_code, districts)| Area {
                    name: city_name(&city_code).unwrap_or_default().to_string(),
                    code: city_code,
                    children: districts
                        .into_iter()
                        .map(|d| Area {
                            code: d.code,
                            name: d.name,
                            children: Vec::new(),
                        })
                        .collect(),
                })
                .collect();
            let province = Area {
                name: province_name(&province_code).unwrap_or_default().to_string(),
                code: province_code.clone(),
                children,
            };
            (province_code, province)
        })
        .collect();
    Ok(areas)
}

pub fn province_name(code: &str) -> Option<&'static str> {
    lookup(PROVINCES, code)
}

pub fn city_name(code: &str) -> Option<&'static str> {
    lookup(CITIES, code)
}

fn lookup(table: &'static [(&'static str, &'static str)], code: &str) -> Option<&'static str> {
    table
        .binary_search_by(|&(c, _)| c.cmp(code))
        .ok()
        .map(|i| table[i].1)
}

/// Province codes and names, sorted by code.
pub static PROVINCES: &[(&str, &str)] = &[
    ("11", "北京市"),
    ("12", "天津市"),
    ("13", "河北省"),
    ("14", "山西省"),
    ("15", "内蒙古自治区"),
    ("21", "辽宁省"),
    ("22", "吉林省"),
    ("23", "黑龙江省"),
    ("31", "上海市"),
    ("32", "江苏省"),
    ("33", "浙江省"),
    ("34", "安徽省"),
    ("35", "福建省"),
    ("36", "江西省"),
    ("37", "山东省"),
    ("41", "河南省"),
    ("42", "湖北省"),
    ("43", "湖南省"),
    ("44", "广东省"),
    ("45", "广西壮族自治区"),
    ("46", "海南省"),
    ("50", "重庆市"),
    ("51", "四川省"),
    ("52", "贵州省"),
    ("53", "云南省"),
    ("54", "西藏自治区"),
    ("61", "陕西省"),
    ("62", "甘肃省"),
    ("63", "青海省"),
    ("64", "宁夏回族自治区"),
    ("65", "新疆维吾尔自治区"),
    ("71", "台湾省"),
    ("81", "香港特别行政区"),
    ("82", "澳门特别行政区"),
];

/// Prefecture-level codes and names, sorted by code.
pub static CITIES: &[(&str, &str)] = &[
    ("1101", "市辖区"),
    ("1201", "市辖区"),
    ("1301", "石家庄市"),
    ("1302", "唐山市"),
    ("1303", "秦皇岛市"),
    ("1304", "邯郸市"),
    ("1305", "邢台市"),
    ("1306", "保定市"),
    ("1307", "张家口市"),
    ("1308", "承德市"),
    ("1309", "沧州市"),
    ("1310", "廊坊市"),
    ("1311", "衡水市"),
    ("1401", "太原市"),
    ("1402", "大同市"),
    ("1403", "阳泉市"),
    ("1404", "长治市"),
    ("1405", "晋城市"),
    ("1406", "朔州市"),
    ("1407", "晋中市"),
    ("1408", "运城市"),
    ("1409", "忻州市"),
    ("1410", "临汾市"),
    ("1411", "吕梁市"),
    ("1501", "呼和浩特市"),
    ("1502", "包头市"),
    ("1503", "乌海市"),
    ("1504", "赤峰市"),
    ("1505", "通辽市"),
    ("1506", "鄂尔多斯市"),
    ("1507", "呼伦贝尔市"),
    ("1508", "巴彦淖尔市"),
    ("1509", "乌兰察布市"),
    ("1522", "兴安盟"),
    ("1525", "锡林郭勒盟"),
    ("1529", "阿拉善盟"),
    ("2101", "沈阳市"),
    ("2102", "大连市"),
    ("2103", "鞍山市"),
    ("2104", "抚顺市"),
    ("2105", "本溪市"),
    ("2106", "丹东市"),
    ("2107", "锦州市"),
    ("2108", "营口市"),
    ("2109", "阜新市"),
    ("2110", "辽阳市"),
    ("2111", "盘锦市"),
    ("2112", "铁岭市"),
    ("2113", "朝阳市"),
    ("2114", "葫芦岛市"),
    ("2201", "长春市"),
    ("2202", "吉林市"),
    ("2203", "四平市"),
    ("2204", "辽源市"),
    ("2205", "通化市"),
    ("2206", "白山市"),
    ("2207", "松原市"),
    ("2208", "白城市"),
    ("2224", "延边朝鲜族自治州"),
    ("2301", "哈尔滨市"),
    ("2302", "齐齐哈尔市"),
    ("2303", "鸡西市"),
    ("2304", "鹤岗市"),
    ("2305", "双鸭山市"),
    ("2306", "大庆市"),
    ("2307", "伊春市"),
    ("2308", "佳木斯市"),
    ("2309", "七台河市"),
    ("2310", "牡丹江市"),
    ("2311", "黑河市"),
    ("2312", "绥化市"),
    ("2327", "大兴安岭地区"),
    ("3101", "市辖区"),
    ("3201", "南京市"),
    ("3202", "无锡市"),
    ("3203", "徐州市"),
    ("3204", "常州市"),
    ("3205", "苏州市"),
    ("3206", "南通市"),
    ("3207", "连云港市"),
    ("3208", "淮安市"),
    ("3209", "盐城市"),
    ("3210", "扬州市"),
    ("3211", "镇江市"),
    ("3212", "泰州市"),
    ("3213", "宿迁市"),
    ("3301", "杭州市"),
    ("3302", "宁波市"),
    ("3303", "温州市"),
    ("3304", "嘉兴市"),
    ("3305", "湖州市"),
    ("3306", "绍兴市"),
    ("3307", "金华市"),
    ("3308", "衢州市"),
    ("3309", "舟山市"),
    ("3310", "台州市"),
    ("3311", "丽水市"),
    ("3401", "合肥市"),
    ("3402", "芜湖市"),
    ("3403", "蚌埠市"),
    ("3404", "淮南市"),
    ("3405", "马鞍山市"),
    ("3406", "淮北市"),
    ("3407", "铜陵市"),
    ("3408", "安庆市"),
    ("3410", "黄山市"),
    ("3411", "滁州市"),
    ("3412", "阜阳市"),
    ("3413", "宿州市"),
    ("3415", "六安市"),
    ("3416", "亳州市"),
    ("3417", "池州市"),
    ("3418", "宣城市"),
    ("3501", "福州市"),
    ("3502", "厦门市"),
    ("3503", "莆田市"),
    ("3504", "三明市"),
    ("3505", "泉州市"),
    ("3506", "漳州市"),
    ("3507", "南平市"),
    ("3508", "龙岩市"),
    ("3509", "宁德市"),
    ("3601", "南昌市"),
    ("3602", "景德镇市"),
    ("3603", "萍乡市"),
    ("3604", "九江市"),
    ("3605", "新余市"),
    ("3606", "鹰潭市"),
    ("3607", "赣州市"),
    ("3608", "吉安市"),
    ("3609", "宜春市"),
    ("3610", "抚州市"),
    ("3611", "上饶市"),
    ("3701", "济南市"),
    ("3702", "青岛市"),
    ("3703", "淄博市"),
    ("3704", "枣庄市"),
    ("3705", "东营市"),
    ("3706", "烟台市"),
    ("3707", "潍坊市"),
    ("3708", "济宁市"),
    ("3709", "泰安市"),
    ("3710", "威海市"),
    ("3711", "日照市"),
    ("3713", "临沂市"),
    ("3714", "德州市"),
    ("3715", "聊城市"),
    ("3716", "滨州市"),
    ("3717", "菏泽市"),
    ("4101", "郑州市"),
    ("4102", "开封市"),
    ("4103", "洛阳市"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_sorted_for_lookup() {
        assert_eq!(PROVINCES.len(), 34);
        assert!(PROVINCES.windows(2).all(|w| w[0].0 < w[1].0));
        assert!(CITIES.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_name_lookups() {
        assert_eq!(province_name("11"), Some("北京市"));
        assert_eq!(province_name("82"), Some("澳门特别行政区"));
        assert_eq!(province_name("99"), None);
        assert_eq!(city_name("3301"), Some("杭州市"));
        assert_eq!(city_name("1101"), Some("市辖区"));
        assert_eq!(city_name("9901"), None);
    }

    #[test]
    fn test_groups_districts_under_cities() {
        let areas = build_area_map(
            r#"[
                {"code": "130102", "name": "长安区", "cityCode": "1301", "provinceCode": "13"},
                {"code": "130202", "name": "路南区", "cityCode": "1302", "provinceCode": "13"},
                {"code": "130104", "name": "桥西区", "cityCode": "1301", "provinceCode": "13"},
                {"code": "990101", "name": "某区", "cityCode": "9901", "provinceCode": "99"}
            ]"#,
        )
        .unwrap();

        assert_eq!(areas.len(), 2);
        let hebei = &areas["13"];
        assert_eq!(hebei.name, "河北省");
        let cities: Vec<&str> = hebei.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(cities, vec!["石家庄市", "唐山市"]);
        let districts: Vec<&str> = hebei.children[0]
            .children
            .iter()
            .map(|d| d.code.as_str())
            .collect();
        assert_eq!(districts, vec!["130102", "130104"]);
        assert!(hebei.children[0].children[0].children.is_empty());

        assert_eq!(areas["99"].name, "");
        assert_eq!(areas["99"].children[0].name, "");
    }

    #[test]
    fn test_rejects_malformed_data() {
        assert!(build_area_map("[{\"code\": \"110101\"}]").is_err());
    }

    #[test]
    fn test_embedded_data_loads() {
        let beijing = AREA_MAP.get("11").unwrap();
        assert_eq!(beijing.name, "北京市");
        assert_eq!(beijing.children[0].code, "1101");
        assert!(beijing.children[0].children.iter().any(|d| d.name == "东城区"));
        assert!(AREA_MAP.contains_key("33"));
    }
}
