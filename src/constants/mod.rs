//! Static reference data.

pub mod areas;
