use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The `{ global, countries }` shape returned by `GetTotals` (§4.B) and
/// rendered on `GET /count`, `count_response`, `countries_response`, and
/// `counter_update` frames (§6).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CounterTotals {
    pub global: i64,
    pub countries: HashMap<String, CountryTotal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryTotal {
    pub count: i64,
    pub country: String,
}
