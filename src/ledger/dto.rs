use serde::Deserialize;
use time::Date;

#[derive(Debug, Deserialize)]
pub struct LogConsumptionRequest {
    pub food_id: i64,
    pub grams: f64,
    #[serde(default, with = "crate::dates::option")]
    pub consumed_on: Option<Date>,
}

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    #[serde(default, with = "crate::dates::option")]
    pub date: Option<Date>,
}
