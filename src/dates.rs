//! `YYYY-MM-DD` wire format for calendar days.

use serde::{Deserialize, Deserializer, Serializer};
use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime};

const ISO_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn parse(text: &str) -> Result<Date, time::error::Parse> {
    Date::parse(text.trim(), ISO_DATE)
}

pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
    let text = date.format(ISO_DATE).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&text)
}

pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => super::serialize(d, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Date>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(text) if !text.trim().is_empty() => {
                parse(&text).map(Some).map_err(serde::de::Error::custom)
            }
            _ => Ok(None),
        }
    }
}
