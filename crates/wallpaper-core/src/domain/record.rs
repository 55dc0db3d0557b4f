//! Record model: one fetched wallpaper entry plus the date it is filed under.
//!
//! Records are schema-flexible. The system only looks at `id` and `date`;
//! everything else (title, url, ...) is passed through untouched and keeps
//! its original field order.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const ID_FIELD: &str = "id";
pub const DATE_FIELD: &str = "date";

const DATE_CODE_FORMAT: &str = "%Y%m%d";

/// An 8-digit `YYYYMMDD` calendar date.
///
/// Lexical order of the formatted code equals chronological order, which is
/// what the ledger sort relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateCode(NaiveDate);

impl DateCode {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for DateCode {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_CODE_FORMAT))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not an 8-digit date code: {0:?}")]
pub struct DateCodeParseError(pub String);

impl FromStr for DateCode {
    type Err = DateCodeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // chrono accepts shorter years and signs for %Y, so pin the shape first
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DateCodeParseError(s.to_string()));
        }
        NaiveDate::parse_from_str(s, DATE_CODE_FORMAT)
            .map(Self)
            .map_err(|_| DateCodeParseError(s.to_string()))
    }
}

/// A single ledger entry: an open JSON object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn id(&self) -> Option<&Value> {
        self.0.get(ID_FIELD)
    }

    /// Raw `date` value as stored, if it is a string.
    pub fn date_str(&self) -> Option<&str> {
        self.0.get(DATE_FIELD).and_then(Value::as_str)
    }

    pub fn has_date(&self) -> bool {
        self.0.contains_key(DATE_FIELD)
    }

    /// File the record under `date`, replacing any `date` the source sent.
    pub fn with_date(mut self, date: DateCode) -> Self {
        self.0
            .insert(DATE_FIELD.to_string(), Value::String(date.to_string()));
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }
}

impl TryFrom<Value> for Record {
    type Error = Value;

    /// Only JSON objects are records; anything else is handed back.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

/// Display an id the way it appears in logs (`abc`, not `"abc"`).
pub fn display_id(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
