use chrono::{DateTime, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// A persisted document: an ordered map of field name to value.
pub type Record = BTreeMap<String, Value>;

///
/// Value
///
/// The store's native value set. Structural equality on `Value` is the
/// equality used for snapshot-tuple matching and for the change-bridge diff;
/// the total order drives ordered scans.
///
/// Dates are represented as epoch-millisecond timestamps at the store
/// boundary and converted back to calendar dates by `from_record`.
///

#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum Value {
    Null,
    Nat(u32),
    Int(i64),
    Decimal(Decimal),
    Text(String),
    Timestamp(i64),
    List(Vec<Value>),
    Map(Record),
}

impl Value {
    /// Convert a calendar date to its stored timestamp form (midnight UTC).
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        let millis = date.and_time(NaiveTime::MIN).and_utc().timestamp_millis();

        Self::Timestamp(millis)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_nat(&self) -> Option<u32> {
        match self {
            Self::Nat(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Timestamp(millis) => {
                DateTime::from_timestamp_millis(*millis).map(|dt| dt.date_naive())
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_map(&self) -> Option<&Record> {
        match self {
            Self::Map(rec) => Some(rec),
            _ => None,
        }
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Nat(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Self::Decimal(d)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}
