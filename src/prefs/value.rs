use crate::semantics::Narrow;
use chrono::{DateTime, SecondsFormat, Utc};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use toml_edit::{Array, Datetime, Value};

/// A value stored in [`Preferences`](crate::Preferences).
///
/// This is the closed set of shapes the suite file can hold. Typed keys narrow
/// it back to Rust types through [`Narrow`].
#[derive(Debug, Clone, PartialEq)]
pub enum PrefValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Date(DateTime<Utc>),
    Array(Vec<PrefValue>),
}

impl PrefValue {
    /// Short name of the variant, used in log messages
    pub fn kind(&self) -> &'static str {
        match self {
            PrefValue::Bool(_) => "bool",
            PrefValue::Integer(_) => "integer",
            PrefValue::Float(_) => "float",
            PrefValue::String(_) => "string",
            PrefValue::Date(_) => "date",
            PrefValue::Array(_) => "array",
        }
    }

    /// Equality that treats floats bitwise, so a stored NaN matches itself.
    pub(crate) fn same_as(&self, other: &PrefValue) -> bool {
        match (self, other) {
            (PrefValue::Float(a), PrefValue::Float(b)) => a.to_bits() == b.to_bits(),
            (PrefValue::Array(a), PrefValue::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.same_as(b))
            }
            _ => self == other,
        }
    }

    pub(crate) fn to_toml(&self) -> Result<Value, String> {
        Ok(match self {
            PrefValue::Bool(b) => Value::from(*b),
            PrefValue::Integer(i) => Value::from(*i),
            PrefValue::Float(f) => Value::from(*f),
            PrefValue::String(s) => Value::from(s.as_str()),
            PrefValue::Date(date) => {
                let text = date.to_rfc3339_opts(SecondsFormat::AutoSi, true);
                let datetime = text
                    .parse::<Datetime>()
                    .map_err(|e| format!("date {} is not a TOML datetime: {}", text, e))?;
                Value::from(datetime)
            }
            PrefValue::Array(items) => {
                let array = items
                    .iter()
                    .map(PrefValue::to_toml)
                    .collect::<Result<Array, String>>()?;
                Value::Array(array)
            }
        })
    }

    /// Decodes a TOML value, or `None` for shapes preferences do not hold
    /// (inline tables and date-times without a UTC offset).
    pub(crate) fn from_toml(value: &Value) -> Option<PrefValue> {
        match value {
            Value::Boolean(b) => Some(PrefValue::Bool(*b.value())),
            Value::Integer(i) => Some(PrefValue::Integer(*i.value())),
            Value::Float(f) => Some(PrefValue::Float(*f.value())),
            Value::String(s) => Some(PrefValue::String(s.value().clone())),
            Value::Datetime(dt) => DateTime::parse_from_rfc3339(&dt.value().to_string())
                .ok()
                .map(|date| PrefValue::Date(date.with_timezone(&Utc))),
            Value::Array(array) => array
                .iter()
                .map(PrefValue::from_toml)
                .collect::<Option<Vec<_>>>()
                .map(PrefValue::Array),
            Value::InlineTable(_) => None,
        }
    }
}

impl Narrow<PrefValue> for PrefValue {
    fn erase(self) -> PrefValue {
        self
    }

    fn narrow(payload: &PrefValue) -> Option<Self> {
        Some(payload.clone())
    }
}

impl Narrow<PrefValue> for bool {
    fn erase(self) -> PrefValue {
        PrefValue::Bool(self)
    }

    fn narrow(payload: &PrefValue) -> Option<Self> {
        match payload {
            PrefValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl Narrow<PrefValue> for String {
    fn erase(self) -> PrefValue {
        PrefValue::String(self)
    }

    fn narrow(payload: &PrefValue) -> Option<Self> {
        match payload {
            PrefValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

// Every integer type that fits in an i64 both ways.
macro_rules! narrow_integer {
    ($($ty:ty),*) => {
        $(
            impl Narrow<PrefValue> for $ty {
                fn erase(self) -> PrefValue {
                    PrefValue::Integer(i64::from(self))
                }

                fn narrow(payload: &PrefValue) -> Option<Self> {
                    match payload {
                        PrefValue::Integer(i) => <$ty>::try_from(*i).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

narrow_integer!(i8, i16, i32, i64, u8, u16, u32);

impl Narrow<PrefValue> for f64 {
    fn erase(self) -> PrefValue {
        PrefValue::Float(self)
    }

    fn narrow(payload: &PrefValue) -> Option<Self> {
        match payload {
            PrefValue::Float(f) => Some(*f),
            // An integer reads as a float only when no precision is lost.
            PrefValue::Integer(i) => {
                let widened = *i as f64;
                (widened as i128 == i128::from(*i)).then_some(widened)
            }
            _ => None,
        }
    }
}

impl Narrow<PrefValue> for f32 {
    fn erase(self) -> PrefValue {
        PrefValue::Float(f64::from(self))
    }

    fn narrow(payload: &PrefValue) -> Option<Self> {
        match payload {
            PrefValue::Float(f) => {
                let narrowed = *f as f32;
                let exact = f64::from(narrowed) == *f || f.is_nan();
                exact.then_some(narrowed)
            }
            PrefValue::Integer(i) => {
                let widened = *i as f32;
                (widened as i128 == i128::from(*i)).then_some(widened)
            }
            _ => None,
        }
    }
}

impl Narrow<PrefValue> for DateTime<Utc> {
    fn erase(self) -> PrefValue {
        PrefValue::Date(self)
    }

    fn narrow(payload: &PrefValue) -> Option<Self> {
        match payload {
            PrefValue::Date(date) => Some(*date),
            _ => None,
        }
    }
}

impl Narrow<PrefValue> for SystemTime {
    fn erase(self) -> PrefValue {
        PrefValue::Date(system_time_to_utc(self))
    }

    fn narrow(payload: &PrefValue) -> Option<Self> {
        match payload {
            PrefValue::Date(date) => utc_to_system_time(date),
            _ => None,
        }
    }
}

/// Converts without panicking, clamping to the range `DateTime<Utc>` covers.
fn system_time_to_utc(time: SystemTime) -> DateTime<Utc> {
    let converted = match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_secs())
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, after.subsec_nanos())),
        Err(before) => {
            let before = before.duration();
            let (secs, nanos) = match before.subsec_nanos() {
                0 => (before.as_secs(), 0),
                n => (before.as_secs().saturating_add(1), 1_000_000_000 - n),
            };
            i64::try_from(secs)
                .ok()
                .and_then(|secs| DateTime::<Utc>::from_timestamp(-secs, nanos))
        }
    };
    converted.unwrap_or_else(|| {
        let clamped = if time > UNIX_EPOCH {
            DateTime::<Utc>::MAX_UTC
        } else {
            DateTime::<Utc>::MIN_UTC
        };
        log::warn!("clamping out-of-range timestamp {:?} to {}", time, clamped);
        clamped
    })
}

fn utc_to_system_time(date: &DateTime<Utc>) -> Option<SystemTime> {
    let secs = date.timestamp();
    let nanos = Duration::from_nanos(u64::from(date.timestamp_subsec_nanos()));
    if secs >= 0 {
        UNIX_EPOCH.checked_add(Duration::from_secs(secs.unsigned_abs()) + nanos)
    } else {
        UNIX_EPOCH
            .checked_sub(Duration::from_secs(secs.unsigned_abs()))?
            .checked_add(nanos)
    }
}

impl<V> Narrow<PrefValue> for Vec<V>
where
    V: Narrow<PrefValue>,
{
    fn erase(self) -> PrefValue {
        PrefValue::Array(self.into_iter().map(V::erase).collect())
    }

    fn narrow(payload: &PrefValue) -> Option<Self> {
        match payload {
            PrefValue::Array(items) => items.iter().map(V::narrow).collect(),
            _ => None,
        }
    }
}

impl From<bool> for PrefValue {
    fn from(value: bool) -> Self {
        PrefValue::Bool(value)
    }
}

impl From<i64> for PrefValue {
    fn from(value: i64) -> Self {
        PrefValue::Integer(value)
    }
}

impl From<f64> for PrefValue {
    fn from(value: f64) -> Self {
        PrefValue::Float(value)
    }
}

impl From<&str> for PrefValue {
    fn from(value: &str) -> Self {
        PrefValue::String(value.to_owned())
    }
}

impl From<String> for PrefValue {
    fn from(value: String) -> Self {
        PrefValue::String(value)
    }
}

impl From<DateTime<Utc>> for PrefValue {
    fn from(value: DateTime<Utc>) -> Self {
        PrefValue::Date(value)
    }
}
