//! Typed literal values and cell coercion.
//!
//! A [`Value`] is what sits in the object position of an attribute triple.
//! Raw dataset cells are coerced against the declared [`ValueType`] of the
//! property they feed; a blank cell becomes [`Value::Empty`], which still
//! participates in matching but is never serialized.

use std::hash::{Hash, Hasher};

use chrono::{NaiveDate, NaiveTime};

use crate::ontology::ValueType;

/// A typed literal.
#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    String(String),
    Date(NaiveDate),
    Time(NaiveTime),
    /// Always finite; see [`Value::coerce`].
    Double(f64),
    /// A blank cell.
    Empty,
}

impl Value {
    /// Coerce a raw cell to the given type.
    ///
    /// Returns `None` when the cell cannot be read as `ty`. Blank cells
    /// coerce to [`Value::Empty`] for every literal type. Entity links are
    /// never produced from cells.
    pub fn coerce(cell: &str, ty: ValueType) -> Option<Value> {
        let cell = cell.trim();
        if cell.is_empty() {
            return ty.is_literal().then_some(Value::Empty);
        }
        match ty {
            ValueType::Integer => cell.parse().ok().map(Value::Integer),
            ValueType::String => Some(Value::String(cell.to_string())),
            ValueType::Double => cell
                .parse::<f64>()
                .ok()
                .filter(|d| d.is_finite())
                .map(Value::Double),
            ValueType::Date => parse_date(cell).map(Value::Date),
            ValueType::Time => parse_time(cell).map(Value::Time),
            ValueType::Entity(_) => None,
        }
    }

    /// The literal type of this value, `None` for [`Value::Empty`].
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Value::Integer(_) => Some(ValueType::Integer),
            Value::String(_) => Some(ValueType::String),
            Value::Date(_) => Some(ValueType::Date),
            Value::Time(_) => Some(ValueType::Time),
            Value::Double(_) => Some(ValueType::Double),
            Value::Empty => None,
        }
    }

    /// Whether this value may fill a property of type `ty`.
    pub fn conforms_to(&self, ty: ValueType) -> bool {
        match self.value_type() {
            Some(actual) => actual == ty,
            None => ty.is_literal(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// Canonical lexical form (XSD style). Empty for [`Value::Empty`].
    pub fn lexical(&self) -> String {
        match self {
            Value::Integer(i) => i.to_string(),
            Value::String(s) => s.clone(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::Time(t) => t.format("%H:%M:%S").to_string(),
            Value::Double(d) => d.to_string(),
            Value::Empty => String::new(),
        }
    }

    /// Bit pattern used for equality and hashing of doubles (`-0.0 == 0.0`).
    fn double_bits(d: f64) -> u64 {
        if d == 0.0 { 0 } else { d.to_bits() }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => Self::double_bits(*a) == Self::double_bits(*b),
            (Value::Empty, Value::Empty) => true,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Integer(i) => i.hash(state),
            Value::String(s) => s.hash(state),
            Value::Date(d) => d.hash(state),
            Value::Time(t) => t.hash(state),
            Value::Double(d) => Self::double_bits(*d).hash(state),
            Value::Empty => {}
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s:?}"),
            Value::Empty => f.write_str("<empty>"),
            other => f.write_str(&other.lexical()),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

/// Dates arrive as `2019-02-09T00:00:00.000`, `2019-02-09`,
/// `02/09/2019 12:00:00 AM` or `02/09/2019`; any time-of-day part is dropped.
fn parse_date(cell: &str) -> Option<NaiveDate> {
    let date_part = cell.split(['T', ' ']).next().unwrap_or(cell);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%m/%d/%Y"))
        .ok()
}

/// Times arrive either as `HH:MM[:SS]` or as military `HHMM` with leading
/// zeros stripped (`930` is 09:30, `5` is 00:05).
fn parse_time(cell: &str) -> Option<NaiveTime> {
    if cell.contains(':') {
        return NaiveTime::parse_from_str(cell, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(cell, "%H:%M"))
            .ok();
    }
    if cell.is_empty() || cell.len() > 4 || !cell.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let military: u32 = cell.parse().ok()?;
    NaiveTime::from_hms_opt(military / 100, military % 100, 0)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn blank_cells_are_empty_for_literals() {
        assert_eq!(Value::coerce("", ValueType::Integer), Some(Value::Empty));
        assert_eq!(Value::coerce("   ", ValueType::Date), Some(Value::Empty));
        assert_eq!(
            Value::coerce("", ValueType::Entity(crate::ontology::EntityClass::Person)),
            None
        );
    }

    #[test]
    fn integers() {
        assert_eq!(Value::coerce("0101", ValueType::Integer), Some(Value::Integer(101)));
        assert_eq!(Value::coerce(" 34 ", ValueType::Integer), Some(Value::Integer(34)));
        assert_eq!(Value::coerce("-1", ValueType::Integer), Some(Value::Integer(-1)));
        assert_eq!(Value::coerce("34.5", ValueType::Integer), None);
        assert_eq!(Value::coerce("abc", ValueType::Integer), None);
    }

    #[test]
    fn doubles_reject_non_finite() {
        assert_eq!(
            Value::coerce("34.0508", ValueType::Double),
            Some(Value::Double(34.0508))
        );
        assert_eq!(Value::coerce("NaN", ValueType::Double), None);
        assert_eq!(Value::coerce("inf", ValueType::Double), None);
    }

    #[test]
    fn negative_zero_equals_zero() {
        let a = Value::Double(0.0);
        let b = Value::Double(-0.0);
        assert_eq!(a, b);
        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn date_formats() {
        let expected = Value::Date(NaiveDate::from_ymd_opt(2019, 2, 9).unwrap());
        for cell in [
            "2019-02-09T00:00:00.000",
            "2019-02-09",
            "02/09/2019 12:00:00 AM",
            "02/09/2019",
        ] {
            assert_eq!(Value::coerce(cell, ValueType::Date), Some(expected.clone()), "{cell}");
        }
        assert_eq!(Value::coerce("2019-13-01", ValueType::Date), None);
        assert_eq!(Value::coerce("yesterday", ValueType::Date), None);
    }

    #[test]
    fn time_formats() {
        let t = |h, m| Some(Value::Time(NaiveTime::from_hms_opt(h, m, 0).unwrap()));
        assert_eq!(Value::coerce("1700", ValueType::Time), t(17, 0));
        assert_eq!(Value::coerce("930", ValueType::Time), t(9, 30));
        assert_eq!(Value::coerce("5", ValueType::Time), t(0, 5));
        assert_eq!(Value::coerce("17:45", ValueType::Time), t(17, 45));
        assert_eq!(Value::coerce("17:45:00", ValueType::Time), t(17, 45));
        assert_eq!(Value::coerce("2460", ValueType::Time), None);
        assert_eq!(Value::coerce("12345", ValueType::Time), None);
    }

    #[test]
    fn strings_are_trimmed() {
        assert_eq!(Value::coerce("  M ", ValueType::String), Some(Value::from("M")));
    }

    #[test]
    fn conformance() {
        assert!(Value::Integer(1).conforms_to(ValueType::Integer));
        assert!(!Value::Integer(1).conforms_to(ValueType::String));
        assert!(Value::Empty.conforms_to(ValueType::Double));
    }

    #[test]
    fn lexical_forms() {
        let d = Value::coerce("2020-01-08", ValueType::Date).unwrap();
        assert_eq!(d.lexical(), "2020-01-08");
        let t = Value::coerce("0330", ValueType::Time).unwrap();
        assert_eq!(t.lexical(), "03:30:00");
        assert_eq!(Value::Double(-118.25).lexical(), "-118.25");
        assert_eq!(Value::Empty.lexical(), "");
    }
}
