//! `key=value` parameter records.
//!
//! Checkpoint settings are plain-text records, one `key=value` pair per
//! line. Values self-classify on parse: booleans, then integers, then
//! floats, then bare strings. [`ParameterSet`] keeps insertion order so
//! a record written back out matches the original line order.

use indexmap::IndexMap;
use std::fmt;

use crate::error::ParamError;

/// A parsed parameter value.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    /// `true` / `false` (the originating tool also writes `True`/`False`).
    Bool(bool),
    /// A value that parses as a signed integer.
    Int(i64),
    /// A value that parses as a float but not an integer.
    Float(f64),
    /// Anything else, verbatim.
    Str(String),
}

impl ParamValue {
    /// Classify a raw value string.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw {
            "true" | "True" => return Self::Bool(true),
            "false" | "False" => return Self::Bool(false),
            _ => {}
        }
        if let Ok(i) = raw.parse::<i64>() {
            Self::Int(i)
        } else if let Ok(x) = raw.parse::<f64>() {
            Self::Float(x)
        } else {
            Self::Str(raw.to_string())
        }
    }

    /// Name of the variant, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "a boolean",
            Self::Int(_) => "an integer",
            Self::Float(_) => "a float",
            Self::Str(_) => "a string",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => {
                let s = format!("{x}");
                // Keep the float classification through a write/parse cycle.
                if s.contains('.') || s.contains('e') || s.contains("inf") || s.contains("NaN") {
                    write!(f, "{s}")
                } else {
                    write!(f, "{s}.0")
                }
            }
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

/// An insertion-ordered record of named parameter values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParameterSet {
    values: IndexMap<String, ParamValue>,
}

impl ParameterSet {
    /// An empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a full record. Blank lines and lines starting with `#`
    /// are skipped; every other line must contain `=`.
    pub fn parse(text: &str) -> Result<Self, ParamError> {
        let mut set = Self::new();
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line.split_once('=').ok_or_else(|| ParamError::MalformedLine {
                line: idx + 1,
                content: line.to_string(),
            })?;
            set.insert(key.trim(), ParamValue::parse(value));
        }
        Ok(set)
    }

    /// Insert or overwrite a value.
    pub fn insert(&mut self, key: &str, value: ParamValue) {
        self.values.insert(key.to_string(), value);
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    /// Whether the record contains `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the record is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Boolean value of `key`, if present and boolean.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key) {
            Some(ParamValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Integer value of `key`, if present and integral.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.get(key) {
            Some(ParamValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// Float value of `key`; integers coerce.
    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.get(key) {
            Some(ParamValue::Float(x)) => Some(*x),
            Some(ParamValue::Int(i)) => Some(*i as f64),
            _ => None,
        }
    }

    /// String value of `key`, if present and a bare string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(ParamValue::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Boolean value of `key`, or an error naming what went wrong.
    pub fn require_bool(&self, key: &str) -> Result<bool, ParamError> {
        match self.get(key) {
            Some(ParamValue::Bool(b)) => Ok(*b),
            Some(other) => Err(self.wrong_type(key, "a boolean", other)),
            None => Err(self.missing(key)),
        }
    }

    /// Integer value of `key`, or an error naming what went wrong.
    pub fn require_int(&self, key: &str) -> Result<i64, ParamError> {
        match self.get(key) {
            Some(ParamValue::Int(i)) => Ok(*i),
            Some(other) => Err(self.wrong_type(key, "an integer", other)),
            None => Err(self.missing(key)),
        }
    }

    /// Float value of `key` (integers coerce), or an error.
    pub fn require_float(&self, key: &str) -> Result<f64, ParamError> {
        match self.get(key) {
            Some(ParamValue::Float(x)) => Ok(*x),
            Some(ParamValue::Int(i)) => Ok(*i as f64),
            Some(other) => Err(self.wrong_type(key, "a float", other)),
            None => Err(self.missing(key)),
        }
    }

    /// String value of `key`, or an error naming what went wrong.
    pub fn require_str(&self, key: &str) -> Result<&str, ParamError> {
        match self.get(key) {
            Some(ParamValue::Str(s)) => Ok(s.as_str()),
            Some(other) => Err(self.wrong_type(key, "a string", other)),
            None => Err(self.missing(key)),
        }
    }

    fn missing(&self, key: &str) -> ParamError {
        ParamError::MissingKey {
            key: key.to_string(),
        }
    }

    fn wrong_type(&self, key: &str, expected: &'static str, found: &ParamValue) -> ParamError {
        ParamError::WrongType {
            key: key.to_string(),
            expected,
            found: found.to_string(),
        }
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.iter() {
            writeln!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn classifies_values() {
        assert_eq!(ParamValue::parse("True"), ParamValue::Bool(true));
        assert_eq!(ParamValue::parse("false"), ParamValue::Bool(false));
        assert_eq!(ParamValue::parse("42"), ParamValue::Int(42));
        assert_eq!(ParamValue::parse("-1.5e-3"), ParamValue::Float(-1.5e-3));
        assert_eq!(
            ParamValue::parse("simple"),
            ParamValue::Str("simple".to_string())
        );
    }

    #[test]
    fn parses_record_and_keeps_order() {
        let set = ParameterSet::parse(
            "# solver settings\nproblem=simple\n\nenable_ns=True\ndt=0.08\nfolder=results\n",
        )
        .unwrap();
        let keys: Vec<&str> = set.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["problem", "enable_ns", "dt", "folder"]);
        assert_eq!(set.require_str("problem").unwrap(), "simple");
        assert!(set.require_bool("enable_ns").unwrap());
        assert_eq!(set.require_float("dt").unwrap(), 0.08);
    }

    #[test]
    fn malformed_line_names_its_position() {
        let err = ParameterSet::parse("a=1\nnot a pair\n").unwrap_err();
        assert_eq!(
            err,
            ParamError::MalformedLine {
                line: 2,
                content: "not a pair".to_string()
            }
        );
    }

    #[test]
    fn missing_and_wrong_type() {
        let set = ParameterSet::parse("dt=0.08").unwrap();
        assert!(matches!(
            set.require_int("steps"),
            Err(ParamError::MissingKey { .. })
        ));
        assert!(matches!(
            set.require_bool("dt"),
            Err(ParamError::WrongType { .. })
        ));
    }

    #[test]
    fn int_coerces_to_float() {
        let set = ParameterSet::parse("n=3").unwrap();
        assert_eq!(set.require_float("n").unwrap(), 3.0);
    }

    fn value_strategy() -> impl Strategy<Value = ParamValue> {
        prop_oneof![
            any::<bool>().prop_map(ParamValue::Bool),
            any::<i64>().prop_map(ParamValue::Int),
            proptest::num::f64::NORMAL.prop_map(ParamValue::Float),
            "[a-zA-Z_]{1,12}"
                .prop_filter("reserved words classify as booleans", |s| {
                    !matches!(s.as_str(), "true" | "false" | "True" | "False")
                        && s.parse::<f64>().is_err()
                })
                .prop_map(ParamValue::Str),
        ]
    }

    proptest! {
        #[test]
        fn display_parse_round_trip(value in value_strategy()) {
            prop_assert_eq!(ParamValue::parse(&value.to_string()), value);
        }

        #[test]
        fn record_round_trip(entries in proptest::collection::vec(("[a-z]{1,8}", value_strategy()), 0..8)) {
            let mut set = ParameterSet::new();
            for (key, value) in &entries {
                set.insert(key, value.clone());
            }
            let reparsed = ParameterSet::parse(&set.to_string()).unwrap();
            prop_assert_eq!(reparsed, set);
        }
    }
}
