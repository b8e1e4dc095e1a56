//! Canonical attribute values.
//!
//! Attribute maps reach the gateway from more than one place: decoded JSON-RPC
//! results, decoded HTTP request bodies, and occasionally raw wire text. Every
//! value goes through [`normalize`] before it is returned to a caller or merged
//! with new values, so downstream code only ever sees an [`AttributeValue`].

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::id::AccountId;

/// Open key/value map attached to volumes, snapshots and access groups.
pub type AttributeMap = BTreeMap<String, AttributeValue>;

/// A normalized attribute value.
///
/// `Fallback` carries the string rendering of a shape that has no scalar
/// equivalent (null, arrays, objects). On the wire it is a plain string, so it
/// compares equal to `Text` with the same content.
#[derive(Debug, Clone)]
pub enum AttributeValue {
    Integer(i32),
    Double(f64),
    Text(String),
    Boolean(bool),
    Fallback(String),
}

impl AttributeValue {
    /// String content for `Text` and `Fallback`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Fallback(s) => Some(s),
            _ => None,
        }
    }

    /// Interpret the value as an owning account id.
    ///
    /// Accepts integers, integral doubles and numeric strings, which covers the
    /// encodings the cluster and its clients use for `accountID` tags.
    pub fn as_account_id(&self) -> Option<AccountId> {
        match self {
            Self::Integer(i) => Some(AccountId::new(i64::from(*i))),
            Self::Double(d) if d.fract() == 0.0 && d.abs() < 9.0e15 => Some(AccountId::new(*d as i64)),
            Self::Text(s) | Self::Fallback(s) => s.trim().parse::<i64>().ok().map(AccountId::new),
            _ => None,
        }
    }
}

impl PartialEq for AttributeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (a, b) => match (a.as_str(), b.as_str()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl core::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Double(d) => write!(f, "{d}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Text(s) | Self::Fallback(s) => f.write_str(s),
        }
    }
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Integer(i) => serializer.serialize_i32(*i),
            Self::Double(d) => serializer.serialize_f64(*d),
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::Text(s) | Self::Fallback(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for AttributeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(raw.normalize())
    }
}

/// Conversion into the canonical representation.
///
/// Implementations must not fail: unknown shapes degrade to
/// [`AttributeValue::Fallback`].
pub trait Normalize {
    fn normalize(&self) -> AttributeValue;
}

impl Normalize for AttributeValue {
    fn normalize(&self) -> AttributeValue {
        self.clone()
    }
}

impl Normalize for Value {
    fn normalize(&self) -> AttributeValue {
        match self {
            Value::Number(n) => {
                if let Some(i) = n.as_i64().and_then(|i| i32::try_from(i).ok()) {
                    return AttributeValue::Integer(i);
                }
                match n.as_f64() {
                    Some(d) => AttributeValue::Double(d),
                    None => AttributeValue::Fallback(n.to_string()),
                }
            }
            Value::String(s) => AttributeValue::Text(s.clone()),
            Value::Bool(b) => AttributeValue::Boolean(*b),
            Value::Null => AttributeValue::Fallback(String::new()),
            other => AttributeValue::Fallback(other.to_string()),
        }
    }
}

impl Normalize for str {
    fn normalize(&self) -> AttributeValue {
        AttributeValue::Text(self.to_owned())
    }
}

impl Normalize for i64 {
    fn normalize(&self) -> AttributeValue {
        match i32::try_from(*self) {
            Ok(i) => AttributeValue::Integer(i),
            Err(_) => AttributeValue::Double(*self as f64),
        }
    }
}

impl Normalize for f64 {
    fn normalize(&self) -> AttributeValue {
        AttributeValue::Double(*self)
    }
}

impl Normalize for bool {
    fn normalize(&self) -> AttributeValue {
        AttributeValue::Boolean(*self)
    }
}

/// Single entry point for value normalization.
pub fn normalize<V: Normalize + ?Sized>(value: &V) -> AttributeValue {
    value.normalize()
}

/// Normalize a value still in wire form.
///
/// Text that is not valid JSON is kept verbatim as a fallback string.
pub fn normalize_raw(text: &str) -> AttributeValue {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => value.normalize(),
        Err(_) => AttributeValue::Fallback(text.to_owned()),
    }
}

/// Normalize every value of a decoded JSON object.
pub fn normalize_map(raw: &serde_json::Map<String, Value>) -> AttributeMap {
    raw.iter().map(|(k, v)| (k.clone(), v.normalize())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn integral_numbers_within_i32_become_integers() {
        assert_eq!(normalize(&json!(7)), AttributeValue::Integer(7));
        assert_eq!(normalize(&json!(-2147483648i64)), AttributeValue::Integer(i32::MIN));
    }

    #[test]
    fn wide_or_fractional_numbers_become_doubles() {
        assert_eq!(normalize(&json!(3_000_000_000i64)), AttributeValue::Double(3.0e9));
        assert_eq!(normalize(&json!(1.5)), AttributeValue::Double(1.5));
        assert_eq!(normalize(&json!(2.0)), AttributeValue::Double(2.0));
    }

    #[test]
    fn strings_and_booleans_pass_through() {
        assert_eq!(normalize(&json!("gold")), AttributeValue::Text("gold".into()));
        assert_eq!(normalize(&json!(true)), AttributeValue::Boolean(true));
    }

    #[test]
    fn structured_values_fall_back_to_their_rendering() {
        assert_eq!(normalize(&json!([1, 2])), AttributeValue::Fallback("[1,2]".into()));
        assert_eq!(normalize(&json!({"a": 1})), AttributeValue::Fallback("{\"a\":1}".into()));
        assert_eq!(normalize(&Value::Null), AttributeValue::Fallback(String::new()));
    }

    #[test]
    fn raw_wire_text_is_decoded_or_kept() {
        assert_eq!(normalize_raw("42"), AttributeValue::Integer(42));
        assert_eq!(normalize_raw("\"42\""), AttributeValue::Text("42".into()));
        assert_eq!(normalize_raw("not json"), AttributeValue::Fallback("not json".into()));
    }

    #[test]
    fn account_id_tolerates_several_encodings() {
        assert_eq!(AttributeValue::Integer(100).as_account_id(), Some(AccountId::new(100)));
        assert_eq!(AttributeValue::Text(" 100 ".into()).as_account_id(), Some(AccountId::new(100)));
        assert_eq!(AttributeValue::Double(100.0).as_account_id(), Some(AccountId::new(100)));
        assert_eq!(AttributeValue::Double(100.5).as_account_id(), None);
        assert_eq!(AttributeValue::Boolean(true).as_account_id(), None);
        assert_eq!(AttributeValue::Text("tenant-a".into()).as_account_id(), None);
    }

    #[test]
    fn deserializing_normalizes() {
        let map: AttributeMap = serde_json::from_str(r#"{"a":1,"b":"x","c":[true]}"#).unwrap();
        assert_eq!(map["a"], AttributeValue::Integer(1));
        assert_eq!(map["b"], AttributeValue::Text("x".into()));
        assert_eq!(map["c"], AttributeValue::Fallback("[true]".into()));
    }

    fn json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|i| json!(i)),
            any::<u64>().prop_map(|u| json!(u)),
            (-1.0e12f64..1.0e12f64).prop_map(|f| json!(f)),
            "[a-z0-9 ]{0,12}".prop_map(Value::String),
        ];
        leaf.prop_recursive(2, 8, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(value in json_value()) {
            let once = normalize(&value);
            let twice = normalize(&once);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn resubmitted_values_do_not_drift(values in prop::collection::btree_map("[a-z]{1,6}", json_value(), 0..6)) {
            let raw: serde_json::Map<String, Value> = values.into_iter().collect();
            let first = normalize_map(&raw);

            let wire = serde_json::to_string(&first).unwrap();
            let refetched: serde_json::Map<String, Value> = serde_json::from_str(&wire).unwrap();
            let second = normalize_map(&refetched);

            prop_assert_eq!(first, second);
        }
    }
}
