//! Bound parameter values and their coercion into driver-acceptable scalars.
//!
//! Values are stored as the caller handed them over ([`Value`]) and are only
//! coerced into a [`SqlValue`] when the parameter bag is given to the
//! connection (see [`coerce_params`]). Coercion fails only when a
//! serializer does; the error is returned, never replaced by a fallback.

use crate::error::QbResult;
use bytes::Bytes;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Key of a bound parameter.
///
/// Named keys never carry the leading `:` of their placeholder.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParamKey {
    /// Positional (`?`) parameter, zero-based.
    Index(usize),
    /// Named (`:name`) parameter.
    Name(String),
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKey::Index(i) => write!(f, "{i}"),
            ParamKey::Name(name) => write!(f, ":{name}"),
        }
    }
}

impl From<usize> for ParamKey {
    fn from(i: usize) -> Self {
        ParamKey::Index(i)
    }
}

impl From<&str> for ParamKey {
    fn from(name: &str) -> Self {
        ParamKey::Name(name.strip_prefix(':').unwrap_or(name).to_string())
    }
}

impl From<String> for ParamKey {
    fn from(name: String) -> Self {
        match name.strip_prefix(':') {
            Some(stripped) => ParamKey::Name(stripped.to_string()),
            None => ParamKey::Name(name),
        }
    }
}

/// Optional capabilities of an object bound as a parameter.
///
/// Coercion asks for them in a fixed priority order: [`canonical`],
/// [`json`], [`text`], and finally the `Debug` representation. The first
/// capability that answers wins, no matter how many the type implements.
/// A failing [`canonical`] aborts coercion with its error.
///
/// [`canonical`]: ParamObject::canonical
/// [`json`]: ParamObject::json
/// [`text`]: ParamObject::text
pub trait ParamObject: fmt::Debug + Send + Sync {
    /// Canonical serialized form; `Ok(None)` when the type has none.
    fn canonical(&self) -> QbResult<Option<String>> {
        Ok(None)
    }

    /// JSON representation, encoded compactly during coercion.
    fn json(&self) -> Option<serde_json::Value> {
        None
    }

    /// Plain string conversion.
    fn text(&self) -> Option<String> {
        None
    }
}

/// A value bound to a placeholder.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Bytes),
    /// An object resolved through [`ParamObject`] at coercion time.
    Object(Arc<dyn ParamObject>),
}

impl Value {
    /// Wrap any [`ParamObject`].
    pub fn object<T: ParamObject + 'static>(value: T) -> Self {
        Value::Object(Arc::new(value))
    }

    /// Bind a serde-serializable value as its JSON text.
    pub fn serialized<T: Serialize + fmt::Debug + Send + Sync + 'static>(value: T) -> Self {
        Value::object(Serialized(value))
    }

    /// Bind anything implementing `Display` as its string form.
    pub fn display<T: fmt::Display + fmt::Debug + Send + Sync + 'static>(value: T) -> Self {
        Value::object(Displayed(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Coerce into the scalar handed to the connection.
    pub fn coerce(&self) -> QbResult<SqlValue> {
        Ok(match self {
            Value::Null => SqlValue::Null,
            Value::Int(i) => SqlValue::Int(*i),
            Value::Float(f) => SqlValue::Float(*f),
            Value::Bool(b) => SqlValue::Int(i64::from(*b)),
            Value::Text(s) => SqlValue::Text(s.clone()),
            Value::Bytes(b) => SqlValue::Bytes(b.clone()),
            Value::Object(obj) => SqlValue::Text(coerce_object(obj.as_ref())?),
        })
    }
}

fn coerce_object(obj: &dyn ParamObject) -> QbResult<String> {
    if let Some(canonical) = obj.canonical()? {
        return Ok(canonical);
    }
    if let Some(json) = obj.json() {
        return Ok(json.to_string());
    }
    if let Some(text) = obj.text() {
        return Ok(text);
    }
    Ok(format!("{obj:?}"))
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Int(i) => f.debug_tuple("Int").field(i).finish(),
            Value::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Value::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Value::Bytes(b) => f.debug_tuple("Bytes").field(b).finish(),
            Value::Object(obj) => f.debug_tuple("Object").field(obj).finish(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

macro_rules! value_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

value_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(Bytes::from(v))
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Bytes(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::object(Json(v))
    }
}

impl From<chrono::NaiveDateTime> for Value {
    fn from(v: chrono::NaiveDateTime) -> Self {
        Value::object(v)
    }
}

impl From<chrono::NaiveDate> for Value {
    fn from(v: chrono::NaiveDate) -> Self {
        Value::object(v)
    }
}

impl From<chrono::DateTime<chrono::Utc>> for Value {
    fn from(v: chrono::DateTime<chrono::Utc>) -> Self {
        Value::object(v)
    }
}

impl From<uuid::Uuid> for Value {
    fn from(v: uuid::Uuid) -> Self {
        Value::object(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// A JSON document bound as its compact encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Json(pub serde_json::Value);

impl ParamObject for Json {
    fn json(&self) -> Option<serde_json::Value> {
        Some(self.0.clone())
    }
}

/// A serde value bound as its canonical JSON text.
///
/// A value serde cannot encode (a map with non-string keys, say) fails
/// coercion with [`QbError::Serialization`](crate::QbError::Serialization).
#[derive(Debug, Clone)]
pub struct Serialized<T>(pub T);

impl<T: Serialize + fmt::Debug + Send + Sync> ParamObject for Serialized<T> {
    fn canonical(&self) -> QbResult<Option<String>> {
        Ok(Some(serde_json::to_string(&self.0)?))
    }
}

/// A `Display` value bound as its string form.
#[derive(Debug, Clone)]
pub struct Displayed<T>(pub T);

impl<T: fmt::Display + fmt::Debug + Send + Sync> ParamObject for Displayed<T> {
    fn text(&self) -> Option<String> {
        Some(self.0.to_string())
    }
}

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

impl ParamObject for chrono::NaiveDateTime {
    fn text(&self) -> Option<String> {
        Some(self.format(DATETIME_FORMAT).to_string())
    }
}

impl ParamObject for chrono::NaiveDate {
    fn text(&self) -> Option<String> {
        Some(self.format("%Y-%m-%d").to_string())
    }
}

impl ParamObject for chrono::DateTime<chrono::Utc> {
    fn text(&self) -> Option<String> {
        Some(self.naive_utc().format(DATETIME_FORMAT).to_string())
    }
}

impl ParamObject for uuid::Uuid {
    fn text(&self) -> Option<String> {
        Some(self.hyphenated().to_string())
    }
}

/// A coerced, driver-acceptable scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Bytes),
}

impl SqlValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Parameter bag as held by the builder.
pub type ParamMap = BTreeMap<ParamKey, Value>;

/// Parameter bag as handed to the connection.
pub type SqlParams = BTreeMap<ParamKey, SqlValue>;

/// Coerce every value of a parameter bag, stopping at the first failure.
pub fn coerce_params(params: &ParamMap) -> QbResult<SqlParams> {
    params
        .iter()
        .map(|(key, value)| Ok((key.clone(), value.coerce()?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[test]
    fn scalars_pass_through() {
        assert_eq!(Value::Null.coerce().unwrap(), SqlValue::Null);
        assert_eq!(Value::from(42i32).coerce().unwrap(), SqlValue::Int(42));
        assert_eq!(Value::from(1.5f64).coerce().unwrap(), SqlValue::Float(1.5));
        assert_eq!(Value::from("x").coerce().unwrap(), SqlValue::Text("x".into()));
        assert_eq!(
            Value::from(vec![1u8, 2]).coerce().unwrap(),
            SqlValue::Bytes(Bytes::from_static(&[1, 2]))
        );
    }

    #[test]
    fn bools_become_integers() {
        assert_eq!(Value::from(true).coerce().unwrap(), SqlValue::Int(1));
        assert_eq!(Value::from(false).coerce().unwrap(), SqlValue::Int(0));
    }

    #[test]
    fn option_maps_none_to_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::Text("a".into()));
    }

    #[test]
    fn json_object_encodes_compactly() {
        let v = Value::from(serde_json::json!({"a": 1, "b": [true]}));
        assert_eq!(v.coerce().unwrap(), SqlValue::Text(r#"{"a":1,"b":[true]}"#.into()));
    }

    #[test]
    fn serialized_and_displayed_objects() {
        #[derive(Debug, Serialize)]
        struct Prefs {
            theme: &'static str,
        }
        assert_eq!(
            Value::serialized(Prefs { theme: "dark" }).coerce().unwrap(),
            SqlValue::Text(r#"{"theme":"dark"}"#.into())
        );
        assert_eq!(
            Value::display(std::net::Ipv4Addr::LOCALHOST).coerce().unwrap(),
            SqlValue::Text("127.0.0.1".into())
        );
    }

    #[test]
    fn serializer_failure_is_reported_not_replaced() {
        use std::collections::HashMap;

        let mut by_cell = HashMap::new();
        by_cell.insert((1, 2), 3);
        let err = Value::serialized(by_cell).coerce().unwrap_err();
        assert!(matches!(err, crate::QbError::Serialization(_)), "{err:?}");

        let mut params = ParamMap::new();
        params.insert("ok".into(), Value::from(1));
        params.insert("bad".into(), Value::serialized(HashMap::from([((0, 0), 0)])));
        assert!(coerce_params(&params).is_err());
    }

    #[test]
    fn priority_is_fixed_not_declaration_order() {
        #[derive(Debug)]
        struct Everything;
        impl ParamObject for Everything {
            fn text(&self) -> Option<String> {
                Some("text".into())
            }
            fn json(&self) -> Option<serde_json::Value> {
                Some(serde_json::json!("json"))
            }
            fn canonical(&self) -> QbResult<Option<String>> {
                Ok(Some("canonical".into()))
            }
        }

        #[derive(Debug)]
        struct JsonAndText;
        impl ParamObject for JsonAndText {
            fn text(&self) -> Option<String> {
                Some("text".into())
            }
            fn json(&self) -> Option<serde_json::Value> {
                Some(serde_json::json!([1]))
            }
        }

        assert_eq!(
            Value::object(Everything).coerce().unwrap(),
            SqlValue::Text("canonical".into())
        );
        assert_eq!(
            Value::object(JsonAndText).coerce().unwrap(),
            SqlValue::Text("[1]".into())
        );
    }

    #[test]
    fn opaque_object_falls_back_to_debug() {
        #[derive(Debug)]
        struct Opaque {
            id: u32,
        }
        impl ParamObject for Opaque {}

        assert_eq!(
            Value::object(Opaque { id: 3 }).coerce().unwrap(),
            SqlValue::Text("Opaque { id: 3 }".into())
        );
    }

    #[test]
    fn chrono_and_uuid_render_as_text() {
        let dt = chrono::NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(13, 5, 0)
            .unwrap();
        assert_eq!(
            Value::from(dt).coerce().unwrap(),
            SqlValue::Text("2024-02-29 13:05:00".into())
        );
        assert_eq!(
            Value::from(dt.date()).coerce().unwrap(),
            SqlValue::Text("2024-02-29".into())
        );

        let id = uuid::Uuid::nil();
        assert_eq!(
            Value::from(id).coerce().unwrap(),
            SqlValue::Text("00000000-0000-0000-0000-000000000000".into())
        );
    }

    #[test]
    fn param_keys_strip_colon_and_order_positionals_first() {
        assert_eq!(ParamKey::from(":id"), ParamKey::Name("id".into()));
        assert_eq!(ParamKey::from("id".to_string()), ParamKey::Name("id".into()));
        assert!(ParamKey::Index(9) < ParamKey::Name("a".into()));
        assert_eq!(ParamKey::from("x").to_string(), ":x");
    }

    #[test]
    fn coerce_params_keeps_keys() {
        let mut params = ParamMap::new();
        params.insert("flag".into(), Value::from(true));
        params.insert(0.into(), Value::from("a"));
        let coerced = coerce_params(&params).unwrap();
        assert_eq!(coerced[&ParamKey::from("flag")], SqlValue::Int(1));
        assert_eq!(coerced[&ParamKey::Index(0)], SqlValue::Text("a".into()));
    }
}
