use objpack::Object;
use serde_json::Value;

/// Integers that fit 64 bits stay integers, every other number becomes a float
pub fn to_object(value: &Value) -> Object {
    match value {
        Value::Null => Object::None,
        Value::Bool(b) => Object::Bool(*b),
        Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => Object::from(i),
            (_, Some(u)) => Object::from(u),
            _ => Object::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => Object::from(s.as_str()),
        Value::Array(items) => Object::list(items.iter().map(to_object)),
        Value::Object(entries) => Object::dict(entries.iter().map(|(k, v)| (Object::from(k.as_str()), to_object(v)))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objpack::{decode, encode, Options};
    use serde_json::json;

    #[test]
    fn scalars() {
        assert_eq!(Object::None, to_object(&json!(null)));
        assert_eq!(Object::Bool(true), to_object(&json!(true)));
        assert_eq!(Object::Int(-7), to_object(&json!(-7)));
        assert_eq!(Object::Int(u64::MAX as i128), to_object(&json!(u64::MAX)));
        assert_eq!(Object::Float(0.5), to_object(&json!(0.5)));
        assert_eq!(Object::from("täst"), to_object(&json!("täst")));
    }

    #[test]
    fn encodes() {
        let value = to_object(&json!({ "a": [1, 2.5, null], "b": { "c": false } }));
        let bytes = encode(&value, None, Options::empty()).unwrap();
        assert_eq!(bytes, [
            0x82,
              0xa1, b'a', 0x93, 0x01, 0xcb, 0x40, 0x04, 0, 0, 0, 0, 0, 0, 0xc0,
              0xa1, b'b', 0x81, 0xa1, b'c', 0xc2,
        ]);
        assert_eq!(value, decode(&bytes, None, Options::empty()).unwrap());
    }
}
