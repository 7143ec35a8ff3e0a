//! `objpack` converts graphs of dynamically typed objects to and from MessagePack. The output is byte for byte what
//! any reference MessagePack encoder produces for the same values: integers and lengths always take the most compact
//! width.
//!
//! Encoding functions on the building blocks (`Header`, `Key`, `Ext`, `NdArray`, `Scalar`) take `&self` and a
//! `Vec<u8>` and return the amount of written bytes. Decoding functions take a buffer and return the decoded value,
//! some of them together with the number of consumed bytes.
//!
//! # A note on `usize`
//!
//! MessagePack lengths are 32 bit unsigned integers. Lengths above `u32::MAX` can not be represented and raise an
//! `EncodeError::Length`. On architectures where `usize` is smaller than 32 bit, some valid messages can not be decoded
//! and raise a `DecodeError::Length` instead.
//!
//! # A note on Dicts
//!
//! `Dict` uses a `Vec` of key-value pairs internally because keys can be floats, which implement neither `Ord` nor
//! `Hash`, and because the insertion order is part of the encoded output.
//!
//! # Examples
//!
//! ```
//! use objpack::{decode, encode, Object, Options};
//!
//! let value = Object::dict([("key".into(), "value".into())]);
//! let buf = encode(&value, None, Options::empty()).unwrap();
//! assert_eq!(buf, [
//!     0x81, // map of length 1
//!     0xa3, // str of length 3
//!     b'k', b'e', b'y',
//!     0xa5, // str of length 5
//!     b'v', b'a', b'l', b'u', b'e',
//! ]);
//! assert_eq!(value, decode(&buf, None, Options::empty()).unwrap());
//! ```

mod decoder;
mod encoder;
mod error;
mod ext;
mod header;
mod key;
mod model;
mod ndarray;
mod options;
mod temporal;
mod value;

pub use chrono;
pub use uuid;

pub use decoder::{Decoder, ExtHook, DEPTH_LIMIT};
pub use encoder::{Encoder, Fallback, FALLBACK_LIMIT, RECURSION_LIMIT};
pub use error::*;
pub use ext::{decode_ext, encode_ext, Ext};
pub use header::Header;
pub use key::{compare_keys, normalize_key, Key};
pub use model::{Model, Record};
pub use ndarray::{DType, Element, NdArray, Scalar, MAX_NDIM};
pub use options::Options;
pub use temporal::{format_date, format_datetime, format_offset, format_time};
pub use value::*;

/// Encode `value` to MessagePack. Objects without a wire representation are passed to `fallback`, which returns a
/// substitute to encode instead.
pub fn encode<'f>(value: &Object, fallback: Option<&'f mut Fallback<'f>>, options: Options) -> Result<Vec<u8>, EncodeError> {
    Encoder::encode(value, fallback, options)
}

/// Decode a buffer holding exactly one MessagePack value. Extension values are passed to `ext_hook`.
pub fn decode<'a, 'h>(buf: &'a [u8], ext_hook: Option<&'h mut ExtHook<'h>>, options: Options) -> Result<Object, DecoderError> {
    Decoder::decode(buf, ext_hook, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde::ser::{Serialize, SerializeMap, Serializer};
    use serde_bytes::Bytes;

    /// A map that keeps the given order when serialized
    struct Ordered<'a, V>(&'a [(&'a str, V)]);

    impl<V: Serialize> Serialize for Ordered<'_, V> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.0.len()))?;
            for (k, v) in self.0 {
                map.serialize_entry(k, v)?;
            }
            map.end()
        }
    }

    fn plain(value: &Object) -> Vec<u8> {
        encode(value, None, Options::empty()).unwrap()
    }

    fn assert_roundtrip(value: Object) {
        let buf = plain(&value);
        assert_eq!(value, decode(&buf, None, Options::empty()).unwrap());
    }

    #[test]
    fn reference_integers() {
        let signed = [0i64, 1, 127, 128, 255, 256, 65535, 65536, u32::MAX as i64, u32::MAX as i64 + 1, i64::MAX,
            -1, -32, -33, -128, -129, -32768, -32769, i32::MIN as i64, i32::MIN as i64 - 1, i64::MIN];
        for i in signed {
            assert_eq!(rmp_serde::to_vec(&i).unwrap(), plain(&i.into()), "{}", i);
        }
        for i in [u64::MAX - 1, u64::MAX] {
            assert_eq!(rmp_serde::to_vec(&i).unwrap(), plain(&i.into()), "{}", i);
        }
    }

    #[test]
    fn reference_scalars() {
        assert_eq!(rmp_serde::to_vec(&()).unwrap(), plain(&Object::None));
        assert_eq!(rmp_serde::to_vec(&true).unwrap(), plain(&true.into()));
        for f in [0.0, -0.0, 1.5, f64::MAX, f64::MIN_POSITIVE, f64::INFINITY] {
            assert_eq!(rmp_serde::to_vec(&f).unwrap(), plain(&f.into()));
        }
    }

    #[test]
    fn reference_lengths() {
        for len in [0, 1, 31, 32, 255, 256, 65535, 65536] {
            let text = "x".repeat(len);
            assert_eq!(rmp_serde::to_vec(&text).unwrap(), plain(&text.as_str().into()), "str of {}", len);
            let bytes = vec![0xa5u8; len];
            assert_eq!(rmp_serde::to_vec(&Bytes::new(&bytes)).unwrap(), plain(&Object::Bytes(bytes.clone())), "bin of {}", len);
            let items = vec![1u8; len];
            assert_eq!(rmp_serde::to_vec(&items).unwrap(), plain(&Object::list(items.iter().map(|i| Object::from(*i)))), "array of {}", len);
        }
    }

    #[test]
    fn reference_maps() {
        let entries = [("b", 1), ("c", 2), ("a", 3), ("ä", 4), ("A", 5)];
        let value = Object::dict(entries.iter().map(|(k, v)| (Object::from(*k), Object::from(*v))));
        assert_eq!(rmp_serde::to_vec(&Ordered(&entries)).unwrap(), plain(&value));
        let sorted = [("A", 5), ("a", 3), ("b", 1), ("c", 2), ("ä", 4)];
        assert_eq!(rmp_serde::to_vec(&Ordered(&sorted)).unwrap(), encode(&value, None, Options::SORT_KEYS).unwrap());
    }

    #[test]
    fn reference_nested() {
        let reference = vec![vec![Some(1i64), None], vec![], vec![Some(-1000)]];
        let value = Object::list([
            Object::list([1.into(), Object::None]),
            Object::list([]),
            Object::list([(-1000).into()]),
        ]);
        assert_eq!(rmp_serde::to_vec(&reference).unwrap(), plain(&value));
    }

    #[test]
    fn strings() {
        assert_roundtrip("Üben von Xylophon und Querflöte ist ja zweckmäßig.".into());
        assert_roundtrip("\u{2028}\u{2029}\u{0}\u{1f}".into());
    }

    #[test]
    fn array_long() {
        for i in (0..1 << 17).step_by(4099) {
            assert_roundtrip(Object::list(vec![Object::from(1); i]));
        }
    }

    #[test]
    fn map() {
        assert_roundtrip(Object::dict([
            ("first".into(), 1.into()),
            ("second".into(), Object::Bytes(vec![2])),
            ("third".into(), Object::list([3.into(), Object::Float(3.5)])),
            ("fourth".into(), Object::dict([("4".into(), Object::None)])),
        ]));
    }

    #[test]
    fn ext_roundtrip() {
        let value = Object::Ext(Ext::new(1, b"test".to_vec()).unwrap());
        let buf = plain(&value);
        assert!(decode(&buf, None, Options::empty()).is_err());
        let mut hook = |tag: i8, data: &[u8]| -> Result<Object, BoxError> {
            Ok(Object::Ext(Ext::new(tag as u8, data)?))
        };
        assert_eq!(value, decode(&buf, Some(&mut hook), Options::empty()).unwrap());
    }

    #[test]
    fn non_str_keys_roundtrip() {
        let value = Object::dict([
            (Object::tuple([]), true.into()),
            (Object::Bytes(b"key".to_vec()), 1.into()),
            (Object::Int(i64::MIN as i128), 2.into()),
            (Object::Float(f64::INFINITY), 3.into()),
        ]);
        let buf = encode(&value, None, Options::NON_STR_KEYS).unwrap();
        assert!(decode(&buf, None, Options::empty()).is_err());
        assert_eq!(value, decode(&buf, None, Options::NON_STR_KEYS).unwrap());
    }

    fn arb_object() -> impl Strategy<Value = Object> {
        let leaf = prop_oneof![
            Just(Object::None),
            any::<bool>().prop_map(Object::Bool),
            any::<i64>().prop_map(Object::from),
            any::<u64>().prop_map(Object::from),
            any::<f64>().prop_filter("NaN never equals itself", |f| !f.is_nan()).prop_map(Object::Float),
            ".*".prop_map(Object::Str),
            proptest::collection::vec(any::<u8>(), 0..64).prop_map(Object::Bytes),
        ];
        leaf.prop_recursive(4, 64, 8, |inner| prop_oneof![
            proptest::collection::vec(inner.clone(), 0..8).prop_map(Object::list),
            proptest::collection::vec((".*", inner), 0..8)
                .prop_map(|entries| Object::dict(entries.into_iter().map(|(k, v)| (Object::Str(k), v)))),
        ])
    }

    proptest! {
        #[test]
        fn roundtrip(value in arb_object()) {
            let buf = plain(&value);
            prop_assert_eq!(value, decode(&buf, None, Options::empty()).unwrap());
        }

        #[test]
        fn sorted_output_is_sorted(keys in proptest::collection::vec("[a-z]{0,4}", 0..16)) {
            let value = Object::dict(keys.iter().map(|k| (Object::from(k.as_str()), Object::None)));
            let buf = encode(&value, None, Options::SORT_KEYS).unwrap();
            let decoded = match decode(&buf, None, Options::empty()).unwrap() {
                Object::Dict(d) => d.entries().iter().map(|(k, _)| k.as_str().unwrap_or_default().to_owned()).collect::<Vec<_>>(),
                other => panic!("expected a dict, got {:?}", other),
            };
            let mut expected = keys.clone();
            expected.sort();
            expected.dedup();
            prop_assert_eq!(expected, decoded);
        }

        #[test]
        fn garbage_never_panics(buf in proptest::collection::vec(any::<u8>(), 0..64)) {
            let _ = decode(&buf, None, Options::NON_STR_KEYS);
        }
    }

}
