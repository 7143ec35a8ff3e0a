//! Conveniently serialize and deserialize your Rust data structures with `objpack`.
//!
//! Serialization goes through the `objpack` object model: a value is first turned into an `Object` graph in which
//! structs are `Record` models, then encoded with `SERIALIZE_MODELS` so that every struct becomes a map from field
//! names to values. Enums are externally tagged. The output is what `rmp_serde::to_vec_named` produces for the same
//! value.
//!
//! Map keys keep their type. Maps with keys other than strings therefore require `Options::NON_STR_KEYS` in both
//! directions.
//!
//! # Examples
//!
//! ```
//! use objpack::Options;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Cat {
//!     name: String,
//!     lives: u8,
//! }
//!
//! let cat = Cat { name: "Jessica".to_owned(), lives: 9 };
//! let bytes = objpack_serde::to_bytes(&cat, Options::empty()).unwrap();
//! assert_eq!(bytes, [
//!     0x82,                                     // map of length 2
//!       0xa4, b'n', b'a', b'm', b'e',           // 'name'
//!       0xa7, b'J', b'e', b's', b's', b'i', b'c', b'a',
//!       0xa5, b'l', b'i', b'v', b'e', b's',     // 'lives'
//!       0x09,                                   // positive fixint 9
//! ]);
//!
//! let deserialized: Cat = objpack_serde::from_bytes(&bytes, Options::empty()).unwrap();
//! assert_eq!(cat, deserialized);
//! ```

mod de;
mod error;
mod ser;

pub use de::{from_bytes, from_object, Deserializer};
pub use error::{Error, Result};
pub use ser::{to_bytes, to_object, Serializer};

#[cfg(test)]
mod tests {
    use serde::{Serialize, Deserialize};
    use std::collections::HashMap;
    use objpack::{DecodeError, EncodeError, EnumMember, Model, Object, Options, Set, Subclass};
    use super::{from_bytes, from_object, to_bytes, to_object, Error};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    enum Enum {
        UnitVariant,
        NewtypeVariant(bool),
        TupleVariant(f32, f32),
        StructVariant{ a: usize, b: usize, c: usize },
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Struct {
        field: u8,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct UnitStruct;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct NewtypeStruct(String);

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct TupleStruct(char, char, char);

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Test {
        bool: bool,
        i8: i8,
        i16: i16,
        i32: i32,
        i64: i64,
        u8: u8,
        u16: u16,
        u32: u32,
        u64: u64,
        f32: f32,
        f64: f64,
        char: char,
        str: String,
        #[serde(with = "serde_bytes")]
        bytes: Vec<u8>,
        none: Option<u8>,
        some: Option<u8>,
        unit: (),
        unit_struct: UnitStruct,
        newtype_struct: NewtypeStruct,
        tuple_struct: TupleStruct,
        seq: Vec<String>,
        tuple: (u16, u16, u16),
        map: HashMap<usize, String>,
        r#struct: Struct,
        unit_variant: Enum,
        newtype_variant: Enum,
        tuple_variant: Enum,
        struct_variant: Enum,
    }

    fn message() -> Test {
        Test {
            bool: true,
            i8: -1,
            i16: -20,
            i32: -7000,
            i64: i64::MIN,
            u8: 1,
            u16: 20,
            u32: 7000,
            u64: u64::MAX,
            f32: 1337.8472,
            f64: 1337.8472,
            char: 'x',
            str: "Test".to_string(),
            bytes: vec![0x82, 0xa4, 0x6e, 0x61, 0x6d, 0x65, 0xc0, 0xc1],
            none: None,
            some: Some(0),
            unit: (),
            unit_struct: UnitStruct,
            newtype_struct: NewtypeStruct("Qapla'".to_string()),
            tuple_struct: TupleStruct('a', 'ä', '€'),
            seq: vec![
                "Elen".to_string(),
                "síla".to_string(),
                "lúmenn'".to_string(),
                "omentielvo".to_string(),
            ],
            tuple: (0, 0, 0),
            map: [
                (1701, "Enterprise".to_string()),
                (74656, "Voyager".to_string())
            ].into_iter().collect(),
            r#struct: Struct {
                field: 42,
            },
            unit_variant: Enum::UnitVariant,
            newtype_variant: Enum::NewtypeVariant(false),
            tuple_variant: Enum::TupleVariant(1.0, 0.999),
            struct_variant: Enum::StructVariant {
                a: 255,
                b: 0,
                c: 33,
            }
        }
    }

    #[test]
    fn roundtrip() {
        let message = message();
        let bytes = to_bytes(&message, Options::NON_STR_KEYS).unwrap();
        assert_eq!(message, from_bytes::<Test>(&bytes, Options::NON_STR_KEYS).unwrap());
    }

    #[test]
    fn roundtrip_object() {
        let message = message();
        let object = to_object(&message).unwrap();
        match &object {
            Object::Model(model) => assert_eq!("Test", model.type_name()),
            other => panic!("expected a model, got {:?}", other),
        }
        assert_eq!(message, from_object::<Test>(&object).unwrap());
    }

    #[derive(Serialize)]
    struct Inner {
        id: u32,
        tags: Vec<String>,
    }

    #[derive(Serialize)]
    struct Outer {
        name: String,
        active: bool,
        parent: Option<u64>,
        inner: Inner,
    }

    #[test]
    fn matches_named_reference() {
        let value = Outer {
            name: "outer".to_owned(),
            active: false,
            parent: None,
            inner: Inner { id: 70000, tags: vec!["a".to_owned(), "b".repeat(40)] },
        };
        assert_eq!(rmp_serde::to_vec_named(&value).unwrap(), to_bytes(&value, Options::empty()).unwrap());
    }

    #[derive(Serialize)]
    struct Unsorted {
        zebra: u8,
        apple: u8,
        mango: u8,
    }

    #[derive(Serialize)]
    struct Sorted {
        apple: u8,
        mango: u8,
        zebra: u8,
    }

    #[test]
    fn sorted_fields() {
        let unsorted = Unsorted { zebra: 1, apple: 2, mango: 3 };
        let sorted = Sorted { apple: 2, mango: 3, zebra: 1 };
        assert_eq!(rmp_serde::to_vec_named(&sorted).unwrap(), to_bytes(&unsorted, Options::SORT_KEYS).unwrap());
        assert_ne!(to_bytes(&sorted, Options::empty()).unwrap(), to_bytes(&unsorted, Options::empty()).unwrap());
    }

    #[test]
    fn enums() {
        assert_eq!(Object::from("UnitVariant"), to_object(&Enum::UnitVariant).unwrap());
        assert_eq!(
            Object::dict([("NewtypeVariant".into(), true.into())]),
            to_object(&Enum::NewtypeVariant(true)).unwrap(),
        );
        let broken = Object::dict([("UnitVariant".into(), Object::None), ("NewtypeVariant".into(), true.into())]);
        assert!(matches!(from_object::<Enum>(&broken), Err(Error::Enum)));
        assert!(matches!(from_object::<Enum>(&Object::from(1)), Err(Error::Enum)));
    }

    #[test]
    fn host_kinds() {
        let set = Object::Set(Set::frozen([3.into(), 1.into(), 2.into()]));
        assert_eq!(vec![3u8, 1, 2], from_object::<Vec<u8>>(&set).unwrap());
        let member = Object::Enum(EnumMember::new("Color", "RED", Object::Sub(Subclass::new("SubInt", 1.into()))));
        assert_eq!(1u8, from_object::<u8>(&member).unwrap());
        assert_eq!(Some(1u8), from_object::<Option<u8>>(&member).unwrap());
    }

    #[test]
    fn errors() {
        let map: HashMap<u8, u8> = [(1, 2)].into_iter().collect();
        assert!(matches!(to_bytes(&map, Options::empty()), Err(Error::Encode(EncodeError::KeyType(_)))));
        assert!(to_bytes(&map, Options::NON_STR_KEYS).is_ok());

        assert!(matches!(from_bytes::<u8>(&[0xcd, 0x01, 0x00], Options::empty()), Err(Error::Message(_))));
        match from_bytes::<u8>(&[0x01, 0x02], Options::empty()) {
            Err(Error::Decode(e)) => assert!(matches!(e.kind(), DecodeError::TrailingBytes(1))),
            other => panic!("expected a decode error, got {:?}", other),
        }
        assert!(matches!(from_object::<(u8, u8)>(&Object::list([1.into(), 2.into(), 3.into()])), Err(_)));
        assert!(matches!(from_object::<String>(&Object::Float(1.0)), Err(Error::Message(_))));
    }
}
