use serde::de::{self, DeserializeOwned, DeserializeSeed, EnumAccess, IntoDeserializer, MapAccess, SeqAccess, VariantAccess, Visitor};
use serde::de::value::StrDeserializer;
use serde::forward_to_deserialize_any;
use objpack::{format_date, Object, Options};
use std::borrow::Cow;
use std::slice;

use crate::error::{Error, Result};

/// Walks an `Object` graph. Lists and dicts are borrowed for the duration of a visit only, so nothing can be
/// deserialized by reference and all targets have to be owned.
pub struct Deserializer<'a> {
    object: &'a Object,
}

impl<'a> Deserializer<'a> {
    pub fn new(object: &'a Object) -> Self {
        // subclasses deserialize as their base, enumeration members as their value
        let mut object = object;
        loop {
            object = match object {
                Object::Sub(sub) => sub.base(),
                Object::Enum(member) => member.value(),
                _ => return Deserializer { object },
            };
        }
    }
}

pub fn from_object<T: DeserializeOwned>(object: &Object) -> Result<T> {
    T::deserialize(Deserializer::new(object))
}

/// Deserialize exactly one MessagePack value from `buf`.
pub fn from_bytes<T: DeserializeOwned>(buf: &[u8], options: Options) -> Result<T> {
    let object = objpack::decode(buf, None, options)?;
    from_object(&object)
}

fn visit_items<'de, V: Visitor<'de>>(items: &[Object], visitor: V) -> Result<V::Value> {
    let mut seq = SeqDeserializer { iter: items.iter() };
    let value = visitor.visit_seq(&mut seq)?;
    match seq.iter.len() {
        0 => Ok(value),
        remaining => Err(Error::TrailingElements(remaining)),
    }
}

fn visit_entries<'de, K: KeyLike, V: Visitor<'de>>(entries: &[(K, Object)], visitor: V) -> Result<V::Value> {
    let mut map = MapDeserializer { iter: entries.iter(), value: None };
    let value = visitor.visit_map(&mut map)?;
    match map.iter.len() {
        0 => Ok(value),
        remaining => Err(Error::TrailingElements(remaining)),
    }
}

impl<'de, 'a> de::Deserializer<'de> for Deserializer<'a> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.object {
            Object::None => visitor.visit_unit(),
            Object::Bool(v) => visitor.visit_bool(*v),
            Object::Int(v) => match (i64::try_from(*v), u64::try_from(*v)) {
                (Ok(v), _) => visitor.visit_i64(v),
                (_, Ok(v)) => visitor.visit_u64(v),
                _ => visitor.visit_i128(*v),
            },
            Object::Float(v) => visitor.visit_f64(*v),
            Object::Str(v) => visitor.visit_str(v),
            Object::Bytes(v) => visitor.visit_bytes(v),
            Object::Date(v) => visitor.visit_string(format_date(v)),
            Object::Uuid(v) => visitor.visit_string(v.hyphenated().to_string()),
            Object::List(list) => {
                let items = list.items();
                visit_items(&items, visitor)
            },
            Object::Tuple(items) => visit_items(items, visitor),
            Object::Set(set) => visit_items(set.items(), visitor),
            Object::Dict(dict) => {
                let entries = dict.entries();
                visit_entries(entries.as_slice(), visitor)
            },
            Object::Model(model) => {
                let fields = model.fields();
                visit_entries(fields.as_slice(), visitor)
            },
            o => Err(Error::unexpected("a serde data type", o)),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.object {
            Object::None => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(self, _name: &'static str, _variants: &'static [&'static str], visitor: V) -> Result<V::Value> {
        match self.object {
            Object::Str(s) => {
                let variant: StrDeserializer<'_, Error> = s.as_str().into_deserializer();
                visitor.visit_enum(variant)
            },
            Object::Dict(dict) => {
                let entries = dict.entries();
                let value = match entries.as_slice() {
                    [(Object::Str(variant), value)] => visitor.visit_enum(EnumDeserializer { variant: variant.as_str(), value })?,
                    _ => return Err(Error::Enum),
                };
                Ok(value)
            },
            _ => Err(Error::Enum),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string bytes byte_buf unit unit_struct seq
        tuple tuple_struct map struct identifier ignored_any
    }

}

struct SeqDeserializer<'b> {
    iter: slice::Iter<'b, Object>,
}

impl<'de, 'b> SeqAccess<'de> for SeqDeserializer<'b> {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        match self.iter.next() {
            Some(item) => seed.deserialize(Deserializer::new(item)).map(Some),
            None => Ok(None),
        }
    }

    #[inline]
    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

/// Dict keys are objects, model field names are plain text
trait KeyLike {
    fn deserialize_key<'de, K: DeserializeSeed<'de>>(&self, seed: K) -> Result<K::Value>;
}

impl KeyLike for Object {
    fn deserialize_key<'de, K: DeserializeSeed<'de>>(&self, seed: K) -> Result<K::Value> {
        seed.deserialize(Deserializer::new(self))
    }
}

impl KeyLike for Cow<'_, str> {
    fn deserialize_key<'de, K: DeserializeSeed<'de>>(&self, seed: K) -> Result<K::Value> {
        let name: &str = self;
        let key: StrDeserializer<'_, Error> = name.into_deserializer();
        seed.deserialize(key)
    }
}

struct MapDeserializer<'b, K> {
    iter: slice::Iter<'b, (K, Object)>,
    value: Option<&'b Object>,
}

impl<'de, 'b, K: KeyLike> MapAccess<'de> for MapDeserializer<'b, K> {
    type Error = Error;

    fn next_key_seed<S: DeserializeSeed<'de>>(&mut self, seed: S) -> Result<Option<S::Value>> {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                key.deserialize_key(seed).map(Some)
            },
            None => Ok(None),
        }
    }

    fn next_value_seed<S: DeserializeSeed<'de>>(&mut self, seed: S) -> Result<S::Value> {
        match self.value.take() {
            Some(value) => seed.deserialize(Deserializer::new(value)),
            None => Err(Error::Unbalanced),
        }
    }

    #[inline]
    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct EnumDeserializer<'b> {
    variant: &'b str,
    value: &'b Object,
}

impl<'de, 'b> EnumAccess<'de> for EnumDeserializer<'b> {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self::Variant)> {
        let deserializer: StrDeserializer<'_, Error> = self.variant.into_deserializer();
        let variant = seed.deserialize(deserializer)?;
        Ok((variant, self))
    }
}

impl<'de, 'b> VariantAccess<'de> for EnumDeserializer<'b> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Object::None => Ok(()),
            o => Err(Error::unexpected("NoneType", o)),
        }
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        seed.deserialize(Deserializer::new(self.value))
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        de::Deserializer::deserialize_seq(Deserializer::new(self.value), visitor)
    }

    fn struct_variant<V: Visitor<'de>>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value> {
        de::Deserializer::deserialize_map(Deserializer::new(self.value), visitor)
    }

}
