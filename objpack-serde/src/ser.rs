use serde::{ser, Serialize};
use objpack::{List, Object, Options, Record};
use std::rc::Rc;

use crate::error::{Error, Result};

/// Builds an `Object` graph from any `Serialize` implementor. Structs become `Record` models, enums are externally
/// tagged: unit variants turn into their name, all others into a dict with the name as its single key.
pub struct Serializer;

pub fn to_object<T: ?Sized + Serialize>(value: &T) -> Result<Object> {
    value.serialize(Serializer)
}

/// Serialize `value` to MessagePack. Structs are written as maps from field names to values.
pub fn to_bytes<T: ?Sized + Serialize>(value: &T, options: Options) -> Result<Vec<u8>> {
    let object = to_object(value)?;
    Ok(objpack::encode(&object, None, options | Options::SERIALIZE_MODELS)?)
}

fn tagged(variant: &'static str, value: Object) -> Object {
    Object::dict([(Object::from(variant), value)])
}

impl ser::Serializer for Serializer {

    type Ok = Object;
    type Error = Error;
    type SerializeSeq = SeqSerializer;
    type SerializeTuple = SeqSerializer;
    type SerializeTupleStruct = SeqSerializer;
    type SerializeTupleVariant = TupleVariantSerializer;
    type SerializeMap = MapSerializer;
    type SerializeStruct = StructSerializer;
    type SerializeStructVariant = StructVariantSerializer;

    fn serialize_bool(self, v: bool) -> Result<Object> {
        Ok(Object::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Object> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Object> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Object> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Object> {
        Ok(Object::from(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Object> {
        Ok(Object::Int(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Object> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Object> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Object> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Object> {
        Ok(Object::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Object> {
        Ok(Object::Int(i128::try_from(v)?))
    }

    fn serialize_f32(self, v: f32) -> Result<Object> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Object> {
        Ok(Object::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<Object> {
        Ok(Object::Str(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Object> {
        Ok(Object::from(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Object> {
        Ok(Object::Bytes(v.to_vec()))
    }

    fn serialize_none(self) -> Result<Object> {
        Ok(Object::None)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Object> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Object> {
        Ok(Object::None)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Object> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(self, _name: &'static str, _index: u32, variant: &'static str) -> Result<Object> {
        Ok(Object::from(variant))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(self, _name: &'static str, value: &T) -> Result<Object> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(self, _name: &'static str, _index: u32, variant: &'static str, value: &T) -> Result<Object> {
        Ok(tagged(variant, value.serialize(self)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(SeqSerializer { items: Vec::with_capacity(len.unwrap_or(0)) })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(self, _name: &'static str, _index: u32, variant: &'static str, len: usize) -> Result<Self::SerializeTupleVariant> {
        Ok(TupleVariantSerializer { variant, items: Vec::with_capacity(len) })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(MapSerializer { entries: Vec::with_capacity(len.unwrap_or(0)), key: None })
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        Ok(StructSerializer { record: Record::with_capacity(name, len) })
    }

    fn serialize_struct_variant(self, _name: &'static str, _index: u32, variant: &'static str, len: usize) -> Result<Self::SerializeStructVariant> {
        Ok(StructVariantSerializer { variant, record: Record::with_capacity(variant, len) })
    }

}

pub struct SeqSerializer {
    items: Vec<Object>,
}

impl ser::SerializeSeq for SeqSerializer {
    type Ok = Object;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.items.push(value.serialize(Serializer)?);
        Ok(())
    }

    fn end(self) -> Result<Object> {
        Ok(Object::List(List::from_vec(self.items)))
    }

}

impl ser::SerializeTuple for SeqSerializer {
    type Ok = Object;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Object> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SeqSerializer {
    type Ok = Object;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Object> {
        ser::SerializeSeq::end(self)
    }
}

pub struct TupleVariantSerializer {
    variant: &'static str,
    items: Vec<Object>,
}

impl ser::SerializeTupleVariant for TupleVariantSerializer {
    type Ok = Object;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.items.push(value.serialize(Serializer)?);
        Ok(())
    }

    fn end(self) -> Result<Object> {
        Ok(tagged(self.variant, Object::List(List::from_vec(self.items))))
    }
}

pub struct MapSerializer {
    entries: Vec<(Object, Object)>,
    key: Option<Object>,
}

impl ser::SerializeMap for MapSerializer {
    type Ok = Object;
    type Error = Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<()> {
        self.key = Some(key.serialize(Serializer)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        let key = self.key.take().ok_or(Error::Unbalanced)?;
        self.entries.push((key, value.serialize(Serializer)?));
        Ok(())
    }

    fn end(self) -> Result<Object> {
        match self.key {
            Some(_) => Err(Error::Unbalanced),
            None => Ok(Object::dict(self.entries)),
        }
    }

}

pub struct StructSerializer {
    record: Record,
}

impl ser::SerializeStruct for StructSerializer {
    type Ok = Object;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.record.push(key, value.serialize(Serializer)?);
        Ok(())
    }

    fn end(self) -> Result<Object> {
        Ok(Object::Model(Rc::new(self.record)))
    }

}

pub struct StructVariantSerializer {
    variant: &'static str,
    record: Record,
}

impl ser::SerializeStructVariant for StructVariantSerializer {
    type Ok = Object;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.record.push(key, value.serialize(Serializer)?);
        Ok(())
    }

    fn end(self) -> Result<Object> {
        Ok(tagged(self.variant, Object::Model(Rc::new(self.record))))
    }

}
