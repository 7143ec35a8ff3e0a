//! The type dispatcher. Every object is classified by kind and written directly to the output buffer; objects
//! without a wire representation are handed to the caller's fallback, whose result is classified in turn.
//!
//! Lists, dicts and models are containers that can reference each other. While a container is being written its
//! identity sits on the ancestor stack, so meeting it again further down means the graph has a cycle, which is an
//! error. The same container appearing twice side by side is fine.

use crate::error::{BoxError, EncodeError};
use crate::header::Header;
use crate::key;
use crate::model::Model;
use crate::ndarray::NdArray;
use crate::options::Options;
use crate::temporal;
use crate::value::{Dict, List, Object, Set, TzInfo};
use std::rc::Rc;
use tracing::{debug, trace};
use uuid::Uuid;

/// Maximum nesting depth of containers
pub const RECURSION_LIMIT: usize = 255;

/// Maximum number of fallback calls chained on a single path through the object graph
pub const FALLBACK_LIMIT: usize = 254;

/// Called with an object the encoder can't handle. The returned substitute gets encoded in its place.
pub type Fallback<'f> = dyn FnMut(&Object) -> Result<Object, BoxError> + 'f;

pub struct Encoder<'f> {
    writer: Vec<u8>,
    options: Options,
    fallback: Option<&'f mut Fallback<'f>>,
    /// Identities of the containers currently being written
    ancestors: Vec<usize>,
    /// Fallback calls on the current path
    fallback_calls: usize,
}

impl<'f> Encoder<'f> {

    /// Encode a single object. The bytes are only returned if the whole object graph could be encoded.
    pub fn encode(value: &Object, fallback: Option<&'f mut Fallback<'f>>, options: Options) -> Result<Vec<u8>, EncodeError> {
        trace!(?options, "encoding {}", value.type_name());
        let mut encoder = Self { writer: Vec::new(), options, fallback, ancestors: Vec::new(), fallback_calls: 0 };
        encoder.encode_value(value, 0)?;
        trace!(len = encoder.writer.len(), "encoded");
        Ok(encoder.writer)
    }

    fn encode_value(&mut self, value: &Object, depth: usize) -> Result<(), EncodeError> {
        let opts = self.options;
        match value {
            Object::None        => self.put(Header::Nil),
            Object::Bool(true)  => self.put(Header::True),
            Object::Bool(false) => self.put(Header::False),
            Object::Int(v) => match Header::wide_int(*v) {
                Some(header) => self.put(header),
                None if opts.contains(Options::PASSTHROUGH_BIG_INT) => self.encode_fallback(value, depth),
                None => Err(EncodeError::IntegerOutOfRange(*v)),
            },
            Object::Float(v) => {
                self.put(Header::F64)?;
                self.writer.extend_from_slice(&v.to_be_bytes());
                Ok(())
            },
            Object::Str(v) => self.write_str(v),
            Object::WideStr(v) => {
                let text = String::from_utf16(v).map_err(|_| EncodeError::InvalidString)?;
                self.write_str(&text)
            },
            Object::Bytes(v) => {
                self.put(Header::Bin(v.len()))?;
                self.writer.extend_from_slice(v);
                Ok(())
            },
            Object::Date(v) if !opts.contains(Options::PASSTHROUGH_DATETIME) => self.write_str(&temporal::format_date(v)),
            Object::Time(v) if !opts.contains(Options::PASSTHROUGH_DATETIME) => match v.tz {
                Some(TzInfo::Named(_)) => self.encode_fallback(value, depth),
                _ => self.write_str(&temporal::format_time_value(v, opts)?),
            },
            Object::DateTime(v) if !opts.contains(Options::PASSTHROUGH_DATETIME) => match temporal::format_datetime(v, opts) {
                Some(text) => self.write_str(&text),
                None => self.encode_fallback(value, depth),
            },
            Object::Uuid(v) => {
                let mut buf = Uuid::encode_buffer();
                let text = v.hyphenated().encode_lower(&mut buf);
                self.write_str(text)
            },
            Object::List(v) => self.encode_list(v, depth),
            Object::Dict(v) => self.encode_dict(v, depth),
            Object::Set(v) => self.encode_set(v, depth),
            Object::Enum(v) => self.encode_value(v.value(), depth),
            Object::NdArray(v) if opts.contains(Options::SERIALIZE_NDARRAY) => self.encode_ndarray(value, v, depth),
            Object::Scalar(v) if opts.contains(Options::SERIALIZE_NDARRAY) => v.encode(&mut self.writer).map(|_| ()),
            Object::Model(v) if opts.contains(Options::SERIALIZE_MODELS) => self.encode_model(v, depth),
            Object::Ext(v) => v.encode(&mut self.writer).map(|_| ()),
            Object::Sub(v) if v.is_transparent() && !opts.contains(Options::PASSTHROUGH_SUBCLASS) => {
                self.encode_value(v.base(), depth)
            },
            _ => self.encode_fallback(value, depth),
        }
    }

    fn encode_list(&mut self, list: &List, depth: usize) -> Result<(), EncodeError> {
        self.enter(list.identity(), depth)?;
        let result = self.encode_items(&list.items(), depth);
        self.ancestors.pop();
        result
    }

    fn encode_items(&mut self, items: &[Object], depth: usize) -> Result<(), EncodeError> {
        self.put(Header::Arr(items.len()))?;
        for item in items {
            self.encode_value(item, depth + 1)?;
        }
        Ok(())
    }

    fn encode_set(&mut self, set: &Set, depth: usize) -> Result<(), EncodeError> {
        self.enter(set.identity(), depth)?;
        let result = self.encode_items(set.items(), depth);
        self.ancestors.pop();
        result
    }

    fn encode_dict(&mut self, dict: &Dict, depth: usize) -> Result<(), EncodeError> {
        self.enter(dict.identity(), depth)?;
        let result = self.encode_entries(&dict.entries(), depth);
        self.ancestors.pop();
        result
    }

    fn encode_entries(&mut self, entries: &[(Object, Object)], depth: usize) -> Result<(), EncodeError> {
        self.put(Header::Map(entries.len()))?;
        if self.options.contains(Options::SORT_KEYS) {
            let mut sorted = entries.iter().collect::<Vec<_>>();
            key::sort_by_key(&mut sorted, |(k, _)| k)?;
            for (k, v) in sorted {
                self.encode_entry(k, v, depth)?;
            }
        } else {
            for (k, v) in entries {
                self.encode_entry(k, v, depth)?;
            }
        }
        Ok(())
    }

    fn encode_entry(&mut self, key: &Object, value: &Object, depth: usize) -> Result<(), EncodeError> {
        match key {
            Object::Str(k) => self.write_str(k)?,
            _ => { key::normalize_key(key, self.options)?.encode(&mut self.writer)?; },
        }
        self.encode_value(value, depth + 1)
    }

    fn encode_model(&mut self, model: &Rc<dyn Model>, depth: usize) -> Result<(), EncodeError> {
        self.enter(Rc::as_ptr(model) as *const () as usize, depth)?;
        let result = self.encode_fields(model.as_ref(), depth);
        self.ancestors.pop();
        result
    }

    fn encode_fields(&mut self, model: &dyn Model, depth: usize) -> Result<(), EncodeError> {
        let mut fields = model.fields();
        if self.options.contains(Options::SORT_KEYS) {
            fields.sort_by(|(a, _), (b, _)| a.cmp(b));
        }
        self.put(Header::Map(fields.len()))?;
        for (name, value) in &fields {
            self.write_str(name)?;
            self.encode_value(value, depth + 1)?;
        }
        Ok(())
    }

    fn encode_ndarray(&mut self, value: &Object, array: &NdArray, depth: usize) -> Result<(), EncodeError> {
        match array.check() {
            Ok(()) => array.encode(&mut self.writer).map(|_| ()),
            Err(e @ (EncodeError::NdArrayNotContiguous | EncodeError::NdArrayDtype(_) | EncodeError::NdArrayDimension(_)))
                if self.fallback.is_some() =>
            {
                debug!(error = %e, "passing ndarray to fallback");
                self.encode_fallback(value, depth)
            },
            Err(e) => Err(e),
        }
    }

    fn encode_fallback(&mut self, value: &Object, depth: usize) -> Result<(), EncodeError> {
        let unsupported = || EncodeError::UnsupportedType(value.type_name().to_owned());
        if self.fallback_calls >= FALLBACK_LIMIT {
            return Err(unsupported());
        }
        let fallback = match self.fallback.as_deref_mut() {
            Some(fallback) => fallback,
            None => return Err(unsupported()),
        };
        debug!(type_name = value.type_name(), calls = self.fallback_calls, "calling fallback");
        let substitute = fallback(value).map_err(EncodeError::Fallback)?;
        self.fallback_calls += 1;
        let result = self.encode_value(&substitute, depth);
        self.fallback_calls -= 1;
        result
    }

    fn enter(&mut self, identity: usize, depth: usize) -> Result<(), EncodeError> {
        if depth >= RECURSION_LIMIT {
            return Err(EncodeError::RecursionLimit);
        }
        if self.ancestors.contains(&identity) {
            return Err(EncodeError::CircularReference);
        }
        self.ancestors.push(identity);
        Ok(())
    }

    #[inline]
    fn put(&mut self, header: Header) -> Result<(), EncodeError> {
        header.encode(&mut self.writer).map(|_| ())
    }

    #[inline]
    fn write_str(&mut self, v: &str) -> Result<(), EncodeError> {
        self.put(Header::Str(v.len()))?;
        self.writer.extend_from_slice(v.as_bytes());
        Ok(())
    }

}
