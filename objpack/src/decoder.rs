//! Recursive descent over a single MessagePack value. Maps become dicts and arrays become lists; both float widths
//! become `Object::Float`. Extension values are handed to the caller's ext hook.

use crate::error::{BoxError, DecodeError, DecoderError};
use crate::header::Header;
use crate::key::normalize_key;
use crate::options::Options;
use crate::value::{Dict, List, Object};
use std::collections::hash_map::{Entry, HashMap};
use std::str::from_utf8;
use tracing::{debug, trace};

/// Maximum nesting depth of arrays and maps. Every level costs a few stack frames, this has to fit into the 2 MiB
/// stack of a spawned thread even without optimizations.
pub const DEPTH_LIMIT: usize = 255;

/// Called with the tag and payload of every extension value. The returned object takes its place.
pub type ExtHook<'h> = dyn FnMut(i8, &[u8]) -> Result<Object, BoxError> + 'h;

pub struct Decoder<'a, 'h> {
    buf: &'a [u8],
    pos: usize,
    options: Options,
    ext_hook: Option<&'h mut ExtHook<'h>>,
}

impl<'a, 'h> Decoder<'a, 'h> {

    /// Decode exactly one value spanning the whole buffer.
    pub fn decode<B: ?Sized + AsRef<[u8]>>(buf: &'a B, ext_hook: Option<&'h mut ExtHook<'h>>, options: Options) -> Result<Object, DecoderError> {
        let buf = buf.as_ref();
        let (value, c) = Self::decode_prefix(buf, ext_hook, options)?;
        if c < buf.len() {
            return Err(DecodeError::TrailingBytes(buf.len() - c).at(c));
        }
        Ok(value)
    }

    /// Decode the value at the start of the buffer. Returns the value and the number of consumed bytes, anything after
    /// that is left alone.
    pub fn decode_prefix<B: ?Sized + AsRef<[u8]>>(buf: &'a B, ext_hook: Option<&'h mut ExtHook<'h>>, options: Options) -> Result<(Object, usize), DecoderError> {
        let mut decoder = Self { buf: buf.as_ref(), pos: 0, options, ext_hook };
        trace!(len = decoder.buf.len(), ?options, "decoding");
        let value = decoder.decode_value(0).map_err(|e| e.at(decoder.pos))?;
        trace!(consumed = decoder.pos, "decoded {}", value.type_name());
        Ok((value, decoder.pos))
    }

    fn decode_value(&mut self, depth: usize) -> Result<Object, DecodeError> {
        let header = self.decode_header()?;
        self.decode_with(header, depth)
    }

    fn decode_with(&mut self, header: Header, depth: usize) -> Result<Object, DecodeError> {
        match header {
            Header::Nil       => Ok(Object::None),
            Header::True      => Ok(Object::Bool(true)),
            Header::False     => Ok(Object::Bool(false)),
            Header::F32       => Ok(Object::Float(f32::from_be_bytes(self.decode_array()?) as f64)),
            Header::F64       => Ok(Object::Float(f64::from_be_bytes(self.decode_array()?))),
            Header::UInt(v)   => Ok(Object::Int(v as i128)),
            Header::NegInt(v) => Ok(Object::Int(v as i128)),
            Header::Str(v)    => Ok(Object::Str(from_utf8(self.decode_slice(v)?)?.to_owned())),
            Header::Bin(v)    => Ok(Object::Bytes(self.decode_slice(v)?.to_vec())),
            Header::Arr(v) => {
                self.check_depth(depth)?;
                let mut elements = self.with_capacity(v)?;
                for _ in 0..v {
                    elements.push(self.decode_value(depth + 1)?);
                }
                Ok(Object::List(List::from_vec(elements)))
            },
            Header::Map(v) => self.decode_map(v, depth),
            Header::Ext(tag, v) => {
                let data = self.decode_slice(v)?;
                match self.ext_hook.as_deref_mut() {
                    Some(hook) => {
                        debug!(tag, len = v, "calling ext_hook");
                        hook(tag, data).map_err(DecodeError::ExtHook)
                    },
                    None => Err(DecodeError::UnexpectedExtension(tag)),
                }
            },
        }
    }

    /// Duplicate keys are detected by their most compact encoding, so `0xa1 'a'` and `0xd9 0x01 'a'` are the same key.
    /// The last value wins, the first position is kept.
    fn decode_map(&mut self, len: usize, depth: usize) -> Result<Object, DecodeError> {
        self.check_depth(depth)?;
        let mut entries: Vec<(Object, Object)> = self.with_capacity(len)?;
        let mut seen = HashMap::<Vec<u8>, usize>::with_capacity(len);
        for _ in 0..len {
            let key = self.decode_key(depth + 1)?;
            let canonical = Self::canonical(&key)?;
            let value = self.decode_value(depth + 1)?;
            match seen.entry(canonical) {
                Entry::Occupied(slot) => entries[*slot.get()].1 = value,
                Entry::Vacant(slot) => {
                    slot.insert(entries.len());
                    entries.push((key, value));
                },
            }
        }
        Ok(Object::Dict(Dict::from_unique(entries)))
    }

    /// Decoded keys are always valid native keys, and tuple keys are nested less deeply than `RECURSION_LIMIT`.
    fn canonical(key: &Object) -> Result<Vec<u8>, DecodeError> {
        let mut buf = Vec::new();
        normalize_key(key, Options::NON_STR_KEYS)
            .and_then(|k| k.encode(&mut buf))
            .map_err(|_| DecodeError::RecursionLimit)?;
        Ok(buf)
    }

    fn decode_key(&mut self, depth: usize) -> Result<Object, DecodeError> {
        let header = self.decode_header()?;
        match header {
            Header::Str(_) => self.decode_with(header, depth),
            _ if !self.options.contains(Options::NON_STR_KEYS) => Err(DecodeError::NonStringKey(header.name())),
            Header::Nil | Header::Map(_) | Header::Ext(_, _) => Err(DecodeError::InvalidKey(header.name())),
            Header::Arr(v) => {
                self.check_depth(depth)?;
                let mut elements = self.with_capacity(v)?;
                for _ in 0..v {
                    elements.push(self.decode_key(depth + 1)?);
                }
                Ok(Object::Tuple(elements))
            },
            _ => self.decode_with(header, depth),
        }
    }

    fn decode_header(&mut self) -> Result<Header, DecodeError> {
        let (header, c) = Header::decode(&self.buf[self.pos..])?;
        self.pos += c;
        Ok(header)
    }

    fn decode_slice(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.buf[self.pos..].len() < len {
            Err(DecodeError::Eof)
        } else {
            self.pos += len;
            Ok(&self.buf[self.pos - len .. self.pos])
        }
    }

    fn decode_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let slice = self.decode_slice(N)?;
        <[u8; N]>::try_from(slice).map_err(|_| DecodeError::Eof)
    }

    /// Every element takes at least one byte, so a length beyond the remaining input can't be valid. Checking this
    /// up front keeps forged lengths from triggering huge allocations.
    fn with_capacity<T>(&self, len: usize) -> Result<Vec<T>, DecodeError> {
        if len > self.buf.len() - self.pos {
            Err(DecodeError::Eof)
        } else {
            Ok(Vec::with_capacity(len))
        }
    }

    #[inline]
    fn check_depth(&self, depth: usize) -> Result<(), DecodeError> {
        if depth >= DEPTH_LIMIT {
            Err(DecodeError::RecursionLimit)
        } else {
            Ok(())
        }
    }

}
