//! Tagged opaque blobs, the MessagePack extension type. The encoder writes them as they are; the decoder hands
//! them to the caller's ext hook, since only the application knows what a tag means.

use crate::error::{DecodeError, EncodeError};
use crate::header::Header;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ext {
    tag: u8,
    data: Vec<u8>,
}

impl Ext {

    pub const MAX_TAG: u8 = 127;

    /// Fails with `InvalidExtTag` if `tag` is outside of `0..=127`. Negative tags are reserved by MessagePack.
    pub fn new(tag: u8, data: impl Into<Vec<u8>>) -> Result<Self, EncodeError> {
        if tag > Self::MAX_TAG {
            return Err(EncodeError::InvalidExtTag(tag));
        }
        Ok(Ext { tag, data: data.into() })
    }

    pub fn tag(&self) -> u8 {
        self.tag
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Returns the number of written bytes
    pub fn encode(&self, w: &mut Vec<u8>) -> Result<usize, EncodeError> {
        let c = Header::Ext(self.tag as i8, self.data.len()).encode(w)?;
        w.extend_from_slice(&self.data);
        Ok(c + self.data.len())
    }

}

/// Encodes a single extension value
pub fn encode_ext(tag: u8, data: &[u8]) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::with_capacity(data.len() + 6);
    Ext::new(tag, data)?.encode(&mut buf)?;
    Ok(buf)
}

/// Decodes a single extension value at the start of `buf`. Returns the tag, the payload and the number of consumed
/// bytes. The tag is signed since the wire allows reserved negative tags.
pub fn decode_ext(buf: &[u8]) -> Result<(i8, &[u8], usize), DecodeError> {
    match Header::decode(buf)? {
        (Header::Ext(tag, len), c) => {
            let data = buf.get(c..c + len).ok_or(DecodeError::Eof)?;
            Ok((tag, data, c + len))
        },
        // a header was decoded, so there is a marker byte
        _ => Err(DecodeError::InvalidMarker(buf[0])),
    }
}
