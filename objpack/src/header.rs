//! A MessagePack header is the marker byte of a value plus the length or tag bytes that directly follow it.
//! Small integers and short lengths are packed into the marker itself ("fix" formats), everything else
//! announces a big-endian integer of one, two, four or eight bytes. Payloads (the bytes of a string, the
//! elements of an array, the bits of a float) are not part of the header and get handled by the caller.

use crate::error::{DecodeError, EncodeError};
use std::convert::TryFrom;

// marker bytes
const POSFIXINT_MAX: u8 = 0x7f;
const FIXMAP: u8 = 0x80;
const FIXARRAY: u8 = 0x90;
const FIXSTR: u8 = 0xa0;
const NIL: u8 = 0xc0;
const NEVER_USED: u8 = 0xc1;
const FALSE: u8 = 0xc2;
const TRUE: u8 = 0xc3;
const BIN8: u8 = 0xc4;
const BIN16: u8 = 0xc5;
const BIN32: u8 = 0xc6;
const EXT8: u8 = 0xc7;
const EXT16: u8 = 0xc8;
const EXT32: u8 = 0xc9;
const FLOAT32: u8 = 0xca;
const FLOAT64: u8 = 0xcb;
const UINT8: u8 = 0xcc;
const UINT16: u8 = 0xcd;
const UINT32: u8 = 0xce;
const UINT64: u8 = 0xcf;
const INT8: u8 = 0xd0;
const INT16: u8 = 0xd1;
const INT32: u8 = 0xd2;
const INT64: u8 = 0xd3;
const FIXEXT1: u8 = 0xd4;
const FIXEXT2: u8 = 0xd5;
const FIXEXT4: u8 = 0xd6;
const FIXEXT8: u8 = 0xd7;
const FIXEXT16: u8 = 0xd8;
const STR8: u8 = 0xd9;
const STR16: u8 = 0xda;
const STR32: u8 = 0xdb;
const ARRAY16: u8 = 0xdc;
const ARRAY32: u8 = 0xdd;
const MAP16: u8 = 0xde;
const MAP32: u8 = 0xdf;
const NEGFIXINT_MIN: i64 = -32;

/// Markers of one length family, from the most compact to the widest. `fix` carries the base marker and the
/// largest length it can hold in its low bits.
struct Family {
    fix: Option<(u8, usize)>,
    len8: Option<u8>,
    len16: u8,
    len32: u8,
}

const STR: Family = Family { fix: Some((FIXSTR, 31)), len8: Some(STR8), len16: STR16, len32: STR32 };
const BIN: Family = Family { fix: None, len8: Some(BIN8), len16: BIN16, len32: BIN32 };
const ARR: Family = Family { fix: Some((FIXARRAY, 15)), len8: None, len16: ARRAY16, len32: ARRAY32 };
const MAP: Family = Family { fix: Some((FIXMAP, 15)), len8: None, len16: MAP16, len32: MAP32 };

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Header {

    /// Also known as unit or null
    Nil,
    /// The boolean value true
    True,
    /// The boolean value false
    False,
    /// The following four bytes contain an IEEE-754 32-bit floating point number
    F32,
    /// The following eight bytes contain an IEEE-754 64-bit floating point number
    F64,
    /// A non-negative integer; the value is part of the header
    UInt(u64),
    /// A strictly negative integer; the value is part of the header
    NegInt(i64),
    /// The value describes the length in bytes of a following UTF-8 string
    Str(usize),
    /// The value describes the length of a following byte array
    Bin(usize),
    /// The value describes the length in values of the array
    Arr(usize),
    /// The value describes the number of entries of the map. Entries are encoded in
    /// key value key value ... order.
    Map(usize),
    /// An application defined type tag and the length of the following opaque payload
    Ext(i8, usize),
}

impl Header {

    /// Returns the header for a signed integer, picking the unsigned family for non-negative values.
    pub fn int(value: i64) -> Header {
        if value < 0 {
            Header::NegInt(value)
        } else {
            Header::UInt(value as u64)
        }
    }

    /// Returns the header for an integer within [-2^63, 2^64-1] and `None` outside of it.
    pub fn wide_int(value: i128) -> Option<Header> {
        if value < 0 {
            i64::try_from(value).ok().map(Header::NegInt)
        } else {
            u64::try_from(value).ok().map(Header::UInt)
        }
    }

    /// Returns the mnemonic of the header. This is useful for error messages.
    pub fn name(&self) -> &'static str {
        match *self {
            Header::Nil       => "nil",
            Header::True      => "true",
            Header::False     => "false",
            Header::F32       => "float32",
            Header::F64       => "float64",
            Header::UInt(_)   => "uint",
            Header::NegInt(_) => "int",
            Header::Str(_)    => "str",
            Header::Bin(_)    => "bin",
            Header::Arr(_)    => "array",
            Header::Map(_)    => "map",
            Header::Ext(_, _) => "ext",
        }
    }

    /// Returns the number of written bytes
    pub fn encode(&self, w: &mut Vec<u8>) -> Result<usize, EncodeError> {
        match *self {
            Header::Nil       => { w.push(NIL); Ok(1) },
            Header::True      => { w.push(TRUE); Ok(1) },
            Header::False     => { w.push(FALSE); Ok(1) },
            Header::F32       => { w.push(FLOAT32); Ok(1) },
            Header::F64       => { w.push(FLOAT64); Ok(1) },
            Header::UInt(i)   => Ok(Self::encode_uint(i, w)),
            Header::NegInt(i) => Ok(Self::encode_negint(i, w)),
            Header::Str(len)  => Self::encode_len(&STR, len, w),
            Header::Bin(len)  => Self::encode_len(&BIN, len, w),
            Header::Arr(len)  => Self::encode_len(&ARR, len, w),
            Header::Map(len)  => Self::encode_len(&MAP, len, w),
            Header::Ext(tag, len) => Self::encode_ext(tag, len, w),
        }
    }

    /// Returns the decoded header and the number of consumed bytes
    pub fn decode<B: ?Sized + AsRef<[u8]>>(buf: &B) -> Result<(Self, usize), DecodeError> {
        let buf = buf.as_ref();
        let marker = *buf.first().ok_or(DecodeError::Eof)?;
        match marker {
            0x00..=POSFIXINT_MAX => Ok((Header::UInt(marker as u64), 1)),
            0x80..=0x8f          => Ok((Header::Map((marker & 0x0f) as usize), 1)),
            0x90..=0x9f          => Ok((Header::Arr((marker & 0x0f) as usize), 1)),
            0xa0..=0xbf          => Ok((Header::Str((marker & 0x1f) as usize), 1)),
            NIL                  => Ok((Header::Nil, 1)),
            NEVER_USED           => Err(DecodeError::InvalidMarker(marker)),
            FALSE                => Ok((Header::False, 1)),
            TRUE                 => Ok((Header::True, 1)),
            BIN8                 => Ok((Header::Bin(Self::decode_u8(buf)? as usize), 2)),
            BIN16                => Ok((Header::Bin(Self::decode_u16(buf)? as usize), 3)),
            BIN32                => Ok((Header::Bin(Self::to_usize(Self::decode_u32(buf)? as u64)?), 5)),
            EXT8                 => Ok((Header::Ext(Self::tag_at(buf, 2)?, Self::decode_u8(buf)? as usize), 3)),
            EXT16                => Ok((Header::Ext(Self::tag_at(buf, 3)?, Self::decode_u16(buf)? as usize), 4)),
            EXT32                => Ok((Header::Ext(Self::tag_at(buf, 5)?, Self::to_usize(Self::decode_u32(buf)? as u64)?), 6)),
            FLOAT32              => Ok((Header::F32, 1)),
            FLOAT64              => Ok((Header::F64, 1)),
            UINT8                => Ok((Header::UInt(Self::decode_u8(buf)? as u64), 2)),
            UINT16               => Ok((Header::UInt(Self::decode_u16(buf)? as u64), 3)),
            UINT32               => Ok((Header::UInt(Self::decode_u32(buf)? as u64), 5)),
            UINT64               => Ok((Header::UInt(u64::from_be_bytes(Self::payload(buf)?)), 9)),
            INT8                 => Ok((Header::int(Self::decode_u8(buf)? as i8 as i64), 2)),
            INT16                => Ok((Header::int(Self::decode_u16(buf)? as i16 as i64), 3)),
            INT32                => Ok((Header::int(Self::decode_u32(buf)? as i32 as i64), 5)),
            INT64                => Ok((Header::int(i64::from_be_bytes(Self::payload(buf)?)), 9)),
            FIXEXT1              => Ok((Header::Ext(Self::tag_at(buf, 1)?, 1), 2)),
            FIXEXT2              => Ok((Header::Ext(Self::tag_at(buf, 1)?, 2), 2)),
            FIXEXT4              => Ok((Header::Ext(Self::tag_at(buf, 1)?, 4), 2)),
            FIXEXT8              => Ok((Header::Ext(Self::tag_at(buf, 1)?, 8), 2)),
            FIXEXT16             => Ok((Header::Ext(Self::tag_at(buf, 1)?, 16), 2)),
            STR8                 => Ok((Header::Str(Self::decode_u8(buf)? as usize), 2)),
            STR16                => Ok((Header::Str(Self::decode_u16(buf)? as usize), 3)),
            STR32                => Ok((Header::Str(Self::to_usize(Self::decode_u32(buf)? as u64)?), 5)),
            ARRAY16              => Ok((Header::Arr(Self::decode_u16(buf)? as usize), 3)),
            ARRAY32              => Ok((Header::Arr(Self::to_usize(Self::decode_u32(buf)? as u64)?), 5)),
            MAP16                => Ok((Header::Map(Self::decode_u16(buf)? as usize), 3)),
            MAP32                => Ok((Header::Map(Self::to_usize(Self::decode_u32(buf)? as u64)?), 5)),
            0xe0..=0xff          => Ok((Header::NegInt(marker as i8 as i64), 1)),
        }
    }

    #[inline]
    fn encode_uint(i: u64, w: &mut Vec<u8>) -> usize {
        if i <= POSFIXINT_MAX as u64 {
            w.push(i as u8);
            1
        } else if i <= u8::MAX as u64 {
            w.extend_from_slice(&[UINT8, i as u8]);
            2
        } else if i <= u16::MAX as u64 {
            w.push(UINT16);
            w.extend_from_slice(&(i as u16).to_be_bytes());
            3
        } else if i <= u32::MAX as u64 {
            w.push(UINT32);
            w.extend_from_slice(&(i as u32).to_be_bytes());
            5
        } else {
            w.push(UINT64);
            w.extend_from_slice(&i.to_be_bytes());
            9
        }
    }

    #[inline]
    fn encode_negint(i: i64, w: &mut Vec<u8>) -> usize {
        if i >= 0 {
            Self::encode_uint(i as u64, w)
        } else if i >= NEGFIXINT_MIN {
            w.push(i as i8 as u8);
            1
        } else if i >= i8::MIN as i64 {
            w.extend_from_slice(&[INT8, i as i8 as u8]);
            2
        } else if i >= i16::MIN as i64 {
            w.push(INT16);
            w.extend_from_slice(&(i as i16).to_be_bytes());
            3
        } else if i >= i32::MIN as i64 {
            w.push(INT32);
            w.extend_from_slice(&(i as i32).to_be_bytes());
            5
        } else {
            w.push(INT64);
            w.extend_from_slice(&i.to_be_bytes());
            9
        }
    }

    #[inline]
    fn encode_len(family: &Family, len: usize, w: &mut Vec<u8>) -> Result<usize, EncodeError> {
        match family.fix {
            Some((marker, max)) if len <= max => {
                w.push(marker | len as u8);
                return Ok(1);
            },
            _ => {},
        }
        match family.len8 {
            Some(marker) if len <= u8::MAX as usize => {
                w.extend_from_slice(&[marker, len as u8]);
                return Ok(2);
            },
            _ => {},
        }
        if len <= u16::MAX as usize {
            w.push(family.len16);
            w.extend_from_slice(&(len as u16).to_be_bytes());
            Ok(3)
        } else {
            w.push(family.len32);
            w.extend_from_slice(&Self::to_u32(len)?.to_be_bytes());
            Ok(5)
        }
    }

    #[inline]
    fn encode_ext(tag: i8, len: usize, w: &mut Vec<u8>) -> Result<usize, EncodeError> {
        let tag = tag as u8;
        match len {
            1  => { w.extend_from_slice(&[FIXEXT1, tag]); Ok(2) },
            2  => { w.extend_from_slice(&[FIXEXT2, tag]); Ok(2) },
            4  => { w.extend_from_slice(&[FIXEXT4, tag]); Ok(2) },
            8  => { w.extend_from_slice(&[FIXEXT8, tag]); Ok(2) },
            16 => { w.extend_from_slice(&[FIXEXT16, tag]); Ok(2) },
            _ if len <= u8::MAX as usize => { w.extend_from_slice(&[EXT8, len as u8, tag]); Ok(3) },
            _ if len <= u16::MAX as usize => {
                w.push(EXT16);
                w.extend_from_slice(&(len as u16).to_be_bytes());
                w.push(tag);
                Ok(4)
            },
            _ => {
                let len = Self::to_u32(len)?;
                w.push(EXT32);
                w.extend_from_slice(&len.to_be_bytes());
                w.push(tag);
                Ok(6)
            },
        }
    }

    /// Returns the `N` bytes following the marker
    #[inline]
    fn payload<const N: usize>(buf: &[u8]) -> Result<[u8; N], DecodeError> {
        buf.get(1..1 + N)
            .and_then(|bytes| <[u8; N]>::try_from(bytes).ok())
            .ok_or(DecodeError::Eof)
    }

    #[inline]
    fn decode_u8(buf: &[u8]) -> Result<u8, DecodeError> {
        Self::payload::<1>(buf).map(|b| b[0])
    }

    #[inline]
    fn decode_u16(buf: &[u8]) -> Result<u16, DecodeError> {
        Self::payload(buf).map(u16::from_be_bytes)
    }

    #[inline]
    fn decode_u32(buf: &[u8]) -> Result<u32, DecodeError> {
        Self::payload(buf).map(u32::from_be_bytes)
    }

    #[inline]
    fn tag_at(buf: &[u8], at: usize) -> Result<i8, DecodeError> {
        buf.get(at).map(|b| *b as i8).ok_or(DecodeError::Eof)
    }

    #[inline]
    fn to_usize(value: u64) -> Result<usize, DecodeError> {
        usize::try_from(value).map_err(|_| DecodeError::Length(value))
    }

    #[inline]
    fn to_u32(value: usize) -> Result<u32, EncodeError> {
        u32::try_from(value).map_err(|_| EncodeError::Length(value))
    }

}
