//! Homogeneous N-dimensional numeric buffers. An `NdArray` describes a buffer view: its shape, element type,
//! whether it is laid out row-major without gaps, and the raw elements in native byte order. Encoding walks the
//! shape and writes nested arrays whose innermost values are taken straight from the raw bytes.

use crate::error::EncodeError;
use crate::header::Header;
use std::fmt;
use std::mem::size_of;
use std::rc::Rc;

/// Highest number of dimensions a buffer may have
pub const MAX_NDIM: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    /// Pointer sized signed integer
    IntP,
    /// Pointer sized unsigned integer
    UIntP,
    Float32,
    Float64,
    Bool,
    /// Any element type without a wire representation, such as `float16` or `complex128`
    Other(&'static str),
}

impl DType {

    pub fn name(&self) -> &'static str {
        match *self {
            DType::Int8    => "int8",
            DType::Int16   => "int16",
            DType::Int32   => "int32",
            DType::Int64   => "int64",
            DType::UInt8   => "uint8",
            DType::UInt16  => "uint16",
            DType::UInt32  => "uint32",
            DType::UInt64  => "uint64",
            DType::IntP    => "intp",
            DType::UIntP   => "uintp",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
            DType::Bool    => "bool",
            DType::Other(name) => name,
        }
    }

    /// Size of one element in bytes, `None` for unsupported types
    pub fn itemsize(&self) -> Option<usize> {
        match *self {
            DType::Int8 | DType::UInt8 | DType::Bool => Some(1),
            DType::Int16 | DType::UInt16             => Some(2),
            DType::Int32 | DType::UInt32             => Some(4),
            DType::Float32                           => Some(4),
            DType::Int64 | DType::UInt64             => Some(8),
            DType::Float64                           => Some(8),
            DType::IntP | DType::UIntP               => Some(size_of::<usize>()),
            DType::Other(_)                          => None,
        }
    }

}

/// Rust types that can be the elements of an `NdArray`
pub trait Element: Copy {
    const DTYPE: DType;
    fn write_ne(self, out: &mut Vec<u8>);
}

macro_rules! element {
    ($($t:ty => $d:ident),*) => {
        $(impl Element for $t {
            const DTYPE: DType = DType::$d;
            fn write_ne(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_ne_bytes());
            }
        })*
    };
}

element!(i8 => Int8, i16 => Int16, i32 => Int32, i64 => Int64, u8 => UInt8, u16 => UInt16, u32 => UInt32,
    u64 => UInt64, isize => IntP, usize => UIntP, f32 => Float32, f64 => Float64);

impl Element for bool {
    const DTYPE: DType = DType::Bool;
    fn write_ne(self, out: &mut Vec<u8>) {
        out.push(self as u8);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NdArray {
    shape: Vec<usize>,
    dtype: DType,
    contiguous: bool,
    data: Rc<[u8]>,
}

impl NdArray {

    /// Describes an existing buffer. `data` holds the elements in native byte order.
    pub fn new(shape: Vec<usize>, dtype: DType, contiguous: bool, data: impl Into<Rc<[u8]>>) -> Self {
        NdArray { shape, dtype, contiguous, data: data.into() }
    }

    /// A contiguous buffer of the given shape, filled row-major from `elements`.
    pub fn from_elements<T: Element>(shape: Vec<usize>, elements: &[T]) -> Self {
        let mut data = Vec::with_capacity(elements.len() * size_of::<T>());
        for e in elements {
            e.write_ne(&mut data);
        }
        Self::new(shape, T::DTYPE, true, data)
    }

    /// The same buffer described as a strided view, e.g. a transpose or a slice with a step
    pub fn non_contiguous(mut self) -> Self {
        self.contiguous = false;
        self
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn is_contiguous(&self) -> bool {
        self.contiguous
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Checks that the buffer can be encoded. `NdArrayMalformed` means the descriptor lies about its data;
    /// the other errors describe views that are valid but have no direct wire representation.
    pub fn check(&self) -> Result<(), EncodeError> {
        if self.shape.is_empty() || self.shape.len() > MAX_NDIM {
            return Err(EncodeError::NdArrayDimension(self.shape.len()));
        }
        if !self.contiguous {
            return Err(EncodeError::NdArrayNotContiguous);
        }
        let itemsize = self.dtype.itemsize().ok_or_else(|| EncodeError::NdArrayDtype(self.dtype.name().to_owned()))?;
        let expected = self.shape.iter()
            .try_fold(itemsize, |acc, extent| acc.checked_mul(*extent))
            .ok_or(EncodeError::NdArrayMalformed)?;
        if expected != self.data.len() {
            return Err(EncodeError::NdArrayMalformed);
        }
        Ok(())
    }

    /// Writes the buffer as nested arrays. Returns the number of written bytes.
    pub fn encode(&self, w: &mut Vec<u8>) -> Result<usize, EncodeError> {
        self.check()?;
        let mut elements = self.data.chunks_exact(self.dtype.itemsize().unwrap_or(1));
        self.encode_dim(0, &mut elements, w)
    }

    fn encode_dim(&self, dim: usize, elements: &mut std::slice::ChunksExact<'_, u8>, w: &mut Vec<u8>) -> Result<usize, EncodeError> {
        let extent = self.shape[dim];
        let mut c = Header::Arr(extent).encode(w)?;
        if dim + 1 == self.shape.len() {
            for raw in elements.take(extent) {
                c += Scalar::from_ne_bytes(self.dtype, raw).ok_or(EncodeError::NdArrayMalformed)?.encode(w)?;
            }
        } else {
            for _ in 0..extent {
                c += self.encode_dim(dim + 1, elements, w)?;
            }
        }
        Ok(c)
    }

}

/// A single numeric value tagged with its element type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    IntP(isize),
    UIntP(usize),
    Float32(f32),
    Float64(f64),
    Bool(bool),
}

impl Scalar {

    pub fn dtype(&self) -> DType {
        match *self {
            Scalar::Int8(_)    => DType::Int8,
            Scalar::Int16(_)   => DType::Int16,
            Scalar::Int32(_)   => DType::Int32,
            Scalar::Int64(_)   => DType::Int64,
            Scalar::UInt8(_)   => DType::UInt8,
            Scalar::UInt16(_)  => DType::UInt16,
            Scalar::UInt32(_)  => DType::UInt32,
            Scalar::UInt64(_)  => DType::UInt64,
            Scalar::IntP(_)    => DType::IntP,
            Scalar::UIntP(_)   => DType::UIntP,
            Scalar::Float32(_) => DType::Float32,
            Scalar::Float64(_) => DType::Float64,
            Scalar::Bool(_)    => DType::Bool,
        }
    }

    /// Reads one element of type `dtype` from `raw`, which must be exactly one item long.
    fn from_ne_bytes(dtype: DType, raw: &[u8]) -> Option<Scalar> {
        Some(match dtype {
            DType::Int8    => Scalar::Int8(i8::from_ne_bytes(raw.try_into().ok()?)),
            DType::Int16   => Scalar::Int16(i16::from_ne_bytes(raw.try_into().ok()?)),
            DType::Int32   => Scalar::Int32(i32::from_ne_bytes(raw.try_into().ok()?)),
            DType::Int64   => Scalar::Int64(i64::from_ne_bytes(raw.try_into().ok()?)),
            DType::UInt8   => Scalar::UInt8(u8::from_ne_bytes(raw.try_into().ok()?)),
            DType::UInt16  => Scalar::UInt16(u16::from_ne_bytes(raw.try_into().ok()?)),
            DType::UInt32  => Scalar::UInt32(u32::from_ne_bytes(raw.try_into().ok()?)),
            DType::UInt64  => Scalar::UInt64(u64::from_ne_bytes(raw.try_into().ok()?)),
            DType::IntP    => Scalar::IntP(isize::from_ne_bytes(raw.try_into().ok()?)),
            DType::UIntP   => Scalar::UIntP(usize::from_ne_bytes(raw.try_into().ok()?)),
            DType::Float32 => Scalar::Float32(f32::from_ne_bytes(raw.try_into().ok()?)),
            DType::Float64 => Scalar::Float64(f64::from_ne_bytes(raw.try_into().ok()?)),
            DType::Bool    => Scalar::Bool(*raw.first()? != 0),
            DType::Other(_) => return None,
        })
    }

    /// Writes the scalar as a wire int, float or bool. Returns the number of written bytes.
    pub fn encode(&self, w: &mut Vec<u8>) -> Result<usize, EncodeError> {
        match *self {
            Scalar::Int8(v)    => Header::int(v as i64).encode(w),
            Scalar::Int16(v)   => Header::int(v as i64).encode(w),
            Scalar::Int32(v)   => Header::int(v as i64).encode(w),
            Scalar::Int64(v)   => Header::int(v).encode(w),
            Scalar::UInt8(v)   => Header::UInt(v as u64).encode(w),
            Scalar::UInt16(v)  => Header::UInt(v as u64).encode(w),
            Scalar::UInt32(v)  => Header::UInt(v as u64).encode(w),
            Scalar::UInt64(v)  => Header::UInt(v).encode(w),
            Scalar::IntP(v)    => Header::int(v as i64).encode(w),
            Scalar::UIntP(v)   => Header::UInt(v as u64).encode(w),
            Scalar::Bool(true) => Header::True.encode(w),
            Scalar::Bool(false) => Header::False.encode(w),
            Scalar::Float32(v) => {
                let c = Header::F32.encode(w)?;
                w.extend_from_slice(&v.to_be_bytes());
                Ok(c + size_of::<f32>())
            },
            Scalar::Float64(v) => {
                let c = Header::F64.encode(w)?;
                w.extend_from_slice(&v.to_be_bytes());
                Ok(c + size_of::<f64>())
            },
        }
    }

}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int8(v)    => write!(f, "{}", v),
            Scalar::Int16(v)   => write!(f, "{}", v),
            Scalar::Int32(v)   => write!(f, "{}", v),
            Scalar::Int64(v)   => write!(f, "{}", v),
            Scalar::UInt8(v)   => write!(f, "{}", v),
            Scalar::UInt16(v)  => write!(f, "{}", v),
            Scalar::UInt32(v)  => write!(f, "{}", v),
            Scalar::UInt64(v)  => write!(f, "{}", v),
            Scalar::IntP(v)    => write!(f, "{}", v),
            Scalar::UIntP(v)   => write!(f, "{}", v),
            Scalar::Float32(v) => write!(f, "{:?}", v),
            Scalar::Float64(v) => write!(f, "{:?}", v),
            Scalar::Bool(v)    => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(array: &NdArray) -> Result<Vec<u8>, EncodeError> {
        let mut buf = Vec::new();
        array.encode(&mut buf)?;
        Ok(buf)
    }

    #[test]
    fn one_dimension() {
        let array = NdArray::from_elements(vec![3], &[1i32, -1, 300]);
        assert_eq!(vec![0x93, 0x01, 0xff, 0xcd, 0x01, 0x2c], encode(&array).unwrap());
        let array = NdArray::from_elements(vec![2], &[true, false]);
        assert_eq!(vec![0x92, 0xc3, 0xc2], encode(&array).unwrap());
    }

    /// Encodes `elements` as a 2 x n array and compares with the nested `Vec` written by rmp-serde
    fn assert_reference<T: Element + serde::Serialize>(elements: &[T]) {
        let half = elements.len() / 2;
        let array = NdArray::from_elements(vec![2, half], elements);
        let nested = vec![&elements[..half], &elements[half..]];
        assert_eq!(rmp_serde::to_vec(&nested).unwrap(), encode(&array).unwrap(), "{}", T::DTYPE.name());
    }

    #[test]
    fn every_dtype_matches_reference() {
        assert_reference(&[i8::MIN, -33, -32, -1, 0, i8::MAX]);
        assert_reference(&[i16::MIN, -129, 128, 255, 256, i16::MAX]);
        assert_reference(&[i32::MIN, -32_769, 65_535, 65_536, 0, i32::MAX]);
        assert_reference(&[i64::MIN, -2_147_483_649, 4_294_967_296, 1, -1, i64::MAX]);
        assert_reference(&[0u8, 127, 128, u8::MAX]);
        assert_reference(&[0u16, 255, 256, u16::MAX]);
        assert_reference(&[0u32, 65_536, u32::MAX, 1]);
        assert_reference(&[0u64, u32::MAX as u64 + 1, u64::MAX, 7]);
        assert_reference(&[isize::MIN, -1, 0, isize::MAX]);
        assert_reference(&[0usize, 300, usize::MAX, 1]);
        assert_reference(&[1.5f32, -0.0, f32::INFINITY, f32::MIN_POSITIVE]);
        assert_reference(&[1.5f64, -0.0, f64::MAX, 1e-300]);
        assert_reference(&[true, false, false, true]);
    }

    #[test]
    fn float32_stays_float32() {
        let array = NdArray::from_elements(vec![1], &[1.5f32]);
        assert_eq!(vec![0x91, 0xca, 0x3f, 0xc0, 0x00, 0x00], encode(&array).unwrap());
        let array = NdArray::from_elements(vec![1], &[1.5f64]);
        assert_eq!(vec![0x91, 0xcb, 0x3f, 0xf8, 0, 0, 0, 0, 0, 0], encode(&array).unwrap());
    }

    #[test]
    fn row_major() {
        let array = NdArray::from_elements(vec![2, 3], &[1u8, 2, 3, 4, 5, 6]);
        assert_eq!(vec![0x92, 0x93, 1, 2, 3, 0x93, 4, 5, 6], encode(&array).unwrap());
    }

    #[test]
    fn zero_extent() {
        let array = NdArray::from_elements::<i64>(vec![0], &[]);
        assert_eq!(vec![0x90], encode(&array).unwrap());
        let array = NdArray::from_elements::<i64>(vec![2, 0, 3], &[]);
        assert_eq!(vec![0x92, 0x90, 0x90], encode(&array).unwrap());
    }

    #[test]
    fn many_dimensions() {
        let array = NdArray::from_elements(vec![1; 32], &[7u16]);
        let mut expected = vec![0x91; 32];
        expected.push(7);
        assert_eq!(expected, encode(&array).unwrap());
    }

    #[test]
    fn unsupported_views() {
        let array = NdArray::from_elements(vec![], &[1u8]);
        assert!(matches!(encode(&array), Err(EncodeError::NdArrayDimension(0))));
        let array = NdArray::from_elements(vec![1; MAX_NDIM + 1], &[1u8]);
        assert!(matches!(encode(&array), Err(EncodeError::NdArrayDimension(65))));
        let array = NdArray::from_elements(vec![2, 2], &[1u8, 2, 3, 4]).non_contiguous();
        assert!(matches!(encode(&array), Err(EncodeError::NdArrayNotContiguous)));
        let array = NdArray::new(vec![2], DType::Other("float16"), true, vec![0u8; 4]);
        assert!(matches!(encode(&array), Err(EncodeError::NdArrayDtype(ref name)) if name == "float16"));
    }

    #[test]
    fn malformed() {
        let array = NdArray::new(vec![3], DType::Int32, true, vec![0u8; 8]);
        assert!(matches!(encode(&array), Err(EncodeError::NdArrayMalformed)));
        let array = NdArray::new(vec![usize::MAX, 2], DType::Int8, true, vec![0u8; 2]);
        assert!(matches!(encode(&array), Err(EncodeError::NdArrayMalformed)));
    }

    #[test]
    fn scalars() {
        let mut buf = Vec::new();
        Scalar::UInt64(u64::MAX).encode(&mut buf).unwrap();
        Scalar::Int8(-5).encode(&mut buf).unwrap();
        Scalar::Float32(0.0).encode(&mut buf).unwrap();
        assert_eq!(vec![0xcf, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfb, 0xca, 0, 0, 0, 0], buf);
        assert_eq!("float32", Scalar::Float32(0.0).dtype().name());
    }

}
