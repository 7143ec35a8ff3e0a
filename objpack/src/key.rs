//! Map keys. On the wire a key can be any MessagePack value, but the native model only allows a small set of kinds:
//! text by default, and with `NON_STR_KEYS` also numbers, booleans, bytes, identifiers, temporal values and tuples
//! of those. Temporal values and identifiers become their canonical strings.
//!
//! Sorting happens on the native keys, before normalization, and follows the ordering rules of the host: only keys
//! of the same kind can be compared. Comparing a date with a string fails, even if both would end up as text.

use crate::error::EncodeError;
use crate::header::Header;
use crate::options::Options;
use crate::temporal;
use crate::value::{Object, Time, TzInfo};
use crate::RECURSION_LIMIT;
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::mem::size_of;
use uuid::Uuid;

/// A normalized key, ready for the wire
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    Str(String),
    /// Always within [-2^63, 2^64-1]
    Int(i128),
    Float(f64),
    Bool(bool),
    Bin(Vec<u8>),
    Array(Vec<Key>),
}

impl Key {

    /// Returns the number of written bytes
    pub fn encode(&self, w: &mut Vec<u8>) -> Result<usize, EncodeError> {
        match self {
            Key::Str(v) => {
                let c = Header::Str(v.len()).encode(w)?;
                w.extend_from_slice(v.as_bytes());
                Ok(c + v.len())
            },
            Key::Int(v) => Header::wide_int(*v).ok_or(EncodeError::KeyRange(*v))?.encode(w),
            Key::Float(v) => {
                let c = Header::F64.encode(w)?;
                w.extend_from_slice(&v.to_be_bytes());
                Ok(c + size_of::<f64>())
            },
            Key::Bool(true) => Header::True.encode(w),
            Key::Bool(false) => Header::False.encode(w),
            Key::Bin(v) => {
                let c = Header::Bin(v.len()).encode(w)?;
                w.extend_from_slice(v);
                Ok(c + v.len())
            },
            Key::Array(v) => {
                let mut c = Header::Arr(v.len()).encode(w)?;
                for key in v {
                    c += key.encode(w)?;
                }
                Ok(c)
            },
        }
    }

}

/// Converts a native map key into its wire form.
pub fn normalize_key(candidate: &Object, options: Options) -> Result<Key, EncodeError> {
    normalize(candidate, options, 0)
}

fn normalize(candidate: &Object, options: Options, depth: usize) -> Result<Key, EncodeError> {
    match candidate {
        Object::Str(v)     => Ok(Key::Str(v.clone())),
        Object::WideStr(v) => String::from_utf16(v).map(Key::Str).map_err(|_| EncodeError::InvalidString),
        // specializations of text are keys even when specializations are passed through
        Object::Sub(sub) if matches!(sub.base(), Object::Str(_) | Object::WideStr(_)) => normalize(sub.base(), options, depth),
        _ if !options.contains(Options::NON_STR_KEYS) => {
            Err(EncodeError::KeyType(format!("key must be str, found {}", candidate.type_name())))
        },
        Object::Sub(sub) if matches!(sub.base(), Object::Int(_)) => normalize(sub.base(), options, depth),
        Object::Enum(member) => normalize(member.value(), options, depth),
        Object::Bool(v)     => Ok(Key::Bool(*v)),
        Object::Int(v)      => Header::wide_int(*v).map(|_| Key::Int(*v)).ok_or(EncodeError::KeyRange(*v)),
        Object::Float(v)    => Ok(Key::Float(*v)),
        Object::Bytes(v)    => Ok(Key::Bin(v.clone())),
        Object::Uuid(v)     => Ok(Key::Str(v.hyphenated().to_string())),
        Object::Date(v)     => Ok(Key::Str(temporal::format_date(v))),
        Object::Time(v)     => temporal::format_time_value(v, options).map(Key::Str),
        Object::DateTime(v) => temporal::format_datetime(v, options)
            .map(Key::Str)
            .ok_or_else(|| EncodeError::KeyType("datetime key with a named time zone".to_owned())),
        Object::Tuple(items) => {
            if depth >= RECURSION_LIMIT {
                return Err(EncodeError::RecursionLimit);
            }
            items.iter()
                .map(|item| normalize(item, options, depth + 1))
                .collect::<Result<Vec<_>, _>>()
                .map(Key::Array)
        },
        _ => Err(EncodeError::KeyType(format!("{} is not a supported key type", candidate.type_name()))),
    }
}

/// Sorts `items` ascending by the native key `key` returns. The sort is stable and stops at the first pair of keys
/// that can't be compared.
pub fn sort_by_key<T: Copy>(items: &mut Vec<T>, key: impl Fn(&T) -> &Object) -> Result<(), EncodeError> {
    try_merge_sort(items, |a, b| compare_keys(key(a), key(b)))
}

/// Bottom-up merge sort with a fallible comparison
fn try_merge_sort<T: Copy, E>(items: &mut Vec<T>, mut compare: impl FnMut(&T, &T) -> Result<Ordering, E>) -> Result<(), E> {
    let len = items.len();
    let mut merged = Vec::with_capacity(len);
    let mut width = 1;
    while width < len {
        merged.clear();
        let mut start = 0;
        while start < len {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            let (mut i, mut j) = (start, mid);
            while i < mid && j < end {
                if compare(&items[j], &items[i])? == Ordering::Less {
                    merged.push(items[j]);
                    j += 1;
                } else {
                    merged.push(items[i]);
                    i += 1;
                }
            }
            merged.extend_from_slice(&items[i..mid]);
            merged.extend_from_slice(&items[j..end]);
            start = end;
        }
        std::mem::swap(items, &mut merged);
        width *= 2;
    }
    Ok(())
}

/// What a key looks like for the purpose of ordering
enum Rank<'a> {
    Text(Cow<'a, str>),
    Int(i128),
    Float(f64),
    Bytes(&'a [u8]),
    Date(NaiveDate),
    /// Seconds and nanoseconds since midnight, shifted to UTC if the time has an offset
    Time((i64, u32), bool),
    NaiveDateTime(NaiveDateTime),
    /// In UTC
    AwareDateTime(NaiveDateTime),
    Uuid(Uuid),
    Tuple(&'a [Object]),
}

fn rank(key: &Object) -> Option<Rank<'_>> {
    Some(match key {
        Object::Str(v)      => Rank::Text(Cow::Borrowed(v)),
        Object::WideStr(v)  => Rank::Text(Cow::Owned(String::from_utf16_lossy(v))),
        Object::Bool(v)     => Rank::Int(*v as i128),
        Object::Int(v)      => Rank::Int(*v),
        Object::Float(v)    => Rank::Float(*v),
        Object::Bytes(v)    => Rank::Bytes(v),
        Object::Date(v)     => Rank::Date(*v),
        Object::Time(v)     => rank_time(v)?,
        Object::DateTime(v) => match &v.tz {
            None => Rank::NaiveDateTime(v.datetime),
            Some(tz) => Rank::AwareDateTime(v.datetime - tz.fixed()?),
        },
        Object::Uuid(v)     => Rank::Uuid(*v),
        Object::Tuple(v)    => Rank::Tuple(v),
        Object::Sub(v)      => rank(v.base())?,
        Object::Enum(v)     => rank(v.value())?,
        _ => return None,
    })
}

fn rank_time(time: &Time) -> Option<Rank<'static>> {
    let seconds = time.time.num_seconds_from_midnight() as i64;
    let nanos = time.time.nanosecond();
    match &time.tz {
        None => Some(Rank::Time((seconds, nanos), false)),
        Some(TzInfo::Fixed(offset)) => Some(Rank::Time((seconds - offset.local_minus_utc() as i64, nanos), true)),
        Some(TzInfo::Named(_)) => None,
    }
}

/// Orders two native keys, failing if their kinds can't be compared.
pub fn compare_keys(a: &Object, b: &Object) -> Result<Ordering, EncodeError> {
    let incomparable = || EncodeError::KeyType(format!("cannot order keys of type {} and {}", a.type_name(), b.type_name()));
    let (ra, rb) = match (rank(a), rank(b)) {
        (Some(ra), Some(rb)) => (ra, rb),
        _ => return Err(incomparable()),
    };
    match (ra, rb) {
        (Rank::Text(x), Rank::Text(y))                   => Ok(x.cmp(&y)),
        (Rank::Int(x), Rank::Int(y))                     => Ok(x.cmp(&y)),
        (Rank::Float(x), Rank::Float(y))                 => Ok(x.partial_cmp(&y).unwrap_or(Ordering::Equal)),
        (Rank::Int(x), Rank::Float(y))                   => Ok(compare_int_float(x, y)),
        (Rank::Float(x), Rank::Int(y))                   => Ok(compare_int_float(y, x).reverse()),
        (Rank::Bytes(x), Rank::Bytes(y))                 => Ok(x.cmp(y)),
        (Rank::Date(x), Rank::Date(y))                   => Ok(x.cmp(&y)),
        (Rank::Time(x, xa), Rank::Time(y, ya)) if xa == ya => Ok(x.cmp(&y)),
        (Rank::NaiveDateTime(x), Rank::NaiveDateTime(y)) => Ok(x.cmp(&y)),
        (Rank::AwareDateTime(x), Rank::AwareDateTime(y)) => Ok(x.cmp(&y)),
        (Rank::Uuid(x), Rank::Uuid(y))                   => Ok(x.cmp(&y)),
        (Rank::Tuple(x), Rank::Tuple(y)) => {
            for (i, j) in x.iter().zip(y) {
                match compare_keys(i, j)? {
                    Ordering::Equal => continue,
                    ordering => return Ok(ordering),
                }
            }
            Ok(x.len().cmp(&y.len()))
        },
        _ => Err(incomparable()),
    }
}

/// Exact comparison of an integer with a float. NaN compares equal to everything.
fn compare_int_float(i: i128, f: f64) -> Ordering {
    const LIMIT: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0; // 2^127
    if f.is_nan() {
        Ordering::Equal
    } else if f >= LIMIT {
        Ordering::Less
    } else if f < -LIMIT {
        Ordering::Greater
    } else {
        let whole = f.trunc();
        match i.cmp(&(whole as i128)) {
            Ordering::Equal => 0.0.partial_cmp(&(f - whole)).unwrap_or(Ordering::Equal),
            ordering => ordering,
        }
    }
}
