//! Option flags controlling a single `encode` or `decode` call. An `Options` value is a plain bitmask: it is
//! resolved once when a call starts and handed down by value, so nothing can change it while the call runs.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Options(u32);

impl Options {

    /// Allow map keys other than text, see `normalize_key`. On decoding, accept non-text keys.
    pub const NON_STR_KEYS: Options = Options(1 << 0);
    /// Emit map entries ordered by key. All keys of a map must be comparable with each other.
    pub const SORT_KEYS: Options = Options(1 << 1);
    /// Format datetimes without a time zone as UTC.
    pub const NAIVE_UTC: Options = Options(1 << 2);
    /// Render a UTC offset as `Z` instead of `+00:00`.
    pub const UTC_Z: Options = Options(1 << 3);
    /// Drop the fractional seconds of times and datetimes.
    pub const OMIT_MICROSECONDS: Options = Options(1 << 4);
    /// Hand specializations of text, integers, lists and dicts to the fallback.
    pub const PASSTHROUGH_SUBCLASS: Options = Options(1 << 5);
    /// Hand dates, times and datetimes in value position to the fallback.
    pub const PASSTHROUGH_DATETIME: Options = Options(1 << 6);
    /// Encode `NdArray` and `Scalar` values.
    pub const SERIALIZE_NDARRAY: Options = Options(1 << 7);
    /// Flatten structured models into text-keyed maps.
    pub const SERIALIZE_MODELS: Options = Options(1 << 8);
    /// Hand integers outside of the 64-bit range to the fallback instead of failing.
    pub const PASSTHROUGH_BIG_INT: Options = Options(1 << 9);

    const NAMES: [(Options, &'static str); 10] = [
        (Self::NON_STR_KEYS, "NON_STR_KEYS"),
        (Self::SORT_KEYS, "SORT_KEYS"),
        (Self::NAIVE_UTC, "NAIVE_UTC"),
        (Self::UTC_Z, "UTC_Z"),
        (Self::OMIT_MICROSECONDS, "OMIT_MICROSECONDS"),
        (Self::PASSTHROUGH_SUBCLASS, "PASSTHROUGH_SUBCLASS"),
        (Self::PASSTHROUGH_DATETIME, "PASSTHROUGH_DATETIME"),
        (Self::SERIALIZE_NDARRAY, "SERIALIZE_NDARRAY"),
        (Self::SERIALIZE_MODELS, "SERIALIZE_MODELS"),
        (Self::PASSTHROUGH_BIG_INT, "PASSTHROUGH_BIG_INT"),
    ];

    pub const fn empty() -> Self {
        Options(0)
    }

    pub const fn all() -> Self {
        Options((1 << 10) - 1)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Returns `None` if `bits` contains a flag this version doesn't know.
    pub const fn from_bits(bits: u32) -> Option<Self> {
        if bits & !Self::all().0 == 0 {
            Some(Options(bits))
        } else {
            None
        }
    }

    #[inline]
    pub const fn contains(&self, other: Options) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Options) -> Self {
        Options(self.0 | other.0)
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

}

impl BitOr for Options {
    type Output = Options;

    fn bitor(self, rhs: Options) -> Options {
        self.union(rhs)
    }
}

impl BitOrAssign for Options {
    fn bitor_assign(&mut self, rhs: Options) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("Options(empty)");
        }
        let names = Self::NAMES.iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect::<Vec<_>>();
        write!(f, "Options({})", names.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::Options;

    #[test]
    fn flags_are_independent() {
        let opts = Options::NON_STR_KEYS | Options::SORT_KEYS;
        assert!(opts.contains(Options::NON_STR_KEYS));
        assert!(opts.contains(Options::SORT_KEYS));
        assert!(!opts.contains(Options::UTC_Z));
        assert!(opts.contains(Options::empty()));
        for (flag, _) in Options::NAMES.iter() {
            assert_eq!(flag.bits().count_ones(), 1);
            assert!(Options::all().contains(*flag));
        }
    }

    #[test]
    fn unknown_bits() {
        assert_eq!(Some(Options::UTC_Z), Options::from_bits(Options::UTC_Z.bits()));
        assert_eq!(None, Options::from_bits(1 << 31));
    }

    #[test]
    fn debug_lists_flags() {
        let opts = Options::NAIVE_UTC | Options::UTC_Z;
        assert_eq!("Options(NAIVE_UTC | UTC_Z)", format!("{:?}", opts));
        assert_eq!("Options(empty)", format!("{:?}", Options::default()));
    }

}
