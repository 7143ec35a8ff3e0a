//! The native value model. An `Object` is what the encoder consumes and what the decoder produces.
//! Lists and dicts are shared and mutable, just like the host containers they model: cloning an `Object::List`
//! clones a handle, not the elements, so a list can end up containing itself. The encoder detects such cycles
//! through the identity of the shared allocation.
//!
//! Only the encoder guards against cycles. `PartialEq`, `Debug` and `Display` walk the graph naively and overflow the
//! stack on a list or dict that contains itself.

use crate::ext::Ext;
use crate::model::Model;
use crate::ndarray::{NdArray, Scalar};
use crate::options::Options;
use crate::temporal;
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use uuid::Uuid;

#[derive(Clone)]
pub enum Object {
    None,
    Bool(bool),
    /// Wider than the wire so that out of range integers can be represented and rejected
    Int(i128),
    Float(f64),
    Str(String),
    /// Text given as UTF-16 code units, possibly containing lone surrogates
    WideStr(Vec<u16>),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(Time),
    DateTime(DateTime),
    Uuid(Uuid),
    List(List),
    Dict(Dict),
    Set(Set),
    /// Encodes as the value of the member
    Enum(EnumMember),
    /// Immutable sequence. Only legal as a map key.
    Tuple(Vec<Object>),
    NdArray(NdArray),
    Scalar(Scalar),
    Model(Rc<dyn Model>),
    Ext(Ext),
    Sub(Subclass),
    Opaque(Opaque),
}

impl Object {

    const PROTECTED_CHARS: &'static [char] = &['\\', '"', '\n'];

    /// The name of the kind of this object, or the type name for models, specializations and opaque objects.
    pub fn type_name(&self) -> &str {
        match self {
            Object::None        => "NoneType",
            Object::Bool(_)     => "bool",
            Object::Int(_)      => "int",
            Object::Float(_)    => "float",
            Object::Str(_)      => "str",
            Object::WideStr(_)  => "str",
            Object::Bytes(_)    => "bytes",
            Object::Date(_)     => "date",
            Object::Time(_)     => "time",
            Object::DateTime(_) => "datetime",
            Object::Uuid(_)     => "uuid",
            Object::List(_)     => "list",
            Object::Dict(_)     => "dict",
            Object::Set(s) if s.is_frozen() => "frozenset",
            Object::Set(_)      => "set",
            Object::Enum(e)     => e.type_name(),
            Object::Tuple(_)    => "tuple",
            Object::NdArray(_)  => "ndarray",
            Object::Scalar(s)   => s.dtype().name(),
            Object::Model(m)    => m.type_name(),
            Object::Ext(_)      => "Ext",
            Object::Sub(s)      => s.type_name(),
            Object::Opaque(o)   => o.type_name(),
        }
    }

    pub fn str(value: impl Into<String>) -> Self {
        Object::Str(value.into())
    }

    pub fn list(items: impl IntoIterator<Item = Object>) -> Self {
        Object::List(List::from_vec(items.into_iter().collect()))
    }

    pub fn dict(pairs: impl IntoIterator<Item = (Object, Object)>) -> Self {
        Object::Dict(Dict::from_pairs(pairs))
    }

    pub fn tuple(items: impl IntoIterator<Item = Object>) -> Self {
        Object::Tuple(items.into_iter().collect())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Object::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i128> {
        match self {
            Object::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Equality used for dict keys: floats compare by their bits so that NaN keys can be replaced.
    pub(crate) fn key_eq(&self, other: &Object) -> bool {
        match (self, other) {
            (Object::Float(a), Object::Float(b)) => a.to_bits() == b.to_bits(),
            (Object::Tuple(a), Object::Tuple(b)) => a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.key_eq(b)),
            _ => self == other,
        }
    }

    fn escape(v: &str) -> String {
        if v.contains(Self::PROTECTED_CHARS) {
            v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
        } else {
            v.to_owned()
        }
    }

    fn indent<I: Iterator<Item = String>>(lines: I) -> String {
        lines.flat_map(|entry| entry.lines().map(|line| format!("  {}", line)).collect::<Vec<String>>())
            .collect::<Vec<String>>()
            .join("\n")
    }

}

impl PartialEq for Object {
    fn eq(&self, other: &Object) -> bool {
        match (self, other) {
            (Object::None, Object::None)               => true,
            (Object::Bool(a), Object::Bool(b))         => a == b,
            (Object::Int(a), Object::Int(b))           => a == b,
            (Object::Float(a), Object::Float(b))       => a == b,
            (Object::Str(a), Object::Str(b))           => a == b,
            (Object::WideStr(a), Object::WideStr(b))   => a == b,
            (Object::Bytes(a), Object::Bytes(b))       => a == b,
            (Object::Date(a), Object::Date(b))         => a == b,
            (Object::Time(a), Object::Time(b))         => a == b,
            (Object::DateTime(a), Object::DateTime(b)) => a == b,
            (Object::Uuid(a), Object::Uuid(b))         => a == b,
            (Object::List(a), Object::List(b))         => a == b,
            (Object::Dict(a), Object::Dict(b))         => a == b,
            (Object::Set(a), Object::Set(b))           => a == b,
            (Object::Enum(a), Object::Enum(b))         => a == b,
            (Object::Tuple(a), Object::Tuple(b))       => a == b,
            (Object::NdArray(a), Object::NdArray(b))   => a == b,
            (Object::Scalar(a), Object::Scalar(b))     => a == b,
            (Object::Model(a), Object::Model(b))       => {
                Rc::ptr_eq(a, b) || (a.type_name() == b.type_name() && a.fields() == b.fields())
            },
            (Object::Ext(a), Object::Ext(b))           => a == b,
            (Object::Sub(a), Object::Sub(b))           => a == b,
            (Object::Opaque(a), Object::Opaque(b))     => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::None        => f.write_str("None"),
            Object::Bool(v)     => f.debug_tuple("Bool").field(v).finish(),
            Object::Int(v)      => f.debug_tuple("Int").field(v).finish(),
            Object::Float(v)    => f.debug_tuple("Float").field(v).finish(),
            Object::Str(v)      => f.debug_tuple("Str").field(v).finish(),
            Object::WideStr(v)  => f.debug_tuple("WideStr").field(v).finish(),
            Object::Bytes(v)    => f.debug_tuple("Bytes").field(v).finish(),
            Object::Date(v)     => f.debug_tuple("Date").field(v).finish(),
            Object::Time(v)     => f.debug_tuple("Time").field(v).finish(),
            Object::DateTime(v) => f.debug_tuple("DateTime").field(v).finish(),
            Object::Uuid(v)     => f.debug_tuple("Uuid").field(v).finish(),
            Object::List(v)     => f.debug_tuple("List").field(v).finish(),
            Object::Dict(v)     => f.debug_tuple("Dict").field(v).finish(),
            Object::Set(v)      => f.debug_tuple("Set").field(v).finish(),
            Object::Enum(v)     => f.debug_tuple("Enum").field(v).finish(),
            Object::Tuple(v)    => f.debug_tuple("Tuple").field(v).finish(),
            Object::NdArray(v)  => f.debug_tuple("NdArray").field(v).finish(),
            Object::Scalar(v)   => f.debug_tuple("Scalar").field(v).finish(),
            Object::Model(v)    => f.debug_tuple("Model").field(v).finish(),
            Object::Ext(v)      => f.debug_tuple("Ext").field(v).finish(),
            Object::Sub(v)      => f.debug_tuple("Sub").field(v).finish(),
            Object::Opaque(v)   => f.debug_tuple("Opaque").field(v).finish(),
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::None         => f.write_str("null"),
            Object::Bool(true)   => f.write_str("true"),
            Object::Bool(false)  => f.write_str("false"),
            Object::Int(v)       => write!(f, "{}", v),
            Object::Float(v)     => write!(f, "{:?}", v),
            Object::Str(v)       => write!(f, "\"{}\"", Self::escape(v)),
            Object::WideStr(v)   => write!(f, "\"{}\"", Self::escape(&String::from_utf16_lossy(v))),
            Object::Bytes(v)     => write!(f, "'{}'", base64::encode(v)),
            Object::Date(v)      => write!(f, "date({})", temporal::format_date(v)),
            Object::Time(v)      => write!(f, "time({})", v),
            Object::DateTime(v)  => write!(f, "datetime({})", v),
            Object::Uuid(v)      => write!(f, "uuid({})", v.hyphenated()),
            Object::List(v)      => write!(f, "[\n{}\n]", Self::indent(v.items().iter().map(|e| format!("{},", e)))),
            Object::Dict(v)      => write!(f, "{{\n{}\n}}", Self::indent(v.entries().iter().map(|(k, e)| format!("{}: {},", k, e)))),
            Object::Set(v)       => write!(f, "{}({})", self.type_name(), v.items().iter().map(|e| e.to_string()).collect::<Vec<_>>().join(", ")),
            Object::Enum(v)      => write!(f, "{}.{}", v.type_name(), v.name()),
            Object::Tuple(v)     => write!(f, "({})", v.iter().map(|e| e.to_string()).collect::<Vec<_>>().join(", ")),
            Object::NdArray(v)   => write!(f, "ndarray({}, {:?})", v.dtype().name(), v.shape()),
            Object::Scalar(v)    => write!(f, "{}({})", v.dtype().name(), v),
            Object::Model(v)     => write!(f, "{}(\n{}\n)", v.type_name(), Self::indent(v.fields().iter()
                .map(|(k, e)| format!("{}: {},", k, e)))),
            Object::Ext(v)       => write!(f, "ext({}, '{}')", v.tag(), base64::encode(v.data())),
            Object::Sub(v)       => write!(f, "{}({})", v.type_name(), v.base()),
            Object::Opaque(v)    => write!(f, "<{}>", v.type_name()),
        }
    }
}

macro_rules! from_int {
    ($($t:ty)*) => {
        $(impl From<$t> for Object {
            fn from(v: $t) -> Self {
                Object::Int(v as i128)
            }
        })*
    };
}

from_int!(i8 i16 i32 i64 i128 u8 u16 u32 u64 isize usize);

impl From<bool> for Object {
    fn from(v: bool) -> Self {
        Object::Bool(v)
    }
}

impl From<f64> for Object {
    fn from(v: f64) -> Self {
        Object::Float(v)
    }
}

impl From<&str> for Object {
    fn from(v: &str) -> Self {
        Object::Str(v.to_owned())
    }
}

impl From<String> for Object {
    fn from(v: String) -> Self {
        Object::Str(v)
    }
}

impl From<Vec<u8>> for Object {
    fn from(v: Vec<u8>) -> Self {
        Object::Bytes(v)
    }
}

impl From<NaiveDate> for Object {
    fn from(v: NaiveDate) -> Self {
        Object::Date(v)
    }
}

impl From<Uuid> for Object {
    fn from(v: Uuid) -> Self {
        Object::Uuid(v)
    }
}

impl From<List> for Object {
    fn from(v: List) -> Self {
        Object::List(v)
    }
}

impl From<Dict> for Object {
    fn from(v: Dict) -> Self {
        Object::Dict(v)
    }
}

impl From<Set> for Object {
    fn from(v: Set) -> Self {
        Object::Set(v)
    }
}

impl From<EnumMember> for Object {
    fn from(v: EnumMember) -> Self {
        Object::Enum(v)
    }
}

impl From<Ext> for Object {
    fn from(v: Ext) -> Self {
        Object::Ext(v)
    }
}

impl From<NdArray> for Object {
    fn from(v: NdArray) -> Self {
        Object::NdArray(v)
    }
}

impl From<Scalar> for Object {
    fn from(v: Scalar) -> Self {
        Object::Scalar(v)
    }
}

impl<T: Into<Object>> From<Option<T>> for Object {
    fn from(v: Option<T>) -> Self {
        v.map_or(Object::None, Into::into)
    }
}

/// A shared, mutable sequence. Reading takes a snapshot of the elements; a mutation while a snapshot is alive copies
/// the elements first, so the encoder never sees a list change underneath it.
#[derive(Clone, Default)]
pub struct List(Rc<RefCell<Rc<Vec<Object>>>>);

impl List {

    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(items: Vec<Object>) -> Self {
        List(Rc::new(RefCell::new(Rc::new(items))))
    }

    pub fn push(&self, item: Object) {
        Rc::make_mut(&mut *self.0.borrow_mut()).push(item);
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn items(&self) -> Rc<Vec<Object>> {
        self.0.borrow().clone()
    }

    /// Address of the shared allocation. Two handles to the same list have the same identity.
    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &List) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

}

impl PartialEq for List {
    fn eq(&self, other: &List) -> bool {
        self.ptr_eq(other) || *self.items() == *other.items()
    }
}

impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items().iter()).finish()
    }
}

/// A shared, mutable, insertion ordered mapping. Keys are unique: inserting a key that is already present
/// replaces its value and keeps its position. Snapshots work like the ones of `List`.
#[derive(Clone, Default)]
pub struct Dict(Rc<RefCell<Rc<Vec<(Object, Object)>>>>);

impl Dict {

    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (Object, Object)>) -> Self {
        let dict = Dict::new();
        for (k, v) in pairs {
            dict.insert(k, v);
        }
        dict
    }

    /// The caller guarantees that keys are unique.
    pub(crate) fn from_unique(entries: Vec<(Object, Object)>) -> Self {
        Dict(Rc::new(RefCell::new(Rc::new(entries))))
    }

    /// Returns the previous value if the key was present.
    pub fn insert(&self, key: Object, value: Object) -> Option<Object> {
        let mut guard = self.0.borrow_mut();
        let entries = Rc::make_mut(&mut *guard);
        match entries.iter_mut().find(|(k, _)| k.key_eq(&key)) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                entries.push((key, value));
                None
            },
        }
    }

    pub fn get(&self, key: &Object) -> Option<Object> {
        self.entries().iter().find(|(k, _)| k.key_eq(key)).map(|(_, v)| v.clone())
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn entries(&self) -> Rc<Vec<(Object, Object)>> {
        self.0.borrow().clone()
    }

    /// Address of the shared allocation. Two handles to the same dict have the same identity.
    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &Dict) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

}

impl PartialEq for Dict {
    fn eq(&self, other: &Dict) -> bool {
        self.ptr_eq(other) || *self.entries() == *other.entries()
    }
}

impl fmt::Debug for Dict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries().iter().map(|(k, v)| (k, v))).finish()
    }
}

/// An unordered collection of unique elements. A frozen set is immutable on the host and a plain set is not, but
/// the engine never mutates either, so both share one representation and keep their insertion order.
#[derive(Clone)]
pub struct Set {
    items: Rc<Vec<Object>>,
    frozen: bool,
}

impl Set {

    pub fn new(items: impl IntoIterator<Item = Object>) -> Self {
        Set { items: Rc::new(Self::unique(items)), frozen: false }
    }

    pub fn frozen(items: impl IntoIterator<Item = Object>) -> Self {
        Set { items: Rc::new(Self::unique(items)), frozen: true }
    }

    fn unique(items: impl IntoIterator<Item = Object>) -> Vec<Object> {
        let mut unique: Vec<Object> = Vec::new();
        for item in items {
            if !unique.iter().any(|u| u.key_eq(&item)) {
                unique.push(item);
            }
        }
        unique
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn items(&self) -> &[Object] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item: &Object) -> bool {
        self.items.iter().any(|i| i.key_eq(item))
    }

    /// Address of the shared allocation
    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.items) as *const () as usize
    }

}

/// Order doesn't matter, and a set equals the frozen set with the same elements.
impl PartialEq for Set {
    fn eq(&self, other: &Set) -> bool {
        self.len() == other.len() && self.items.iter().all(|i| other.contains(i))
    }
}

impl fmt::Debug for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.items.iter()).finish()
    }
}

/// A named member of an enumeration type
#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    type_name: String,
    name: String,
    value: Box<Object>,
}

impl EnumMember {

    pub fn new(type_name: impl Into<String>, name: impl Into<String>, value: Object) -> Self {
        EnumMember { type_name: type_name.into(), name: name.into(), value: Box::new(value) }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Object {
        &self.value
    }

}

/// A time zone. Only fixed offsets can be rendered; a named zone has an offset that depends on the date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TzInfo {
    Fixed(FixedOffset),
    Named(String),
}

impl TzInfo {
    pub fn utc() -> Self {
        TzInfo::Fixed(Utc.fix())
    }

    pub(crate) fn fixed(&self) -> Option<FixedOffset> {
        match self {
            TzInfo::Fixed(offset) => Some(*offset),
            TzInfo::Named(_) => None,
        }
    }
}

/// Wall clock time with an optional time zone
#[derive(Debug, Clone, PartialEq)]
pub struct Time {
    pub time: NaiveTime,
    pub tz: Option<TzInfo>,
}

impl Time {
    pub fn naive(time: NaiveTime) -> Self {
        Time { time, tz: None }
    }

    pub fn with_tz(time: NaiveTime, tz: TzInfo) -> Self {
        Time { time, tz: Some(tz) }
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&temporal::format_time(&self.time, Options::empty()))?;
        match &self.tz {
            Some(TzInfo::Fixed(offset)) => f.write_str(&temporal::format_offset(offset, Options::empty())),
            Some(TzInfo::Named(name)) => write!(f, "[{}]", name),
            None => Ok(()),
        }
    }
}

/// Date and wall clock time with an optional time zone
#[derive(Debug, Clone, PartialEq)]
pub struct DateTime {
    pub datetime: NaiveDateTime,
    pub tz: Option<TzInfo>,
}

impl DateTime {
    pub fn naive(datetime: NaiveDateTime) -> Self {
        DateTime { datetime, tz: None }
    }

    pub fn with_offset(datetime: NaiveDateTime, offset: FixedOffset) -> Self {
        DateTime { datetime, tz: Some(TzInfo::Fixed(offset)) }
    }

    pub fn with_zone(datetime: NaiveDateTime, zone: impl Into<String>) -> Self {
        DateTime { datetime, tz: Some(TzInfo::Named(zone.into())) }
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tz {
            Some(TzInfo::Named(name)) => {
                let naive = DateTime::naive(self.datetime);
                let text = temporal::format_datetime(&naive, Options::empty()).ok_or(fmt::Error)?;
                write!(f, "{}[{}]", text, name)
            },
            _ => f.write_str(&temporal::format_datetime(self, Options::empty()).ok_or(fmt::Error)?),
        }
    }
}

/// A strict specialization of another kind of object, identified by its type name.
#[derive(Debug, Clone, PartialEq)]
pub struct Subclass {
    type_name: String,
    base: Box<Object>,
}

impl Subclass {

    pub fn new(type_name: impl Into<String>, base: Object) -> Self {
        Subclass { type_name: type_name.into(), base: Box::new(base) }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn base(&self) -> &Object {
        &self.base
    }

    /// Specializations of text, integers, lists and dicts encode like their base unless the caller opts out.
    pub fn is_transparent(&self) -> bool {
        matches!(*self.base, Object::Str(_) | Object::WideStr(_) | Object::Int(_) | Object::List(_) | Object::Dict(_))
    }

}

/// Any host object the encoder does not know. Only a fallback can make sense of it.
#[derive(Clone)]
pub struct Opaque {
    type_name: String,
    payload: Rc<dyn Any>,
}

impl Opaque {

    pub fn new<T: Any>(type_name: impl Into<String>, payload: T) -> Self {
        Opaque { type_name: type_name.into(), payload: Rc::new(payload) }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref()
    }

}

impl PartialEq for Opaque {
    fn eq(&self, other: &Opaque) -> bool {
        self.type_name == other.type_name
            && Rc::as_ptr(&self.payload) as *const () == Rc::as_ptr(&other.payload) as *const ()
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Opaque").field("type_name", &self.type_name).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_list() {
        let list = List::new();
        let alias = Object::List(list.clone());
        list.push(Object::from(1));
        match &alias {
            Object::List(l) => {
                assert_eq!(1, l.len());
                assert_eq!(list.identity(), l.identity());
            },
            _ => unreachable!(),
        }
        assert_ne!(list.identity(), List::from_vec(vec![Object::from(1)]).identity());
        assert_eq!(Object::List(list), Object::list([Object::from(1)]));
    }

    #[test]
    fn snapshots() {
        let list = List::from_vec(vec![1.into()]);
        let items = list.items();
        list.push(2.into());
        assert_eq!(1, items.len());
        assert_eq!(2, list.len());
        let dict = Dict::from_pairs([("a".into(), 1.into())]);
        let entries = dict.entries();
        dict.insert("a".into(), 2.into());
        assert_eq!((Object::from("a"), Object::from(1)), entries[0]);
        assert_eq!(Some(Object::from(2)), dict.get(&"a".into()));
    }

    #[test]
    fn sets() {
        let set = Set::new([1.into(), "a".into(), 1.into(), Object::Float(1.0)]);
        assert_eq!(3, set.len());
        assert!(set.contains(&Object::Float(1.0)));
        assert_eq!(Object::Set(set), Object::Set(Set::frozen([Object::Float(1.0), "a".into(), 1.into()])));
        assert_ne!(Object::Set(Set::new([1.into()])), Object::Set(Set::new([1.into(), 2.into()])));
        assert_eq!("frozenset", Object::Set(Set::frozen([])).type_name());
        assert_eq!("set(1, \"a\")", format!("{}", Object::Set(Set::new([1.into(), "a".into()]))));
    }

    #[test]
    fn enums() {
        let member = Object::Enum(EnumMember::new("Color", "RED", 1.into()));
        assert_eq!("Color", member.type_name());
        assert_eq!("Color.RED", format!("{}", member));
    }

    #[test]
    fn self_reference_compares_by_identity() {
        let list = List::new();
        list.push(Object::List(list.clone()));
        assert_eq!(Object::List(list.clone()), Object::List(list.clone()));
        let dict = Dict::new();
        dict.insert("self".into(), Object::Dict(dict.clone()));
        assert!(dict == dict.clone());
        assert_eq!(1, list.len());
    }

    #[test]
    fn dict_insert_replaces() {
        let dict = Dict::new();
        assert_eq!(None, dict.insert("a".into(), 1.into()));
        assert_eq!(None, dict.insert("b".into(), 2.into()));
        assert_eq!(Some(Object::from(1)), dict.insert("a".into(), 3.into()));
        assert_eq!(2, dict.len());
        assert_eq!(Object::from("a"), dict.entries()[0].0);
        assert_eq!(Some(Object::from(3)), dict.get(&"a".into()));
    }

    #[test]
    fn nan_keys_are_unique() {
        let dict = Dict::new();
        dict.insert(Object::Float(f64::NAN), 1.into());
        dict.insert(Object::Float(f64::NAN), 2.into());
        assert_eq!(1, dict.len());
        assert_ne!(Object::Float(f64::NAN), Object::Float(f64::NAN));
    }

    #[test]
    fn opaque_identity() {
        let a = Opaque::new("Custom", 5u32);
        assert_eq!(a, a.clone());
        assert_ne!(a, Opaque::new("Custom", 5u32));
        assert_eq!(Some(&5u32), a.downcast_ref::<u32>());
    }

    #[test]
    fn transparency() {
        assert!(Subclass::new("SubStr", "x".into()).is_transparent());
        assert!(Subclass::new("SubDict", Object::dict([])).is_transparent());
        assert!(!Subclass::new("SubFloat", 1.5.into()).is_transparent());
        assert!(!Subclass::new("Point", Object::tuple([1.into(), 2.into()])).is_transparent());
    }

    #[test]
    fn display() {
        let value = Object::dict([
            ("name".into(), "Jessica".into()),
            ("data".into(), Object::Bytes(vec![1, 2, 3])),
            ("tags".into(), Object::list(["a".into()])),
        ]);
        assert_eq!("{\n  \"name\": \"Jessica\",\n  \"data\": 'AQID',\n  \"tags\": [\n    \"a\",\n  ],\n}", format!("{}", value));
        let key = Object::tuple([1.into(), "two\n".into()]);
        assert_eq!("(1, \"two\\n\")", format!("{}", key));
    }

}
