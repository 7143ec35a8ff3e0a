//! Structured models: objects that are not maps but know their fields. With `SERIALIZE_MODELS` they are flattened
//! into text-keyed maps, field by field, in the order they enumerate them.

use crate::value::Object;
use std::borrow::Cow;
use std::fmt;

pub trait Model: fmt::Debug {

    fn type_name(&self) -> &str;

    /// The fields in declaration order
    fn fields(&self) -> Vec<(Cow<'_, str>, Object)>;

}

/// A generic model, a named list of fields. This is what the serde bindings turn structs into.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    name: String,
    fields: Vec<(String, Object)>,
}

impl Record {

    pub fn new(name: impl Into<String>) -> Self {
        Record { name: name.into(), fields: Vec::new() }
    }

    pub fn with_capacity(name: impl Into<String>, capacity: usize) -> Self {
        Record { name: name.into(), fields: Vec::with_capacity(capacity) }
    }

    pub fn push(&mut self, name: impl Into<String>, value: Object) {
        self.fields.push((name.into(), value));
    }

    pub fn field(&self, name: &str) -> Option<&Object> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

}

impl Model for Record {

    fn type_name(&self) -> &str {
        &self.name
    }

    fn fields(&self) -> Vec<(Cow<'_, str>, Object)> {
        self.fields.iter().map(|(k, v)| (Cow::Borrowed(k.as_str()), v.clone())).collect()
    }

}
