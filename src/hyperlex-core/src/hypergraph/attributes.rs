//! Open attribute maps on nodes and hyperedges.

use std::collections::HashMap;

use crate::types::Value;

/// Attribute name to tagged value.
pub type AttributeMap = HashMap<String, Value>;

/// Shared accessors for elements carrying an [`AttributeMap`].
///
/// Coarsening writes cluster bookkeeping through [`HasAttributes::set_attribute`],
/// and conflict analysis groups nodes by [`HasAttributes::text_attribute`].
pub trait HasAttributes {
    fn attributes(&self) -> &AttributeMap;

    fn attributes_mut(&mut self) -> &mut AttributeMap;

    fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes().get(name)
    }

    /// The attribute as a string, `None` when absent or not a string.
    fn text_attribute(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(Value::as_str)
    }

    /// Insert or replace; returns the previous value.
    fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.attributes_mut().insert(name.into(), value.into())
    }

    fn remove_attribute(&mut self, name: &str) -> Option<Value> {
        self.attributes_mut().remove(name)
    }
}
