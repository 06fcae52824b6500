use crate::attribute::{AttributeRegistry, AttributeSpec, StyleAttribute};
use crate::condition::{ElementType, ElementTypes};
use crate::error::Result;
use crate::types::AttributeValue;

/// The registries a document is built against.
///
/// Populated at startup and then shared read-only; nothing in this crate
/// keeps global state.
#[derive(Debug, Default)]
pub struct StyleContext {
    pub attributes: AttributeRegistry,
    pub types: ElementTypes,
}

impl StyleContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_attribute<T: AttributeValue>(&mut self, spec: AttributeSpec<T>) -> Result<StyleAttribute<T>> {
        self.attributes.register(spec)
    }

    pub fn register_type(&mut self, name: &str, parent: Option<&str>) -> Result<ElementType> {
        self.types.register(name, parent)
    }
}
