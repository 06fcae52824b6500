use cascade::{ElementType, StyleContext, StyleSheet};

use crate::element::Element;
use crate::error::{ElementError, Result};

/// Owns the registries and the stylesheet that every element of a tree
/// resolves against.
///
/// # Example
///
/// ```
/// use cascade::{AttributeSpec, StyleCondition, StyleContext};
/// use elements::Document;
///
/// let mut cx = StyleContext::new();
/// let opacity = cx.register_attribute(AttributeSpec::new("paint", "opacity", 1.0_f64)).unwrap();
/// cx.register_type("Button", None).unwrap();
///
/// let document = Document::new(cx);
/// let button = document.create_named("Button").unwrap();
/// document.sheet().set(&opacity, StyleCondition::new(), 0.75).unwrap();
///
/// assert_eq!(button.style_view().value(&opacity).get(), 0.75);
/// ```
pub struct Document {
    context: StyleContext,
    sheet: StyleSheet,
}

impl Document {
    pub fn new(context: StyleContext) -> Self {
        Self::with_sheet(context, StyleSheet::new())
    }

    pub fn with_sheet(context: StyleContext, sheet: StyleSheet) -> Self {
        Self { context, sheet }
    }

    pub fn context(&self) -> &StyleContext {
        &self.context
    }

    pub fn sheet(&self) -> &StyleSheet {
        &self.sheet
    }

    pub fn create(&self, element_type: &ElementType) -> Element {
        Element::new(element_type.clone(), self.sheet.clone())
    }

    /// Creates an element of the registered type `name`.
    pub fn create_named(&self, name: &str) -> Result<Element> {
        let element_type = self
            .context
            .types
            .get(name)
            .ok_or_else(|| ElementError::UnknownType(name.to_string()))?;
        Ok(self.create(&element_type))
    }
}
