use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::error::{CascadeError, Result};

use super::state::Name;

struct TypeInfo {
    name: Name,
    parent: Option<ElementType>,
    /// Names from the root type down to this one; `lineage[depth - 1]` is self.
    lineage: SmallVec<[Name; 4]>,
}

/// A registered element type with its specificity rank.
///
/// The rank is the depth in the type hierarchy (a root type has depth 1) and
/// is computed once at registration, so assignability is a single index
/// lookup instead of a walk up the hierarchy.
#[derive(Clone)]
pub struct ElementType(Rc<TypeInfo>);

impl ElementType {
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn parent(&self) -> Option<&ElementType> {
        self.0.parent.as_ref()
    }

    pub fn depth(&self) -> usize {
        self.0.lineage.len()
    }

    /// True when an element of this type may be used where `other` is required.
    pub fn is_assignable_to(&self, other: &ElementType) -> bool {
        let depth = other.depth();
        depth <= self.depth() && self.0.lineage[depth - 1] == other.0.name
    }
}

impl PartialEq for ElementType {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || self.0.lineage == other.0.lineage
    }
}

impl Eq for ElementType {}

impl fmt::Debug for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ElementType").field(&self.name()).finish()
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Registry of element types and their hierarchy.
#[derive(Debug, Default)]
pub struct ElementTypes {
    by_name: HashMap<Name, ElementType>,
}

impl ElementTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` as a subtype of `parent` (or as a root type).
    pub fn register(&mut self, name: &str, parent: Option<&str>) -> Result<ElementType> {
        if self.by_name.contains_key(name) {
            return Err(CascadeError::DuplicateElementType(name.to_string()));
        }
        let parent = match parent {
            Some(parent) => Some(self.get(parent).ok_or_else(|| {
                CascadeError::InvalidArgument(format!(
                    "parent type {parent} of {name} is not registered"
                ))
            })?),
            None => None,
        };

        let name = Name::from(name);
        let mut lineage = parent
            .as_ref()
            .map(|p| p.0.lineage.clone())
            .unwrap_or_default();
        lineage.push(Rc::clone(&name));

        let ty = ElementType(Rc::new(TypeInfo {
            name: Rc::clone(&name),
            parent,
            lineage,
        }));
        self.by_name.insert(name, ty.clone());
        Ok(ty)
    }

    pub fn get(&self, name: &str) -> Option<ElementType> {
        self.by_name.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
