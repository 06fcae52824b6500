use std::rc::Rc;

use crate::reactive::Tracker;

use super::element_type::ElementType;
use super::state::{GroupSet, Name, StateSet};

/// The slot an element fills inside the template of its owning element.
#[derive(Clone)]
pub struct TemplateRole {
    pub slot: Name,
    pub owner: Rc<dyn ElementContext>,
}

/// What conditions can observe about an element.
///
/// Every read goes through a [`Tracker`], so a condition evaluated inside a
/// [`Computed`](crate::reactive::Computed) is re-run when any of the inputs
/// it looked at change.
pub trait ElementContext {
    fn element_type(&self) -> ElementType;

    fn states(&self, cx: &mut Tracker) -> StateSet;

    fn groups(&self, cx: &mut Tracker) -> GroupSet;

    fn parent(&self, cx: &mut Tracker) -> Option<Rc<dyn ElementContext>>;

    fn template_role(&self, cx: &mut Tracker) -> Option<TemplateRole>;
}

/// Identity comparison for element contexts.
pub fn same_element(a: &dyn ElementContext, b: &dyn ElementContext) -> bool {
    std::ptr::addr_eq(a, b)
}

/// True when `ancestor` is on the parent chain of `element`.
pub fn is_ancestor(ancestor: &dyn ElementContext, element: &dyn ElementContext, cx: &mut Tracker) -> bool {
    let mut current = element.parent(cx);
    while let Some(node) = current {
        if same_element(&*node, ancestor) {
            return true;
        }
        current = node.parent(cx);
    }
    false
}
