//! Elements: typed tree nodes carrying the inputs conditions match against.

use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use cascade::reactive::{Signal, Tracker};
use cascade::{
    ElementContext, ElementType, GroupSet, Name, StateSet, StatefulStyle, StyleSheet, TemplateRole,
};

use crate::error::{ElementError, Result};
use crate::states::PseudoStates;
use crate::view::ElementStyleView;

/// Weak link compared by identity, so a signal holding it fires only when
/// the target actually changes.
#[derive(Clone, Default)]
struct Link(Option<Weak<ElementNode>>);

impl Link {
    fn to(node: &Rc<ElementNode>) -> Self {
        Link(Some(Rc::downgrade(node)))
    }

    fn upgrade(&self) -> Option<Rc<ElementNode>> {
        self.0.as_ref().and_then(Weak::upgrade)
    }
}

impl PartialEq for Link {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (None, None) => true,
            (Some(a), Some(b)) => Weak::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[derive(Clone, Default, PartialEq)]
struct RoleLink(Option<(Name, Link)>);

pub(crate) struct ElementNode {
    this: Weak<ElementNode>,
    element_type: ElementType,
    sheet: StyleSheet,
    states: Signal<StateSet>,
    groups: Signal<GroupSet>,
    parent: Signal<Link>,
    role: Signal<RoleLink>,
    children: RefCell<Vec<Element>>,
    style: StatefulStyle,
    view: OnceCell<ElementStyleView>,
}

impl ElementNode {
    pub(crate) fn sheet(&self) -> &StyleSheet {
        &self.sheet
    }

    pub(crate) fn style(&self) -> &StatefulStyle {
        &self.style
    }

    pub(crate) fn states_signal(&self) -> &Signal<StateSet> {
        &self.states
    }

    /// Reads the parent link through `cx`.
    pub(crate) fn parent_node(&self, cx: &mut Tracker) -> Option<Rc<ElementNode>> {
        cx.track_with(&self.parent, Link::upgrade)
    }

    pub(crate) fn view(&self) -> ElementStyleView {
        self.view
            .get_or_init(|| ElementStyleView::new(self.this.clone()))
            .clone()
    }
}

impl ElementContext for ElementNode {
    fn element_type(&self) -> ElementType {
        self.element_type.clone()
    }

    fn states(&self, cx: &mut Tracker) -> StateSet {
        cx.track(&self.states)
    }

    fn groups(&self, cx: &mut Tracker) -> GroupSet {
        cx.track(&self.groups)
    }

    fn parent(&self, cx: &mut Tracker) -> Option<Rc<dyn ElementContext>> {
        self.parent_node(cx)
            .map(|parent| parent as Rc<dyn ElementContext>)
    }

    fn template_role(&self, cx: &mut Tracker) -> Option<TemplateRole> {
        cx.track_with(&self.role, |role| {
            let (slot, owner) = role.0.as_ref()?;
            Some(TemplateRole {
                slot: Rc::clone(slot),
                owner: owner.upgrade()? as Rc<dyn ElementContext>,
            })
        })
    }
}

/// Handle to an element in a document tree.
///
/// Clones refer to the same element. A parent owns its children; the links
/// from a child to its parent and to its template owner are weak.
#[derive(Clone)]
pub struct Element(Rc<ElementNode>);

impl Element {
    pub(crate) fn new(element_type: ElementType, sheet: StyleSheet) -> Self {
        Element(Rc::new_cyclic(|this| ElementNode {
            this: this.clone(),
            element_type,
            sheet,
            states: Signal::new(StateSet::new()),
            groups: Signal::new(GroupSet::new()),
            parent: Signal::new(Link::default()),
            role: Signal::new(RoleLink::default()),
            children: RefCell::new(Vec::new()),
            style: StatefulStyle::new(),
            view: OnceCell::new(),
        }))
    }

    pub fn element_type(&self) -> &ElementType {
        &self.0.element_type
    }

    /// The element as seen by conditions.
    pub fn context(&self) -> Rc<dyn ElementContext> {
        Rc::clone(&self.0) as Rc<dyn ElementContext>
    }

    /// Local style rules; they take precedence over the stylesheet.
    pub fn style(&self) -> &StatefulStyle {
        &self.0.style
    }

    /// Resolved style values of this element.
    pub fn style_view(&self) -> ElementStyleView {
        self.0.view()
    }

    pub fn ptr_eq(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    // ------------------------------------------------------------------
    // States and groups
    // ------------------------------------------------------------------

    pub fn states(&self) -> StateSet {
        self.0.states.get()
    }

    pub fn has_state(&self, name: &str) -> bool {
        self.0.states.with(|states| states.contains(name))
    }

    /// Returns true if the state was not already active.
    pub fn add_state(&self, name: &str) -> bool {
        let mut added = false;
        self.0.states.update(|states| added = states.insert(name));
        added
    }

    pub fn remove_state(&self, name: &str) -> bool {
        let mut removed = false;
        self.0.states.update(|states| removed = states.remove(name));
        removed
    }

    /// Replaces the whole state set in one change.
    pub fn set_states<'a>(&self, names: impl IntoIterator<Item = &'a str>) {
        self.0.states.set(names.into_iter().collect());
    }

    pub fn pseudo_states(&self) -> PseudoStates {
        self.0.states.with(|states| {
            PseudoStates::all_names()
                .filter(|name| states.contains(name))
                .filter_map(PseudoStates::from_state_name)
                .collect()
        })
    }

    /// Sets the pseudo-state names to exactly `flags`, leaving other states
    /// untouched.
    pub fn set_pseudo_states(&self, flags: PseudoStates) {
        self.0.states.update(|states| {
            for name in PseudoStates::all_names() {
                states.remove(name);
            }
            for name in flags.names() {
                states.insert(name);
            }
        });
    }

    pub fn groups(&self) -> GroupSet {
        self.0.groups.get()
    }

    pub fn add_group(&self, name: &str) -> bool {
        let mut added = false;
        self.0.groups.update(|groups| added = groups.insert(name));
        added
    }

    pub fn remove_group(&self, name: &str) -> bool {
        let mut removed = false;
        self.0.groups.update(|groups| removed = groups.remove(name));
        removed
    }

    // ------------------------------------------------------------------
    // Tree structure
    // ------------------------------------------------------------------

    pub fn parent(&self) -> Option<Element> {
        self.0.parent.with(Link::upgrade).map(Element)
    }

    pub fn children(&self) -> Vec<Element> {
        self.0.children.borrow().clone()
    }

    /// True when `self` is `other` or one of its ancestors.
    pub fn contains(&self, other: &Element) -> bool {
        let mut current = Some(other.clone());
        while let Some(node) = current {
            if node.ptr_eq(self) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    pub fn append_child(&self, child: &Element) -> Result<()> {
        if child.parent().is_some() {
            return Err(ElementError::AlreadyAttached);
        }
        if child.contains(self) {
            return Err(ElementError::WouldCycle);
        }
        self.0.children.borrow_mut().push(child.clone());
        child.0.parent.set(Link::to(&self.0));
        log::debug!(
            "element: attached {} under {}",
            child.0.element_type,
            self.0.element_type
        );
        Ok(())
    }

    pub fn remove_child(&self, child: &Element) -> Result<()> {
        let removed = {
            let mut children = self.0.children.borrow_mut();
            let index = children
                .iter()
                .position(|c| c.ptr_eq(child))
                .ok_or(ElementError::NotAChild)?;
            children.remove(index)
        };
        removed.0.parent.set(Link::default());
        log::debug!(
            "element: detached {} from {}",
            child.0.element_type,
            self.0.element_type
        );
        Ok(())
    }

    /// Marks this element as filling `slot` in the template of `owner`.
    ///
    /// Role paths only match while `owner` is an ancestor, so the role may be
    /// set before the element is attached.
    pub fn set_template_role(&self, slot: &str, owner: &Element) {
        self.0
            .role
            .set(RoleLink(Some((Name::from(slot), Link::to(&owner.0)))));
    }

    pub fn clear_template_role(&self) {
        self.0.role.set(RoleLink::default());
    }

    pub fn template_role(&self) -> Option<(Name, Element)> {
        self.0.role.with(|role| {
            let (slot, owner) = role.0.as_ref()?;
            Some((Rc::clone(slot), Element(owner.upgrade()?)))
        })
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("type", &self.0.element_type)
            .field("states", &self.0.states.get())
            .field("groups", &self.0.groups.get())
            .field("children", &self.0.children.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade::ElementTypes;

    fn element(name: &str) -> Element {
        let mut types = ElementTypes::new();
        let ty = types.register(name, None).unwrap();
        Element::new(ty, StyleSheet::new())
    }

    #[test]
    fn test_state_mutators_report_changes() {
        let el = element("Button");
        assert!(el.add_state("hover"));
        assert!(!el.add_state("hover"));
        assert!(el.has_state("hover"));
        assert!(el.remove_state("hover"));
        assert!(!el.remove_state("hover"));
    }

    #[test]
    fn test_pseudo_states_keep_custom_states() {
        let el = element("Button");
        el.set_states(["selected", "hover"]);
        el.set_pseudo_states(PseudoStates::FOCUS | PseudoStates::DISABLED);

        assert_eq!(el.pseudo_states(), PseudoStates::FOCUS | PseudoStates::DISABLED);
        assert!(el.has_state("selected"));
        assert!(!el.has_state("hover"));
    }

    #[test]
    fn test_tree_mutations() {
        let root = element("Screen");
        let child = element("Button");
        root.append_child(&child).unwrap();

        assert_eq!(child.parent(), Some(root.clone()));
        assert!(matches!(root.append_child(&child), Err(ElementError::AlreadyAttached)));
        assert!(matches!(child.append_child(&root), Err(ElementError::WouldCycle)));

        root.remove_child(&child).unwrap();
        assert_eq!(child.parent(), None);
        assert!(matches!(root.remove_child(&child), Err(ElementError::NotAChild)));
    }

    #[test]
    fn test_template_role_is_weak() {
        let owner = element("Dialog");
        let part = element("Button");
        part.set_template_role("ok", &owner);
        assert_eq!(part.template_role().map(|(slot, _)| slot.to_string()), Some("ok".into()));

        drop(owner);
        assert!(part.template_role().is_none());
    }
}
