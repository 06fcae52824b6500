use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::reactive::{Computed, Tracker};

use super::context::{ElementContext, is_ancestor};
use super::element_type::ElementType;
use super::state::{GroupSet, Name, StateExpression};

/// One step of a role path: the element fills `slot` in a `template`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Role {
    pub template: ElementType,
    pub slot: Name,
}

/// When a stylesheet rule applies to an element.
///
/// A condition matches when the element's type is assignable to the
/// required type, every group is present on the element, the role path can
/// be walked from the element up through its template owners, and the state
/// expression holds for the element's active states.
///
/// ```
/// use cascade::{ElementTypes, StateExpression, StyleCondition};
///
/// let mut types = ElementTypes::new();
/// let button = types.register("Button", None).unwrap();
///
/// let hovered = StyleCondition::new()
///     .with_type(button)
///     .with_state(StateExpression::state("hover"));
/// assert_eq!(hovered.to_string(), "Button[hover]");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleCondition {
    state: Option<StateExpression>,
    /// `state`'s satisfying fraction, cached for comparisons.
    state_share: f64,
    groups: GroupSet,
    element_type: Option<ElementType>,
    /// Innermost first.
    roles: SmallVec<[Role; 2]>,
}

impl StyleCondition {
    /// A condition that matches every element.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, element_type: ElementType) -> Self {
        self.element_type = Some(element_type);
        self
    }

    pub fn with_state(mut self, state: StateExpression) -> Self {
        self.state_share = state.satisfying_fraction();
        self.state = Some(state);
        self
    }

    pub fn with_group(mut self, group: &str) -> Self {
        self.groups.insert(group);
        self
    }

    /// Appends the next outer step of the role path.
    pub fn with_role(mut self, template: ElementType, slot: &str) -> Self {
        self.roles.push(Role {
            template,
            slot: Name::from(slot),
        });
        self
    }

    pub fn state(&self) -> Option<&StateExpression> {
        self.state.as_ref()
    }

    pub fn groups(&self) -> &GroupSet {
        &self.groups
    }

    pub fn element_type(&self) -> Option<&ElementType> {
        self.element_type.as_ref()
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Depth of the required type, 0 when any type is accepted.
    pub fn type_depth(&self) -> usize {
        self.element_type.as_ref().map_or(0, ElementType::depth)
    }

    /// Evaluates the condition, recording every element input it reads.
    ///
    /// Checks run cheapest first and stop at the first failure; only the
    /// inputs read up to that point can change the outcome.
    pub fn evaluate(&self, element: &dyn ElementContext, cx: &mut Tracker) -> bool {
        if let Some(required) = &self.element_type {
            if !element.element_type().is_assignable_to(required) {
                return false;
            }
        }

        if !self.groups.is_empty() && !element.groups(cx).is_superset(&self.groups) {
            return false;
        }

        if !self.roles.is_empty() && !self.walk_roles(element, cx) {
            return false;
        }

        match &self.state {
            Some(expr) => expr.evaluate(&element.states(cx)),
            None => true,
        }
    }

    fn walk_roles(&self, element: &dyn ElementContext, cx: &mut Tracker) -> bool {
        let mut holder: Option<Rc<dyn ElementContext>> = None;
        for role in &self.roles {
            let current: &dyn ElementContext = match &holder {
                Some(owner) => &**owner,
                None => element,
            };
            let Some(placement) = current.template_role(cx) else {
                return false;
            };
            if placement.slot != role.slot
                || !placement.owner.element_type().is_assignable_to(&role.template)
                || !is_ancestor(&*placement.owner, current, cx)
            {
                return false;
            }
            holder = Some(placement.owner);
        }
        true
    }

    /// Snapshot match against the element's current inputs.
    pub fn matches_now(&self, element: &dyn ElementContext) -> bool {
        self.evaluate(element, &mut Tracker::untracked())
    }

    /// Reactive match: re-evaluated whenever the element's states, groups,
    /// template role or ancestry change. Holds the element weakly.
    pub fn matches(&self, element: &Rc<dyn ElementContext>) -> Computed<bool> {
        let condition = self.clone();
        let element = Rc::downgrade(element);
        Computed::new(move |cx| {
            element
                .upgrade()
                .is_some_and(|element| condition.evaluate(&*element, cx))
        })
    }

    /// Orders conditions by specificity; `Greater` means `self` is more specific.
    ///
    /// State expressions decide first: having one beats not having one, and
    /// between two, the one that holds in the smaller share of state
    /// assignments wins, so an expression that strictly implies the other is
    /// more specific. Then role path length, group count, and type depth.
    /// The order is a total preorder; `Equal` means no criterion separates
    /// the two.
    pub fn compare_specificity(&self, other: &StyleCondition) -> Ordering {
        self.compare_states(other)
            .then_with(|| self.roles.len().cmp(&other.roles.len()))
            .then_with(|| self.groups.len().cmp(&other.groups.len()))
            .then_with(|| self.type_depth().cmp(&other.type_depth()))
    }

    fn compare_states(&self, other: &StyleCondition) -> Ordering {
        match (&self.state, &other.state) {
            (None, None) => Ordering::Equal,
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (Some(_), Some(_)) => other.state_share.total_cmp(&self.state_share),
        }
    }
}

impl fmt::Display for StyleCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.element_type {
            Some(ty) => write!(f, "{ty}")?,
            None => f.write_str("*")?,
        }
        for group in self.groups.iter() {
            write!(f, ".{group}")?;
        }
        if let Some(state) = &self.state {
            write!(f, "[{state}]")?;
        }
        for role in &self.roles {
            write!(f, " @{}/{}", role.template, role.slot)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::ElementTypes;

    fn s(name: &str) -> StateExpression {
        StateExpression::state(name)
    }

    #[test]
    fn test_state_beats_no_state() {
        let plain = StyleCondition::new().with_group("primary").with_group("large");
        let hovered = StyleCondition::new().with_state(s("hover"));
        assert_eq!(hovered.compare_specificity(&plain), Ordering::Greater);
        assert_eq!(plain.compare_specificity(&hovered), Ordering::Less);
    }

    #[test]
    fn test_narrower_state_is_more_specific() {
        let hover = StyleCondition::new().with_state(s("hover"));
        let hover_focus = StyleCondition::new().with_state(s("hover") & s("focus"));
        assert_eq!(hover_focus.compare_specificity(&hover), Ordering::Greater);
    }

    #[test]
    fn test_broader_unrelated_state_loses() {
        // Neither implies the other; `a & b` holds less often than `c`.
        let narrow = StyleCondition::new().with_state(s("a") & s("b"));
        let broad = StyleCondition::new().with_state(s("c")).with_group("g1").with_group("g2");
        assert_eq!(narrow.compare_specificity(&broad), Ordering::Greater);
    }

    #[test]
    fn test_unrelated_states_fall_through_to_structure() {
        let mut types = ElementTypes::new();
        types.register("Widget", None).unwrap();
        let button = types.register("Button", Some("Widget")).unwrap();

        let a = StyleCondition::new().with_state(s("hover"));
        let b = StyleCondition::new().with_state(s("focus")).with_type(button);
        assert_eq!(b.compare_specificity(&a), Ordering::Greater);
    }

    #[test]
    fn test_role_path_then_groups_then_type_depth() {
        let mut types = ElementTypes::new();
        let widget = types.register("Widget", None).unwrap();
        let button = types.register("Button", Some("Widget")).unwrap();
        let dialog = types.register("Dialog", Some("Widget")).unwrap();

        let in_dialog = StyleCondition::new().with_role(dialog, "ok");
        let grouped = StyleCondition::new().with_group("a").with_group("b");
        let typed = StyleCondition::new().with_type(button).with_group("a");
        let shallow = StyleCondition::new().with_type(widget).with_group("a");

        assert_eq!(in_dialog.compare_specificity(&grouped), Ordering::Greater);
        assert_eq!(grouped.compare_specificity(&typed), Ordering::Greater);
        assert_eq!(typed.compare_specificity(&shallow), Ordering::Greater);
        assert_eq!(shallow.compare_specificity(&shallow.clone()), Ordering::Equal);
    }

    #[test]
    fn test_display() {
        let mut types = ElementTypes::new();
        let button = types.register("Button", None).unwrap();
        let dialog = types.register("Dialog", None).unwrap();
        let condition = StyleCondition::new()
            .with_type(button)
            .with_group("primary")
            .with_state(s("hover") & !s("disabled"))
            .with_role(dialog, "ok");
        insta::assert_snapshot!(condition.to_string(), @"Button.primary[hover & !disabled] @Dialog/ok");
    }
}
