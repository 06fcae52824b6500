use std::cell::Cell;
use std::rc::Rc;

use cascade::{
    AttributeSpec, CascadeError, Color, StateExpression, StatefulStyle, StyleAttribute,
    StyleBuilder, StyleCondition, StyleContext, StyleValue,
};
use elements::{Document, PseudoStates};

struct Fixture {
    document: Document,
    opacity: StyleAttribute<f64>,
    color: StyleAttribute<Color>,
}

fn fixture() -> Fixture {
    let mut cx = StyleContext::new();
    let opacity = cx
        .register_attribute(AttributeSpec::new("paint", "opacity", 1.0_f64))
        .unwrap();
    let color = cx
        .register_attribute(AttributeSpec::new("paint", "color", Color::white()).inherited(true))
        .unwrap();
    cx.register_type("Widget", None).unwrap();
    cx.register_type("Button", Some("Widget")).unwrap();
    cx.register_type("Container", Some("Widget")).unwrap();
    cx.register_type("Dialog", Some("Container")).unwrap();
    Fixture {
        document: Document::new(cx),
        opacity,
        color,
    }
}

fn counter<T: Clone + PartialEq + 'static>(
    value: &cascade::reactive::Computed<T>,
) -> (Rc<Cell<usize>>, cascade::reactive::Subscription) {
    let hits = Rc::new(Cell::new(0));
    let sink = Rc::clone(&hits);
    let sub = value.subscribe(move |_| sink.set(sink.get() + 1));
    (hits, sub)
}

// ============================================================================
// SOURCES IN ORDER
// ============================================================================

#[test]
fn test_hovered_button_opacity() {
    let f = fixture();
    let button_type = f.document.context().types.get("Button").unwrap();
    f.document
        .sheet()
        .set(
            &f.opacity,
            StyleCondition::new()
                .with_type(button_type)
                .with_state(StateExpression::state("hovered")),
            0.5,
        )
        .unwrap();

    let button = f.document.create_named("Button").unwrap();
    let opacity = button.style_view().value(&f.opacity);
    assert_eq!(opacity.get(), 1.0);

    button.add_state("hovered");
    assert_eq!(opacity.get(), 0.5);

    button.remove_state("hovered");
    assert_eq!(opacity.get(), 1.0);
}

#[test]
fn test_local_style_beats_stylesheet() {
    let f = fixture();
    f.document
        .sheet()
        .set(&f.opacity, StyleCondition::new(), 0.8)
        .unwrap();
    let button = f.document.create_named("Button").unwrap();
    let opacity = button.style_view().get(&f.opacity, true);
    assert_eq!(opacity.get(), Some(StyleValue::Number(0.8)));

    button
        .style()
        .set_when(&f.opacity, StateExpression::state("disabled"), 0.3)
        .unwrap();
    assert_eq!(opacity.get(), Some(StyleValue::Number(0.8)));

    button.set_pseudo_states(PseudoStates::DISABLED);
    assert_eq!(opacity.get(), Some(StyleValue::Number(0.3)));

    button.set_pseudo_states(PseudoStates::empty());
    assert_eq!(opacity.get(), Some(StyleValue::Number(0.8)));
}

#[test]
fn test_default_fallback() {
    let f = fixture();
    let button = f.document.create_named("Button").unwrap();
    let view = button.style_view();

    assert_eq!(view.get(&f.opacity, false).get(), None);
    assert_eq!(view.get(&f.opacity, true).get(), Some(StyleValue::Number(1.0)));
    assert_eq!(view.value(&f.opacity).get(), 1.0);
    assert!(!view.is_set(&f.opacity));
}

#[test]
fn test_non_inherited_attribute_ignores_parent() {
    let f = fixture();
    let parent = f.document.create_named("Container").unwrap();
    let child = f.document.create_named("Button").unwrap();
    parent.append_child(&child).unwrap();
    parent.style().set(&f.opacity, 0.2).unwrap();

    assert_eq!(child.style_view().value(&f.opacity).get(), 1.0);
}

// ============================================================================
// INHERITANCE
// ============================================================================

#[test]
fn test_inherited_value_follows_parent() {
    let f = fixture();
    let parent = f.document.create_named("Container").unwrap();
    let child = f.document.create_named("Button").unwrap();
    parent.append_child(&child).unwrap();

    let color = child.style_view().value(&f.color);
    let (updates, _sub) = counter(&color);
    assert_eq!(color.get(), Color::white());

    parent.style().set(&f.color, Color::rgb(255, 0, 0)).unwrap();
    assert_eq!(color.get(), Color::rgb(255, 0, 0));
    assert_eq!(updates.get(), 1, "one parent change, one child update");

    parent.style().set(&f.color, Color::rgb(0, 0, 255)).unwrap();
    assert_eq!(updates.get(), 2);
}

#[test]
fn test_inheritance_through_grandparent_and_reparenting() {
    let f = fixture();
    let root = f.document.create_named("Dialog").unwrap();
    let middle = f.document.create_named("Container").unwrap();
    let leaf = f.document.create_named("Button").unwrap();
    root.append_child(&middle).unwrap();
    middle.append_child(&leaf).unwrap();
    root.style().set(&f.color, Color::black()).unwrap();

    let color = leaf.style_view().value(&f.color);
    assert_eq!(color.get(), Color::black());

    middle.remove_child(&leaf).unwrap();
    assert_eq!(color.get(), Color::white());

    let other = f.document.create_named("Container").unwrap();
    other.style().set(&f.color, Color::rgb(0, 128, 0)).unwrap();
    other.append_child(&leaf).unwrap();
    assert_eq!(color.get(), Color::rgb(0, 128, 0));
}

#[test]
fn test_is_set_recurses_for_inherited() {
    let f = fixture();
    let parent = f.document.create_named("Container").unwrap();
    let child = f.document.create_named("Button").unwrap();
    parent.append_child(&child).unwrap();
    assert!(!child.style_view().is_set(&f.color));

    parent.style().set(&f.color, Color::black()).unwrap();
    assert!(child.style_view().is_set(&f.color));
    assert!(!child.style_view().is_set(&f.opacity));
}

// ============================================================================
// SHADOWING
// ============================================================================

#[test]
fn test_shadowed_dependency_rule_is_silent() {
    let f = fixture();
    let theme = StatefulStyle::new();
    let button = f.document.create_named("Button").unwrap();
    button.style().set(&f.opacity, 0.9).unwrap();
    button.style().add_dependency(&theme, None).unwrap();

    let opacity = button.style_view().value(&f.opacity);
    let changes = Rc::new(Cell::new(0));
    let sink = Rc::clone(&changes);
    let _changes = button.style().subscribe(move |_| sink.set(sink.get() + 1));
    let (updates, _sub) = counter(&opacity);

    theme.set(&f.opacity, 0.4).unwrap();
    assert_eq!(changes.get(), 0);
    assert_eq!(updates.get(), 0);
    assert_eq!(opacity.get(), 0.9);

    button.style().clear(&f.opacity, None).unwrap();
    assert_eq!(changes.get(), 1);
    assert_eq!(updates.get(), 1);
    assert_eq!(opacity.get(), 0.4);
}

// ============================================================================
// SEALING
// ============================================================================

#[test]
fn test_sealed_dependency_never_changes() {
    let f = fixture();
    let mut builder = StyleBuilder::new();
    builder.set(&f.opacity, 0.6).unwrap();
    let base = builder.build().into_style();

    let button = f.document.create_named("Button").unwrap();
    button.style().add_dependency(&base, None).unwrap();
    let opacity = button.style_view().value(&f.opacity);
    assert_eq!(opacity.get(), 0.6);

    assert_eq!(base.set(&f.opacity, 0.1), Err(CascadeError::Sealed));
    assert_eq!(base.clear(&f.opacity, None), Err(CascadeError::Sealed));
    assert_eq!(base.clear_attribute(&f.opacity), Err(CascadeError::Sealed));
    assert_eq!(
        base.add_dependency(&StatefulStyle::new(), None),
        Err(CascadeError::Sealed)
    );
    assert!(base.subscribe(|_| {}).is_noop());
    assert_eq!(opacity.get(), 0.6);
}

#[test]
fn test_sealed_stylesheet_still_tracks_elements() {
    let f = fixture();
    f.document
        .sheet()
        .set(
            &f.opacity,
            StyleCondition::new().with_group("muted"),
            0.25,
        )
        .unwrap();
    f.document.sheet().seal();

    let button = f.document.create_named("Button").unwrap();
    let opacity = button.style_view().value(&f.opacity);
    button.add_group("muted");
    assert_eq!(opacity.get(), 0.25);
    assert!(
        f.document
            .sheet()
            .set(&f.opacity, StyleCondition::new(), 0.5)
            .is_err()
    );
}

// ============================================================================
// ROLES AND ATTRIBUTES
// ============================================================================

#[test]
fn test_template_role_rule() {
    let f = fixture();
    let dialog_type = f.document.context().types.get("Dialog").unwrap();
    f.document
        .sheet()
        .set(
            &f.opacity,
            StyleCondition::new().with_role(dialog_type, "ok"),
            0.7,
        )
        .unwrap();

    let dialog = f.document.create_named("Dialog").unwrap();
    let button = f.document.create_named("Button").unwrap();
    let opacity = button.style_view().value(&f.opacity);

    button.set_template_role("ok", &dialog);
    assert_eq!(opacity.get(), 1.0, "owner must be an ancestor");

    dialog.append_child(&button).unwrap();
    assert_eq!(opacity.get(), 0.7);

    button.clear_template_role();
    assert_eq!(opacity.get(), 1.0);
}

#[test]
fn test_visible_attributes() {
    let f = fixture();
    f.document
        .sheet()
        .set(&f.opacity, StyleCondition::new().with_group("muted"), 0.5)
        .unwrap();

    let parent = f.document.create_named("Container").unwrap();
    let child = f.document.create_named("Button").unwrap();
    parent.append_child(&child).unwrap();
    let attributes = child.style_view().attributes();
    assert!(attributes.get().is_empty());

    parent.style().set(&f.color, Color::black()).unwrap();
    assert!(attributes.get().contains(f.color.attribute()));

    child.add_group("muted");
    assert_eq!(attributes.get().len(), 2);

    // Not inherited, so the parent's opacity stays invisible to the child.
    child.remove_group("muted");
    parent.style().set(&f.opacity, 0.1).unwrap();
    assert!(!attributes.get().contains(f.opacity.attribute()));
}
