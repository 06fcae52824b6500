use std::cmp::Ordering;

use cascade::{ElementType, ElementTypes, StateExpression, StyleCondition};

fn types() -> (ElementTypes, Vec<Option<ElementType>>) {
    let mut types = ElementTypes::new();
    let widget = types.register("Widget", None).unwrap();
    let button = types.register("Button", Some("Widget")).unwrap();
    types.register("Dialog", Some("Widget")).unwrap();
    (types, vec![None, Some(widget), Some(button)])
}

/// Conditions over a mix of state expressions, including pairs where
/// neither expression implies the other.
fn condition_family() -> Vec<StyleCondition> {
    let (types, element_types) = types();
    let dialog = types.get("Dialog").unwrap();
    let states = [
        None,
        Some(StateExpression::parse("hover").unwrap()),
        Some(StateExpression::parse("hover & focus").unwrap()),
        Some(StateExpression::parse("focus & hover & active").unwrap()),
        Some(StateExpression::parse("active").unwrap()),
        Some(StateExpression::parse("hover | focus").unwrap()),
        Some(StateExpression::parse("!hover & active").unwrap()),
    ];

    let mut out = Vec::new();
    for state in &states {
        for groups in 0..3 {
            for ty in &element_types {
                for roles in 0..2 {
                    let mut condition = StyleCondition::new();
                    if let Some(state) = state {
                        condition = condition.with_state(state.clone());
                    }
                    for g in 0..groups {
                        condition = condition.with_group(&format!("g{g}"));
                    }
                    if let Some(ty) = ty {
                        condition = condition.with_type(ty.clone());
                    }
                    for _ in 0..roles {
                        condition = condition.with_role(dialog.clone(), "body");
                    }
                    out.push(condition);
                }
            }
        }
    }
    out
}

// ============================================================================
// ORDER PROPERTIES
// ============================================================================

#[test]
fn test_specificity_is_antisymmetric() {
    let conditions = condition_family();
    for a in &conditions {
        for b in &conditions {
            assert_eq!(
                a.compare_specificity(b),
                b.compare_specificity(a).reverse(),
                "{a} vs {b}"
            );
        }
    }
}

#[test]
fn test_specificity_is_transitive() {
    let conditions = condition_family();
    let n = conditions.len();
    let table: Vec<Vec<Ordering>> = conditions
        .iter()
        .map(|a| conditions.iter().map(|b| a.compare_specificity(b)).collect())
        .collect();

    for a in 0..n {
        for b in 0..n {
            for c in 0..n {
                if table[a][b] != Ordering::Less && table[b][c] != Ordering::Less {
                    assert_ne!(
                        table[a][c],
                        Ordering::Less,
                        "{} >= {} >= {} but not {} >= {}",
                        conditions[a],
                        conditions[b],
                        conditions[c],
                        conditions[a],
                        conditions[c]
                    );
                }
            }
        }
    }
}

#[test]
fn test_incomparable_states_do_not_form_a_cycle() {
    let x = StyleCondition::new().with_state(StateExpression::parse("a & b").unwrap());
    let y = StyleCondition::new()
        .with_state(StateExpression::state("a"))
        .with_group("g1")
        .with_group("g2");
    let z = StyleCondition::new()
        .with_state(StateExpression::state("c"))
        .with_group("g1");

    assert_eq!(x.compare_specificity(&y), Ordering::Greater);
    assert_eq!(y.compare_specificity(&z), Ordering::Greater);
    assert_eq!(x.compare_specificity(&z), Ordering::Greater);
}

#[test]
fn test_implication_still_decides_between_states() {
    let broad = StyleCondition::new()
        .with_state(StateExpression::parse("hover | focus").unwrap())
        .with_group("a")
        .with_group("b");
    let narrow = StyleCondition::new().with_state(StateExpression::parse("hover").unwrap());
    assert_eq!(narrow.compare_specificity(&broad), Ordering::Greater);
}

#[test]
fn test_equivalent_states_compare_equal() {
    let a = StyleCondition::new().with_state(StateExpression::parse("hover & focus").unwrap());
    let b = StyleCondition::new().with_state(StateExpression::parse("focus & hover").unwrap());
    assert_eq!(a.compare_specificity(&b), Ordering::Equal);
    assert_ne!(a, b, "structurally different conditions stay distinct rules");
}

// ============================================================================
// CRITERIA PRECEDENCE
// ============================================================================

#[test]
fn test_state_outranks_everything_else() {
    let (types, _) = types();
    let button = types.get("Button").unwrap();
    let dialog = types.get("Dialog").unwrap();

    let structural = StyleCondition::new()
        .with_type(button)
        .with_group("a")
        .with_group("b")
        .with_role(dialog, "body");
    let stateful = StyleCondition::new().with_state(StateExpression::state("hover"));
    assert_eq!(stateful.compare_specificity(&structural), Ordering::Greater);
}

#[test]
fn test_subtype_outranks_supertype() {
    let (types, _) = types();
    let widget = StyleCondition::new().with_type(types.get("Widget").unwrap());
    let button = StyleCondition::new().with_type(types.get("Button").unwrap());
    let any = StyleCondition::new();
    assert_eq!(button.compare_specificity(&widget), Ordering::Greater);
    assert_eq!(widget.compare_specificity(&any), Ordering::Greater);
    assert_eq!(button.type_depth(), 2);
}
