//! Field-name type inference.
//!
//! Inferred-form fields (`name required` with no written type) get an
//! initial type from a deterministic name mapping; constraints then refine
//! it. The mapping is fixed: same name, same type, always.

use aster_common::span::Span;

use crate::ast::{Constraint, Number, TypeExpr};

/// Pick the initial type for a field from its name.
///
/// Suffix and prefix rules, first match wins:
/// `*Id` -> Text, `*Amount` -> Double, `*Count` -> Int, `is*`/`has*` ->
/// Bool, `*Date` -> DateTime; anything else defaults to Text.
pub fn initial_type(field_name: &str, span: Span) -> TypeExpr {
    let name = |name: &str| TypeExpr::Name {
        name: name.to_string(),
        span,
    };
    if field_name.ends_with("Id") || field_name == "id" {
        return name("Text");
    }
    if field_name.ends_with("Amount") || field_name == "amount" {
        return name("Double");
    }
    if field_name.ends_with("Count") || field_name == "count" {
        return name("Int");
    }
    if has_bool_prefix(field_name, "is") || has_bool_prefix(field_name, "has") {
        return name("Bool");
    }
    if field_name.ends_with("Date") || field_name == "date" {
        return name("DateTime");
    }
    name("Text")
}

/// `isActive`, `hasChildren` -- prefix followed by an uppercase letter.
fn has_bool_prefix(field_name: &str, prefix: &str) -> bool {
    field_name
        .strip_prefix(prefix)
        .and_then(|rest| rest.chars().next())
        .is_some_and(char::is_uppercase)
}

/// Refine an inferred type using the field's constraints.
///
/// A `matching` constraint always wins and forces Text. A range constraint
/// forces a numeric type: Int unless either bound is fractional (then
/// Double), keeping an already-numeric inferred type as-is.
pub fn refine_with_constraints(initial: TypeExpr, constraints: &[Constraint]) -> TypeExpr {
    let span = initial.span();
    if constraints
        .iter()
        .any(|c| matches!(c, Constraint::Pattern { .. }))
    {
        return TypeExpr::Name {
            name: "Text".to_string(),
            span,
        };
    }
    let range = constraints
        .iter()
        .find(|c| matches!(c, Constraint::Range { .. }));
    if let Some(Constraint::Range { min, max }) = range {
        if is_numeric(&initial) {
            return initial;
        }
        let fractional = [min, max]
            .into_iter()
            .flatten()
            .any(|n| matches!(n, Number::Float(_)));
        let name = if fractional { "Double" } else { "Int" };
        return TypeExpr::Name {
            name: name.to_string(),
            span,
        };
    }
    initial
}

fn is_numeric(ty: &TypeExpr) -> bool {
    matches!(
        ty,
        TypeExpr::Name { name, .. } if name == "Int" || name == "Long" || name == "Double"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_of(ty: &TypeExpr) -> &str {
        match ty {
            TypeExpr::Name { name, .. } => name,
            other => panic!("expected a named type, got {other:?}"),
        }
    }

    #[test]
    fn suffix_rules() {
        assert_eq!(name_of(&initial_type("userId", Span::DUMMY)), "Text");
        assert_eq!(name_of(&initial_type("totalAmount", Span::DUMMY)), "Double");
        assert_eq!(name_of(&initial_type("retryCount", Span::DUMMY)), "Int");
        assert_eq!(name_of(&initial_type("birthDate", Span::DUMMY)), "DateTime");
    }

    #[test]
    fn prefix_rules() {
        assert_eq!(name_of(&initial_type("isActive", Span::DUMMY)), "Bool");
        assert_eq!(name_of(&initial_type("hasChildren", Span::DUMMY)), "Bool");
        // Prefix must be followed by an uppercase letter.
        assert_eq!(name_of(&initial_type("island", Span::DUMMY)), "Text");
        assert_eq!(name_of(&initial_type("hashes", Span::DUMMY)), "Text");
    }

    #[test]
    fn default_is_text() {
        assert_eq!(name_of(&initial_type("name", Span::DUMMY)), "Text");
        assert_eq!(name_of(&initial_type("age", Span::DUMMY)), "Text");
    }

    #[test]
    fn range_refines_to_int() {
        let initial = initial_type("age", Span::DUMMY);
        let refined = refine_with_constraints(
            initial,
            &[Constraint::Range {
                min: Some(Number::Int(18)),
                max: Some(Number::Int(120)),
            }],
        );
        assert_eq!(name_of(&refined), "Int");
    }

    #[test]
    fn fractional_range_refines_to_double() {
        let refined = refine_with_constraints(
            initial_type("score", Span::DUMMY),
            &[Constraint::Range {
                min: Some(Number::Float(0.5)),
                max: None,
            }],
        );
        assert_eq!(name_of(&refined), "Double");
    }

    #[test]
    fn range_keeps_already_numeric_type() {
        let refined = refine_with_constraints(
            initial_type("totalAmount", Span::DUMMY),
            &[Constraint::Range {
                min: Some(Number::Int(0)),
                max: None,
            }],
        );
        assert_eq!(name_of(&refined), "Double");
    }

    #[test]
    fn pattern_wins_over_suffix_rule() {
        // `idCount` would infer Int by suffix, but the pattern forces Text.
        let refined = refine_with_constraints(
            initial_type("idCount", Span::DUMMY),
            &[Constraint::Pattern {
                regexp: r"^\d+$".to_string(),
            }],
        );
        assert_eq!(name_of(&refined), "Text");
    }

    #[test]
    fn pattern_wins_over_range() {
        let refined = refine_with_constraints(
            initial_type("code", Span::DUMMY),
            &[
                Constraint::Range {
                    min: Some(Number::Int(1)),
                    max: None,
                },
                Constraint::Pattern {
                    regexp: "^c".to_string(),
                },
            ],
        );
        assert_eq!(name_of(&refined), "Text");
    }
}
