//! The error-code catalog.
//!
//! Every user-facing diagnostic is keyed by a stable code from this closed
//! set. The catalog supplies the category, default severity, message
//! template, and help text; throw sites fill the named placeholders.

use crate::diag::Severity;

/// A single catalog entry.
#[derive(Debug, Clone, Copy)]
pub struct CodeInfo {
    pub code: &'static str,
    /// Symbolic name, stable across releases.
    pub name: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    /// Message template with `{placeholder}` slots.
    pub template: &'static str,
    pub help: &'static str,
}

/// The complete, closed catalog. Codes are never reused or renumbered.
pub const CATALOG: &[CodeInfo] = &[
    // ── Syntax ─────────────────────────────────────────────────────────
    CodeInfo {
        code: "E001",
        name: "UNEXPECTED_TOKEN",
        category: "syntax",
        severity: Severity::Error,
        template: "expected {expected}, found {actual}",
        help: "the parser resumed at the next declaration boundary",
    },
    CodeInfo {
        code: "E002",
        name: "UNTERMINATED_STRING",
        category: "syntax",
        severity: Severity::Error,
        template: "unterminated string literal",
        help: "string literals must close before the end of the line",
    },
    CodeInfo {
        code: "E003",
        name: "INVALID_NUMBER",
        category: "syntax",
        severity: Severity::Error,
        template: "invalid numeric literal `{text}`",
        help: "numbers look like `42`, `42L`, or `3.14`",
    },
    CodeInfo {
        code: "E004",
        name: "STRAY_CHARACTER",
        category: "syntax",
        severity: Severity::Error,
        template: "unexpected character `{char}`",
        help: "Aster punctuation is limited to `: , ( ) .`",
    },
    CodeInfo {
        code: "E005",
        name: "INCONSISTENT_INDENT",
        category: "syntax",
        severity: Severity::Error,
        template: "dedent to column {col} does not match any enclosing indentation level",
        help: "indentation must return to a previously used level",
    },
    CodeInfo {
        code: "E006",
        name: "INVALID_UTF8",
        category: "syntax",
        severity: Severity::Error,
        template: "invalid UTF-8 byte sequence; replaced with U+FFFD",
        help: "source files must be UTF-8 encoded",
    },
    CodeInfo {
        code: "E007",
        name: "TRANSLATOR_COLLISION",
        category: "syntax",
        severity: Severity::Error,
        template: "localized name `{localized}` collides with `{canonical}`",
        help: "rename the identifier or adjust the lexicon vocabulary",
    },
    CodeInfo {
        code: "E008",
        name: "IR_VERSION_MISMATCH",
        category: "syntax",
        severity: Severity::Error,
        template: "Core IR version {found} does not match supported version {expected}",
        help: "re-emit the Core IR with the current compiler",
    },
    // ── Scope ──────────────────────────────────────────────────────────
    CodeInfo {
        code: "E101",
        name: "UNDEFINED_NAME",
        category: "scope",
        severity: Severity::Error,
        template: "`{name}` is not defined in this scope",
        help: "names resolve lexically; check spelling and declaration order",
    },
    CodeInfo {
        code: "E102",
        name: "DUPLICATE_DEFINITION",
        category: "scope",
        severity: Severity::Error,
        template: "`{name}` is already defined in this scope",
        help: "shadowing is only allowed across nested scopes",
    },
    CodeInfo {
        code: "E103",
        name: "DUPLICATE_FIELD",
        category: "scope",
        severity: Severity::Error,
        template: "field `{name}` is declared more than once",
        help: "field names must be unique within a declaration",
    },
    CodeInfo {
        code: "E104",
        name: "ENUM_NO_VARIANTS",
        category: "scope",
        severity: Severity::Error,
        template: "`{name}` must declare at least one variant",
        help: "an enumeration with no variants has no values",
    },
    CodeInfo {
        code: "E105",
        name: "DUPLICATE_VARIANT",
        category: "scope",
        severity: Severity::Error,
        template: "variant `{name}` is declared more than once",
        help: "variant names must be unique within a declaration",
    },
    // ── Types ──────────────────────────────────────────────────────────
    CodeInfo {
        code: "E201",
        name: "TYPE_MISMATCH",
        category: "type",
        severity: Severity::Error,
        template: "expected `{expected}`, found `{actual}`",
        help: "the two types cannot be unified",
    },
    CodeInfo {
        code: "E202",
        name: "TYPEVAR_INCONSISTENT",
        category: "type",
        severity: Severity::Error,
        template: "type variable `{name}` was bound to `{previous}` but is used as `{actual}`",
        help: "a type variable must stand for one type throughout a call",
    },
    CodeInfo {
        code: "E203",
        name: "TYPE_VAR_UNDECLARED",
        category: "type",
        severity: Severity::Error,
        template: "type variable `{name}` is used but not declared",
        help: "declare type parameters with `of` in the rule header",
    },
    CodeInfo {
        code: "E204",
        name: "TYPEVAR_LIKE_UNDECLARED",
        category: "type",
        severity: Severity::Error,
        template: "`{name}` looks like a type variable but is not declared or known",
        help: "declare it as a type parameter or define the type",
    },
    CodeInfo {
        code: "E205",
        name: "ARITY_MISMATCH",
        category: "type",
        severity: Severity::Error,
        template: "`{name}` expects {expected} argument(s), found {actual}",
        help: "check the rule signature",
    },
    CodeInfo {
        code: "E206",
        name: "NOT_A_FUNCTION",
        category: "type",
        severity: Severity::Error,
        template: "`{name}` is not callable",
        help: "only rules and lambdas can be called",
    },
    CodeInfo {
        code: "E207",
        name: "ALIAS_CYCLE",
        category: "type",
        severity: Severity::Error,
        template: "type alias `{name}` expands to itself",
        help: "break the cycle by removing one of the aliases",
    },
    CodeInfo {
        code: "E208",
        name: "OCCURS_CHECK",
        category: "type",
        severity: Severity::Error,
        template: "type variable `{name}` occurs in `{ty}`; the type would be infinite",
        help: "a type variable cannot be bound to a type containing itself",
    },
    // ── Effects ────────────────────────────────────────────────────────
    CodeInfo {
        code: "E301",
        name: "EFFECT_NOT_DECLARED",
        category: "effect",
        severity: Severity::Error,
        template: "`{name}` performs {effects} but does not declare them",
        help: "add the missing effects to the `it performs` clause",
    },
    CodeInfo {
        code: "E302",
        name: "EFFECT_VAR_UNDECLARED",
        category: "effect",
        severity: Severity::Error,
        template: "effect variable `{name}` is used but not declared",
        help: "declare effect parameters with `using` in the rule header",
    },
    // ── Capabilities ───────────────────────────────────────────────────
    CodeInfo {
        code: "E351",
        name: "CAPABILITY_DENIED",
        category: "capability",
        severity: Severity::Error,
        template: "call to `{name}` is denied for capability `{capability}`",
        help: "a deny pattern in the capability manifest matches this call",
    },
    CodeInfo {
        code: "E352",
        name: "CAPABILITY_NOT_ALLOWED",
        category: "capability",
        severity: Severity::Error,
        template: "call to `{name}` is not allowed for capability `{capability}`",
        help: "no allow pattern in the capability manifest matches this call",
    },
    // ── PII ────────────────────────────────────────────────────────────
    CodeInfo {
        code: "E401",
        name: "PII_LEAK",
        category: "pii",
        severity: Severity::Error,
        template: "personally identifying value flows into `{name}` without being revealed",
        help: "unwrap explicitly with `Pii.reveal` if the flow is intended",
    },
    // ── Async ──────────────────────────────────────────────────────────
    CodeInfo {
        code: "E501",
        name: "ASYNC_WAIT_BEFORE_START",
        category: "async",
        severity: Severity::Error,
        template: "task `{name}` is waited on before it is started on every path",
        help: "every `Wait for` must be preceded by a `Start` on all control-flow paths",
    },
    CodeInfo {
        code: "E502",
        name: "ASYNC_DUPLICATE_START",
        category: "async",
        severity: Severity::Error,
        template: "task `{name}` may already have been started",
        help: "a task name can be started at most once per path",
    },
    // ── Warnings ───────────────────────────────────────────────────────
    CodeInfo {
        code: "W011",
        name: "SHADOWED_NAME",
        category: "scope",
        severity: Severity::Warning,
        template: "`{name}` shadows an earlier definition",
        help: "rename one of the bindings if the shadowing is unintended",
    },
    CodeInfo {
        code: "W021",
        name: "TYPE_PARAM_UNUSED",
        category: "type",
        severity: Severity::Warning,
        template: "type parameter `{name}` is declared but never used",
        help: "remove the parameter from the `of` list",
    },
    CodeInfo {
        code: "W031",
        name: "EFFECT_OVER_DECLARED",
        category: "effect",
        severity: Severity::Warning,
        template: "`{name}` declares {effects} but never performs them",
        help: "remove the unused effects from the `it performs` clause",
    },
    CodeInfo {
        code: "W032",
        name: "EFFECT_PARAM_UNUSED",
        category: "effect",
        severity: Severity::Warning,
        template: "effect parameter `{name}` is declared but never used",
        help: "remove the parameter from the `using` list",
    },
];

/// Look up a catalog entry by code.
///
/// Unknown codes are a programmer error at the throw site, so this returns
/// `Option` and the diagnostic builder panics on `None`.
pub fn lookup(code: &str) -> Option<&'static CodeInfo> {
    CATALOG.iter().find(|info| info.code == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_known_codes() {
        let info = lookup("E501").unwrap();
        assert_eq!(info.name, "ASYNC_WAIT_BEFORE_START");
        assert_eq!(info.category, "async");
        assert_eq!(info.severity, Severity::Error);
    }

    #[test]
    fn lookup_rejects_unknown_codes() {
        assert!(lookup("E999").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn codes_are_unique() {
        for (i, a) in CATALOG.iter().enumerate() {
            for b in &CATALOG[i + 1..] {
                assert_ne!(a.code, b.code, "duplicate code {}", a.code);
                assert_ne!(a.name, b.name, "duplicate name {}", a.name);
            }
        }
    }

    #[test]
    fn warning_codes_carry_warning_severity() {
        for info in CATALOG {
            if info.code.starts_with('W') {
                assert_eq!(info.severity, Severity::Warning, "{}", info.code);
            } else {
                assert_eq!(info.severity, Severity::Error, "{}", info.code);
            }
        }
    }
}
