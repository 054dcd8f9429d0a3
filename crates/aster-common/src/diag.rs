//! The shared diagnostics engine.
//!
//! Diagnostics are collected, never thrown: every phase receives a mutable
//! [`Diagnostics`] builder and appends structured records keyed by the
//! stable codes in [`crate::codes`]. Rendering with source snippets is a
//! driver concern and lives outside this crate.

use serde::Serialize;

use crate::codes;
use crate::span::Span;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A machine-applicable replacement suggestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixIt {
    pub span: Span,
    pub replacement: String,
}

/// A single structured diagnostic record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub category: &'static str,
    pub message: String,
    pub span: Span,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_it: Option<FixIt>,
    pub help: &'static str,
}

/// Append-only diagnostic builder shared across all phases.
///
/// Entries accumulate in emission order; [`Diagnostics::finish`] sorts them
/// into source-span order and removes duplicates by `(code, span, message)`
/// as the pipeline contract requires.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic for `code`, filling the catalog template with the
    /// given `{placeholder}` arguments.
    ///
    /// # Panics
    ///
    /// Panics if `code` is not in the catalog. That is a bug at the throw
    /// site, not a user error.
    pub fn emit(&mut self, code: &str, span: Span, args: &[(&str, String)]) {
        self.emit_inner(code, span, args, None);
    }

    /// Emit a diagnostic with an attached fix-it payload.
    pub fn emit_with_fix(
        &mut self,
        code: &str,
        span: Span,
        args: &[(&str, String)],
        fix_it: FixIt,
    ) {
        self.emit_inner(code, span, args, Some(fix_it));
    }

    fn emit_inner(
        &mut self,
        code: &str,
        span: Span,
        args: &[(&str, String)],
        fix_it: Option<FixIt>,
    ) {
        let info = codes::lookup(code)
            .unwrap_or_else(|| panic!("unknown diagnostic code `{code}`"));
        self.entries.push(Diagnostic {
            severity: info.severity,
            code: info.code,
            category: info.category,
            message: fill_template(info.template, args),
            span,
            fix_it,
            help: info.help,
        });
    }

    /// Append an already-built diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// The entries emitted so far, in emission order.
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// Finalize: sort into source-span order and de-duplicate by
    /// `(code, span, message)`.
    pub fn finish(mut self) -> Vec<Diagnostic> {
        self.entries
            .sort_by(|a, b| (a.span, a.code, &a.message).cmp(&(b.span, b.code, &b.message)));
        self.entries
            .dedup_by(|a, b| a.code == b.code && a.span == b.span && a.message == b.message);
        self.entries
    }
}

/// Replace each `{name}` placeholder with its argument value.
///
/// Unfilled placeholders are left intact, which makes a template mismatch
/// visible in test output instead of panicking mid-pass.
fn fill_template(template: &str, args: &[(&str, String)]) -> String {
    let mut message = template.to_string();
    for (key, value) in args {
        message = message.replace(&format!("{{{key}}}"), value);
    }
    message
}
