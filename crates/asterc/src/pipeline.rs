//! The compilation pipeline: canonicalize -> lex -> translate -> parse ->
//! lower -> typecheck.
//!
//! Each stage is pure over immutable inputs; diagnostics flow into one
//! shared builder and come out sorted and de-duplicated. There is no
//! back-edge: later stages never touch earlier outputs.

use aster_common::diag::{Diagnostic, Diagnostics};
use aster_ir::ir;
use aster_lexer::{canon, Lexicon};

/// Everything one pipeline run produces.
pub struct Outcome {
    /// Canonical source text (what spans refer to).
    pub source: String,
    pub module: ir::Module,
    /// Sorted, de-duplicated diagnostics from every stage.
    pub diagnostics: Vec<Diagnostic>,
}

impl Outcome {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == aster_common::diag::Severity::Error)
    }
}

/// Run the full pipeline over raw source bytes.
pub fn run(bytes: &[u8], lexicon: &Lexicon, options: &aster_typeck::Options) -> Outcome {
    let mut diags = Diagnostics::new();

    log::debug!("canonicalizing {} byte(s)", bytes.len());
    let source = canon::canonicalize(bytes, &mut diags);

    let tokens = aster_lexer::lex(&source, lexicon, &mut diags);
    let tokens = aster_parser::translate::translate(tokens, lexicon, &mut diags);
    let ast = aster_parser::parse(tokens, &mut diags);
    let module = aster_ir::lower_module(ast);
    aster_typeck::check_module(&module, options, &mut diags);

    Outcome {
        source,
        module,
        diagnostics: diags.finish(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aster_lexer::lexicon;

    fn run_en(src: &str) -> Outcome {
        run(
            src.as_bytes(),
            &lexicon::english(),
            &aster_typeck::Options::default(),
        )
    }

    #[test]
    fn clean_module_has_no_diagnostics() {
        let outcome =
            run_en("Module demo. Rule greet given name: Text, produce Text: Return name.");
        assert!(outcome.diagnostics.is_empty(), "{:#?}", outcome.diagnostics);
        assert!(!outcome.has_errors());
        assert_eq!(outcome.module.name, "demo");
    }

    #[test]
    fn core_ir_json_is_byte_identical_across_runs() {
        let src = "Module demo.\nDefine User has name required, age between 18 and 120.\nRule greet given name: Text, produce Text: Return name.\n";
        let first = aster_ir::to_json(&run_en(src).module);
        let second = aster_ir::to_json(&run_en(src).module);
        assert_eq!(first, second);
    }

    #[test]
    fn diagnostics_come_out_in_span_order() {
        let src = "Module demo.\nRule f produce Int: Return zzz.\nRule g produce Int: Return yyy.\n";
        let outcome = run_en(src);
        let lines: Vec<u32> = outcome
            .diagnostics
            .iter()
            .map(|d| d.span.start.line)
            .collect();
        let mut sorted = lines.clone();
        sorted.sort_unstable();
        assert_eq!(lines, sorted);
    }

    #[test]
    fn pipeline_is_total_on_garbage() {
        let outcome = run_en("\u{0}\u{1} not a module at all ((((");
        assert!(outcome.has_errors());
    }

    #[test]
    fn full_pipeline_carries_raw_bytes_through_canonicalization() {
        // CRLF + tabs + BOM + hash comments all normalize before lexing.
        let src = "\u{feff}Module demo.\r\n# note\r\nRule f produce Int:\r\n\tReturn 1.\r\n";
        let outcome = run_en(src);
        assert!(outcome.diagnostics.is_empty(), "{:#?}", outcome.diagnostics);
        assert!(outcome.source.contains("// note"));
    }
}
