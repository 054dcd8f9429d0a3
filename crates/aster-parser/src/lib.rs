//! Aster parser: token stream to AST.
//!
//! Recursive descent with explicit lookahead. The parser is total: it
//! always returns a [`ast::Module`], partial on error, with everything it
//! could not understand reported through the shared diagnostics builder
//! and replaced by `Error` placeholder nodes. IDE-style callers rely on
//! getting the partial tree back.

pub mod ast;
pub mod infer;
pub mod translate;
mod parser;

pub use parser::parse;

use aster_common::diag::Diagnostics;
use aster_lexer::Lexicon;

/// Lex, translate, and parse canonical source text in one step.
pub fn parse_source(source: &str, lexicon: &Lexicon, diags: &mut Diagnostics) -> ast::Module {
    let tokens = aster_lexer::lex(source, lexicon, diags);
    let tokens = translate::translate(tokens, lexicon, diags);
    parse(tokens, diags)
}
