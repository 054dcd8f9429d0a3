//! Keyword translation for non-English lexicons.
//!
//! The parser only understands canonical English keywords. For any other
//! lexicon this pass rewrites keyword spellings (and domain-vocabulary
//! identifiers) to their canonical forms before parsing. Ambiguities are
//! reported, never silently resolved: if a vocabulary mapping lands on a
//! name the module also uses directly, or two localized names map to the
//! same canonical identifier, that is an `E007`.

use aster_common::diag::Diagnostics;
use aster_common::token::{Token, TokenKind};
use aster_lexer::lexicon::{Lexicon, WordClass};
use rustc_hash::{FxHashMap, FxHashSet};

/// Normalize a token stream to canonical English spellings.
///
/// English input passes through untouched. Spans always refer to the
/// original source, so diagnostics keep pointing at what the user wrote.
pub fn translate(tokens: Vec<Token>, lexicon: &Lexicon, diags: &mut Diagnostics) -> Vec<Token> {
    if lexicon.is_english() {
        return tokens;
    }

    // Identifiers used verbatim (no vocabulary mapping applies).
    let direct: FxHashSet<String> = tokens
        .iter()
        .filter(|t| matches!(t.kind, TokenKind::Ident | TokenKind::TypeIdent))
        .filter(|t| lexicon.canonical_ident(&t.text).is_none())
        .map(|t| t.text.clone())
        .collect();

    // canonical -> first localized spelling that produced it
    let mut mapped: FxHashMap<String, String> = FxHashMap::default();

    let mut out = Vec::with_capacity(tokens.len());
    for mut tok in tokens {
        match tok.kind {
            TokenKind::Keyword => {
                if let Some(canonical) = lexicon.canonical_keyword(&tok.text) {
                    tok.text = canonical.to_string();
                }
            }
            TokenKind::Bool => {
                tok.text = match lexicon.classify(&tok.text) {
                    WordClass::Bool(true) => "true".to_string(),
                    _ => "false".to_string(),
                };
            }
            TokenKind::Ident | TokenKind::TypeIdent => {
                if let Some(canonical) = lexicon.canonical_ident(&tok.text) {
                    if direct.contains(canonical) {
                        diags.emit(
                            "E007",
                            tok.span,
                            &[
                                ("localized", tok.text.clone()),
                                ("canonical", canonical.to_string()),
                            ],
                        );
                    }
                    match mapped.get(canonical) {
                        Some(existing) if existing != &tok.text => {
                            diags.emit(
                                "E007",
                                tok.span,
                                &[
                                    ("localized", tok.text.clone()),
                                    ("canonical", canonical.to_string()),
                                ],
                            );
                        }
                        Some(_) => {}
                        None => {
                            mapped.insert(canonical.to_string(), tok.text.clone());
                        }
                    }
                    tok.text = canonical.to_string();
                }
            }
            _ => {}
        }
        out.push(tok);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use aster_lexer::lexicon;

    fn toy_lexicon() -> Lexicon {
        let mut spellings = FxHashMap::default();
        spellings.insert("modul".to_string(), "module".to_string());
        spellings.insert("regel".to_string(), "rule".to_string());
        spellings.insert("gib".to_string(), "return".to_string());
        spellings.insert("gegeben".to_string(), "given".to_string());
        spellings.insert("liefert".to_string(), "produce".to_string());
        let mut vocabulary = FxHashMap::default();
        vocabulary.insert("kunde".to_string(), "customer".to_string());
        vocabulary.insert("kaeufer".to_string(), "customer".to_string());
        Lexicon::with_spellings("de-toy", spellings, vocabulary)
    }

    fn lex(src: &str, lexicon: &Lexicon) -> Vec<Token> {
        let mut diags = Diagnostics::new();
        let tokens = aster_lexer::lex(src, lexicon, &mut diags);
        assert!(diags.is_empty());
        tokens
    }

    #[test]
    fn english_passes_through() {
        let en = lexicon::Lexicon::english();
        let tokens = lex("Module demo.\n", &en);
        let mut diags = Diagnostics::new();
        let translated = translate(tokens.clone(), &en, &mut diags);
        assert_eq!(translated, tokens);
    }

    #[test]
    fn keywords_are_normalized() {
        let de = toy_lexicon();
        let tokens = lex("Modul demo.\nRegel f gegeben x: Text, liefert Text: Gib x.\n", &de);
        let mut diags = Diagnostics::new();
        let translated = translate(tokens, &de, &mut diags);
        assert!(diags.is_empty());
        let keywords: Vec<&str> = translated
            .iter()
            .filter(|t| t.kind == TokenKind::Keyword)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(
            keywords,
            vec!["module", "rule", "given", "produce", "return"]
        );
    }

    #[test]
    fn vocabulary_identifiers_are_normalized() {
        let de = toy_lexicon();
        let tokens = lex("Modul demo.\nRegel f gegeben kunde: Text, liefert Text: Gib kunde.\n", &de);
        let mut diags = Diagnostics::new();
        let translated = translate(tokens, &de, &mut diags);
        assert!(diags.is_empty());
        assert!(translated
            .iter()
            .any(|t| t.kind == TokenKind::Ident && t.text == "customer"));
        assert!(!translated.iter().any(|t| t.text == "kunde"));
    }

    #[test]
    fn collision_with_direct_identifier_is_reported() {
        let de = toy_lexicon();
        // `customer` is used verbatim AND produced by mapping `kunde`.
        let tokens = lex("Regel f gegeben kunde: Text and customer: Text, liefert Text: Gib kunde.\n", &de);
        let mut diags = Diagnostics::new();
        translate(tokens, &de, &mut diags);
        let entries = diags.finish();
        assert!(entries.iter().any(|d| d.code == "E007"), "{entries:?}");
    }

    #[test]
    fn two_spellings_for_one_canonical_are_reported() {
        let de = toy_lexicon();
        let tokens = lex("Regel f gegeben kunde: Text and kaeufer: Text, liefert Text: Gib kunde.\n", &de);
        let mut diags = Diagnostics::new();
        translate(tokens, &de, &mut diags);
        let entries = diags.finish();
        assert!(entries.iter().any(|d| d.code == "E007"), "{entries:?}");
    }
}
