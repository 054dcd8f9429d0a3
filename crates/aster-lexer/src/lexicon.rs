//! Lexicons and the lexicon registry.
//!
//! A lexicon records keyword spellings, punctuation rules, and identifier
//! mappings for one surface language. The lexer consults the active
//! lexicon to classify words; the keyword translator uses it to normalize
//! non-English spellings to canonical English before parsing.
//!
//! The registry is process-wide and read-mostly: lexicons register at
//! startup and are only mutated through the test hook.

use std::sync::{Arc, OnceLock, RwLock};

use rustc_hash::{FxHashMap, FxHashSet};

/// The canonical (English) keyword set, lowercase.
pub const KEYWORDS: &[&str] = &[
    // declarations
    "module", "use", "define", "rule",
    // headers
    "given", "produce", "has", "one", "of", "as", "using", "it", "performs",
    // statements
    "return", "let", "be", "if", "then", "otherwise", "match", "when",
    "start", "wait", "for", "async", "try", "catch", "workflow",
    // constraints
    "required", "between", "at", "least", "most", "matching", "pattern",
    // connectives and operators
    "and", "or", "not", "with", "to", "plus", "minus", "times", "divided",
    "by", "equals", "less", "greater", "than",
    // literals and sugar
    "ok", "err", "some", "none", "true", "false", "nothing",
];

/// How the lexicon classifies a word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordClass {
    /// A keyword; carries the canonical English spelling.
    Keyword(String),
    /// `true` or `false` (in canonical spelling).
    Bool(bool),
    /// Lowercase-initial identifier.
    Ident,
    /// Uppercase-initial identifier.
    TypeIdent,
}

/// Keyword spellings and identifier mappings for one surface language.
#[derive(Debug, Clone)]
pub struct Lexicon {
    pub name: String,
    /// Canonical keyword set (always the English one).
    keywords: FxHashSet<String>,
    /// Localized lowercase spelling -> canonical keyword. Empty for English.
    spellings: FxHashMap<String, String>,
    /// Localized identifier -> canonical ASCII identifier (round-trippable
    /// domain vocabulary). Empty for English.
    vocabulary: FxHashMap<String, String>,
}

impl Lexicon {
    /// The default English lexicon.
    pub fn english() -> Lexicon {
        Lexicon {
            name: "en".to_string(),
            keywords: KEYWORDS.iter().map(|k| k.to_string()).collect(),
            spellings: FxHashMap::default(),
            vocabulary: FxHashMap::default(),
        }
    }

    /// Build a lexicon for another surface language.
    ///
    /// `spellings` maps localized keyword spellings (lowercase) to
    /// canonical English keywords; `vocabulary` maps localized identifiers
    /// to canonical ASCII identifiers.
    pub fn with_spellings(
        name: impl Into<String>,
        spellings: FxHashMap<String, String>,
        vocabulary: FxHashMap<String, String>,
    ) -> Lexicon {
        Lexicon {
            name: name.into(),
            keywords: KEYWORDS.iter().map(|k| k.to_string()).collect(),
            spellings,
            vocabulary,
        }
    }

    pub fn is_english(&self) -> bool {
        self.spellings.is_empty() && self.vocabulary.is_empty()
    }

    /// Classify a word. Keyword lookup is case-insensitive so sentence
    /// capitalization (`Module` vs `module`) does not change meaning.
    pub fn classify(&self, word: &str) -> WordClass {
        let lower = word.to_lowercase();
        let canonical = match self.spellings.get(&lower) {
            Some(canonical) => Some(canonical.as_str()),
            None if self.keywords.contains(&lower) => Some(lower.as_str()),
            None => None,
        };
        if let Some(canonical) = canonical {
            return match canonical {
                "true" => WordClass::Bool(true),
                "false" => WordClass::Bool(false),
                _ => WordClass::Keyword(canonical.to_string()),
            };
        }
        if word.chars().next().is_some_and(char::is_uppercase) {
            WordClass::TypeIdent
        } else {
            WordClass::Ident
        }
    }

    /// The canonical keyword for a localized spelling, if any.
    pub fn canonical_keyword(&self, word: &str) -> Option<&str> {
        let lower = word.to_lowercase();
        self.spellings
            .get(&lower)
            .map(String::as_str)
            .or_else(|| self.keywords.get(&lower).map(String::as_str))
    }

    /// The canonical identifier for a localized vocabulary entry, if any.
    pub fn canonical_ident(&self, ident: &str) -> Option<&str> {
        self.vocabulary.get(ident).map(String::as_str)
    }
}

// ── Registry ───────────────────────────────────────────────────────────

fn registry() -> &'static RwLock<FxHashMap<String, Arc<Lexicon>>> {
    static REGISTRY: OnceLock<RwLock<FxHashMap<String, Arc<Lexicon>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut map = FxHashMap::default();
        let english = Arc::new(Lexicon::english());
        map.insert(english.name.clone(), english);
        RwLock::new(map)
    })
}

/// Register a lexicon. Later registrations replace earlier ones with the
/// same name. Intended for startup only.
pub fn register(lexicon: Lexicon) {
    registry()
        .write()
        .unwrap()
        .insert(lexicon.name.clone(), Arc::new(lexicon));
}

/// Look up a registered lexicon by name.
pub fn get(name: &str) -> Option<Arc<Lexicon>> {
    registry().read().unwrap().get(name).cloned()
}

/// The default English lexicon (always registered).
pub fn english() -> Arc<Lexicon> {
    get("en").expect("English lexicon is registered at init")
}

/// Reset the registry to only the English lexicon. Test hook only.
pub fn reset_for_testing() {
    let mut map = registry().write().unwrap();
    map.clear();
    let english = Arc::new(Lexicon::english());
    map.insert(english.name.clone(), english);
}
