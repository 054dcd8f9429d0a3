//! Qualified-name interning.
//!
//! The typechecker's effect and capability checks compare fully qualified
//! names (`module.func`) in a hot loop; interning turns those comparisons
//! into integer equality. The table is process-wide and append-only:
//! interned names are never removed, so handles stay valid for the
//! lifetime of the process.

use std::fmt;
use std::sync::{Mutex, OnceLock};

use rustc_hash::FxHashMap;

/// A 4-byte handle to an interned string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(u32);

impl Name {
    /// Intern a string, returning its handle. The same string always
    /// yields the same handle.
    pub fn intern(text: &str) -> Name {
        table().lock().unwrap().intern(text)
    }

    /// The interned string. O(1) table lookup.
    pub fn as_str(self) -> &'static str {
        table().lock().unwrap().strings[self.0 as usize]
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct Table {
    index: FxHashMap<&'static str, u32>,
    strings: Vec<&'static str>,
}

impl Table {
    fn intern(&mut self, text: &str) -> Name {
        if let Some(&id) = self.index.get(text) {
            return Name(id);
        }
        // Leak to get a stable 'static str; the set of distinct qualified
        // names in a compilation is bounded.
        let stored: &'static str = Box::leak(text.to_string().into_boxed_str());
        let id = self.strings.len() as u32;
        self.strings.push(stored);
        self.index.insert(stored, id);
        Name(id)
    }
}

fn table() -> &'static Mutex<Table> {
    static TABLE: OnceLock<Mutex<Table>> = OnceLock::new();
    TABLE.get_or_init(|| {
        Mutex::new(Table {
            index: FxHashMap::default(),
            strings: Vec::new(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_string_same_handle() {
        let a = Name::intern("demo.greet");
        let b = Name::intern("demo.greet");
        assert_eq!(a, b);
    }

    #[test]
    fn different_strings_different_handles() {
        let a = Name::intern("demo.alpha");
        let b = Name::intern("demo.beta");
        assert_ne!(a, b);
    }

    #[test]
    fn as_str_round_trips() {
        let name = Name::intern("mod.func");
        assert_eq!(name.as_str(), "mod.func");
        assert_eq!(name.to_string(), "mod.func");
    }
}
