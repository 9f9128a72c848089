//! Locale filter.
//!
//! A candidate matches when its lowercased label contains the lowercased locale token, or
//! when the token is a known short code and one of that code's aliases appears in the
//! label. Aliases are plain substrings, so short ones such as `de` also hit inside longer
//! words; that mirrors how directory labels are written in practice.

use sr_types::CandidateRecord;
use std::collections::BTreeMap;

const BUILTIN_ALIASES: &[(&str, &[&str])] = &[
    ("uk", &["united kingdom", "gb"]),
    ("us", &["united states", "usa"]),
    ("nl", &["netherlands", "nl"]),
    ("de", &["germany", "de"]),
    ("fr", &["france", "fr"]),
    ("ca", &["canada", "ca"]),
    ("jp", &["japan", "jp"]),
    ("sg", &["singapore", "sg"]),
    ("pl", &["poland", "pl"]),
    ("es", &["spain", "es"]),
    ("it", &["italy", "it"]),
    ("au", &["australia", "au"]),
    ("nz", &["new zealand", "nz"]),
];

/// Short code → alias substrings. Keys and aliases are stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleTable {
    aliases: BTreeMap<String, Vec<String>>,
}

impl Default for LocaleTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LocaleTable {
    /// Table with no codes; only verbatim label matches apply.
    pub fn empty() -> Self {
        Self {
            aliases: BTreeMap::new(),
        }
    }

    /// The built-in country code table.
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for (code, aliases) in BUILTIN_ALIASES {
            table.add_aliases(code, aliases.iter().copied());
        }
        table
    }

    /// Append aliases for `code`, creating the entry if needed. Duplicates are ignored.
    pub fn add_aliases<I, S>(&mut self, code: &str, aliases: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let code = code.trim().to_lowercase();
        if code.is_empty() {
            return;
        }
        let entry = self.aliases.entry(code).or_default();
        for alias in aliases {
            let alias = alias.as_ref().trim().to_lowercase();
            if !alias.is_empty() && !entry.contains(&alias) {
                entry.push(alias);
            }
        }
    }

    pub fn aliases(&self, code: &str) -> Option<&[String]> {
        self.aliases.get(&code.to_lowercase()).map(Vec::as_slice)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.aliases.keys().map(String::as_str)
    }

    /// `locale` must already be trimmed and lowercased.
    fn matches(&self, label: &str, locale: &str) -> bool {
        if label.is_empty() {
            return false;
        }
        let label = label.to_lowercase();
        if label.contains(locale) {
            return true;
        }
        self.aliases
            .get(locale)
            .is_some_and(|aliases| aliases.iter().any(|a| label.contains(a.as_str())))
    }
}

/// Keep the candidates whose label matches `locale`. An empty locale keeps everything.
pub fn filter_by_locale(
    candidates: &[CandidateRecord],
    locale: &str,
    table: &LocaleTable,
) -> Vec<CandidateRecord> {
    let locale = locale.trim().to_lowercase();
    if locale.is_empty() {
        return candidates.to_vec();
    }
    candidates
        .iter()
        .filter(|c| table.matches(&c.label, &locale))
        .cloned()
        .collect()
}
