use sr_types::CandidateRecord;
use std::collections::BTreeSet;

/// Distinct, sorted country names derived from candidate labels.
///
/// Flags, digits and punctuation are stripped, keeping ASCII letters and whitespace.
pub fn unique_countries(candidates: &[CandidateRecord]) -> Vec<String> {
    candidates
        .iter()
        .filter(|c| !c.label.is_empty())
        .map(|c| clean_label(&c.label))
        .filter(|name| !name.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn clean_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(label: &str) -> CandidateRecord {
        CandidateRecord::new("h", 1, "m", "s", label)
    }

    #[test]
    fn strips_symbols_and_sorts() {
        let out = unique_countries(&[
            rec("🇯🇵 Japan"),
            rec("🇩🇪 Germany #2"),
            rec("Japan"),
            rec(""),
            rec("🇺🇸 ✈️ 123"),
        ]);
        assert_eq!(out, vec!["Germany".to_string(), "Japan".to_string()]);
    }

    #[test]
    fn keeps_inner_whitespace() {
        let out = unique_countries(&[rec("🇬🇧 United Kingdom")]);
        assert_eq!(out, vec!["United Kingdom".to_string()]);
    }
}
