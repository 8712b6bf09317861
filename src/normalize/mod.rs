//! Name normalization shared by every matching stage.
//!
//! Boundary names, record fields and notice titles are all compared through
//! the same [`Normalizer`], so casing and punctuation rules live here only.

use std::sync::LazyLock;

use unicode_normalization::UnicodeNormalization;

/// Generic administrative words dropped from BLM office names.
const GENERIC_TOKENS: &[&str] = &["FIELD", "DISTRICT", "STATE", "OFFICE", "FO", "DO"];

/// Generic multi-word suffixes dropped from USFS unit names.
const GENERIC_PHRASES: &[&str] = &["NATIONAL FOREST", "NATIONAL FORESTS"];

static DEFAULT: LazyLock<Normalizer> = LazyLock::new(Normalizer::default);

/// Normalize with the default generic-token set.
///
/// ```
/// assert_eq!(cairn::normalize("Eugene Field Office"), "EUGENE");
/// assert_eq!(cairn::normalize("Mt. Hood National Forest"), "MT HOOD");
/// ```
pub fn normalize(text: &str) -> String {
    DEFAULT.normalize(text)
}

/// Canonicalizes administrative-unit names into comparison keys.
///
/// Output is upper-case ASCII letters separated by single spaces, with the
/// generic words removed. Normalizing an already normalized key is a no-op.
#[derive(Debug, Clone)]
pub struct Normalizer {
    /// Word sequences to drop, longest first
    generic: Vec<Vec<String>>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::empty()
            .with_tokens(GENERIC_TOKENS.iter().copied())
            .with_tokens(GENERIC_PHRASES.iter().copied())
    }
}

impl Normalizer {
    /// A normalizer that only folds case and strips punctuation.
    pub fn empty() -> Self {
        Self {
            generic: Vec::new(),
        }
    }

    /// Add generic words or phrases. Entries go through the same folding as
    /// names, so `"ranger district"` and `"RANGER DISTRICT"` are equivalent.
    pub fn with_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for token in tokens {
            let words = fold_words(token.as_ref());
            if !words.is_empty() && !self.generic.contains(&words) {
                self.generic.push(words);
            }
        }
        self.generic.sort_by(|a, b| b.len().cmp(&a.len()));
        self
    }

    pub fn normalize(&self, text: &str) -> String {
        let mut words = fold_words(text);

        // Removing one phrase can bring the words of another together
        // ("NATIONAL FIELD FOREST"), so strip until nothing changes.
        loop {
            let before = words.len();
            words = self.strip_generic(words);
            if words.len() == before {
                break;
            }
        }

        words.join(" ")
    }

    fn strip_generic(&self, words: Vec<String>) -> Vec<String> {
        let mut kept = Vec::with_capacity(words.len());
        let mut i = 0;
        'outer: while i < words.len() {
            for phrase in &self.generic {
                let end = i + phrase.len();
                if end <= words.len() && words[i..end] == phrase[..] {
                    i = end;
                    continue 'outer;
                }
            }
            kept.push(words[i].clone());
            i += 1;
        }
        kept
    }
}

/// Decompose, upper-case, keep A-Z, and split into words.
///
/// Word separators (whitespace, dashes, slashes, commas...) become word
/// breaks; any other character is dropped without a break, so `"St. John's"`
/// and `"St John's"` fold to the same words.
fn fold_words(text: &str) -> Vec<String> {
    let mut folded = String::with_capacity(text.len());
    for c in text.nfkd() {
        if is_separator(c) {
            folded.push(' ');
            continue;
        }
        for upper in c.to_uppercase() {
            if upper.is_ascii_uppercase() {
                folded.push(upper);
            }
        }
    }
    folded.split_whitespace().map(str::to_string).collect()
}

fn is_separator(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            '-' | '\u{2010}'..='\u{2015}' | '/' | '\\' | '_' | ',' | ';' | ':' | '|' | '&' | '+'
                | '(' | ')' | '[' | ']' | '{' | '}'
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_punctuation_invariance() {
        let expected = normalize("Eugene Field Office");
        assert_eq!(expected, "EUGENE");
        assert_eq!(normalize("EUGENE FIELD OFFICE"), expected);
        assert_eq!(normalize("eugene, field-office!"), expected);
    }

    #[test]
    fn test_apostrophes_and_periods_are_removed() {
        assert_eq!(normalize("St. John's"), normalize("St John's"));
        assert_eq!(normalize("St. John's"), "ST JOHNS");
    }

    #[test]
    fn test_diacritics_are_folded() {
        assert_eq!(normalize("Cañon City Field Office"), "CANON CITY");
        assert_eq!(normalize("Montréal"), "MONTREAL");
    }

    #[test]
    fn test_digits_are_dropped() {
        assert_eq!(normalize("District 9 Office"), "");
        assert_eq!(normalize("Unit 42b"), "UNIT B");
    }

    #[test]
    fn test_generic_tokens_only_match_whole_words() {
        assert_eq!(normalize("Fordham Office Park"), "FORDHAM PARK");
        assert_eq!(normalize("Officer Fordo Statesman"), "OFFICER FORDO STATESMAN");
        assert_eq!(normalize("Lakeview District Office"), "LAKEVIEW");
        assert_eq!(normalize("Arcata FO"), "ARCATA");
    }

    #[test]
    fn test_forest_suffix_is_stripped() {
        assert_eq!(normalize("Deschutes National Forest"), "DESCHUTES");
        assert_eq!(normalize("Ouachita National Forests"), "OUACHITA");
        assert_eq!(normalize("National Grasslands"), "NATIONAL GRASSLANDS");
    }

    #[test]
    fn test_only_generic_words_is_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("State Office"), "");
        assert_eq!(normalize("!!! --- ..."), "");
    }

    #[test]
    fn test_whitespace_is_collapsed() {
        assert_eq!(normalize("  Grand   Junction\t\nField  Office "), "GRAND JUNCTION");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "Eugene Field Office",
            "Mt. Hood National Forest",
            "National Field Forest Office",
            "St. John's",
            "Cañon City",
            "",
            "do DO Do dO",
            "Fremont-Winema National Forests",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_removal_reaches_fixpoint() {
        assert_eq!(normalize("National Field Forest"), "");
    }

    #[test]
    fn test_custom_tokens() {
        let normalizer = Normalizer::default().with_tokens(["ranger district", "RA"]);
        assert_eq!(normalizer.normalize("Crescent Ranger District"), "CRESCENT");
        assert_eq!(normalizer.normalize("Vale RA"), "VALE");
        assert_eq!(Normalizer::empty().normalize("Vale Field Office"), "VALE FIELD OFFICE");
    }
}
