//! Title matcher: which canonical unit names does a free-text title mention?
//!
//! Every canonical name is tested two ways against the title: its
//! normalized form against the title with only case and punctuation folded
//! (no words removed), and its full case-folded text against the
//! case-folded title. Either is enough. Matching is a
//! plain O(titles x names) scan over names prepared once.

use std::collections::BTreeSet;

use rayon::prelude::*;
use tracing::debug;

use crate::normalize::Normalizer;

#[derive(Debug, Clone)]
struct Candidate {
    name: String,
    /// Normalized form, e.g. "MT HOOD" for "Mt. Hood National Forest"
    simplified: String,
    /// Full name upper-cased, punctuation kept
    folded: String,
}

/// Canonical names prepared for repeated title matching.
#[derive(Debug, Clone)]
pub struct TitleMatcher {
    candidates: Vec<Candidate>,
    /// Case and punctuation only; a title keeps every word
    title_fold: Normalizer,
}

impl TitleMatcher {
    pub fn new<I, S>(canonical_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_normalizer(canonical_names, Normalizer::default())
    }

    pub fn with_normalizer<I, S>(canonical_names: I, normalizer: Normalizer) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let candidates = canonical_names
            .into_iter()
            .map(|name| {
                let name = name.as_ref().trim().to_string();
                Candidate {
                    simplified: normalizer.normalize(&name),
                    folded: name.to_uppercase(),
                    name,
                }
            })
            .filter(|c| !c.name.is_empty())
            .collect();
        Self {
            candidates,
            title_fold: Normalizer::empty(),
        }
    }

    /// Canonical names found in `title`, deduplicated and sorted.
    pub fn match_title(&self, title: &str) -> Vec<String> {
        let normalized = self.title_fold.normalize(title);
        let folded = title.to_uppercase();

        let hits: BTreeSet<&str> = self
            .candidates
            .iter()
            .filter(|c| {
                // An empty simplified form would be contained in every title
                (!c.simplified.is_empty() && normalized.contains(&c.simplified))
                    || folded.contains(&c.folded)
            })
            .map(|c| c.name.as_str())
            .collect();

        debug!("{:?} matched {} names", title, hits.len());
        hits.into_iter().map(str::to_string).collect()
    }

    /// Match many titles in parallel; output order follows `titles`.
    pub fn match_all_par<S>(&self, titles: &[S]) -> Vec<Vec<String>>
    where
        S: AsRef<str> + Sync,
    {
        titles
            .par_iter()
            .map(|title| self.match_title(title.as_ref()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// One-off match of a single title against a list of canonical names
pub fn match_titles<S: AsRef<str>>(title: &str, canonical_names: &[S]) -> Vec<String> {
    TitleMatcher::new(canonical_names).match_title(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_mention_matches_once() {
        let hits = match_titles(
            "Notice concerning the Deschutes National Forest and Deschutes River",
            &["Deschutes National Forest"],
        );
        assert_eq!(hits, vec!["Deschutes National Forest"]);
    }

    #[test]
    fn test_simplified_name_matches() {
        let hits = match_titles(
            "Mt. Hood; Meadows Ski Area Expansion",
            &["Mt. Hood National Forest"],
        );
        assert_eq!(hits, vec!["Mt. Hood National Forest"]);
    }

    #[test]
    fn test_multiple_names_sorted() {
        let names = [
            "Willamette National Forest",
            "Umpqua National Forest",
            "Deschutes National Forest",
        ];
        let title = "Willamette, Deschutes and Umpqua National Forests; Oregon; Travel Management";
        let expected = vec![
            "Deschutes National Forest",
            "Umpqua National Forest",
            "Willamette National Forest",
        ];
        assert_eq!(match_titles(title, &names), expected);

        let mut reversed = names;
        reversed.reverse();
        assert_eq!(match_titles(title, &reversed), expected);
    }

    #[test]
    fn test_duplicate_canonical_names_collapse() {
        let hits = match_titles(
            "Ochoco National Forest grazing permit",
            &["Ochoco National Forest", "Ochoco National Forest"],
        );
        assert_eq!(hits, vec!["Ochoco National Forest"]);
    }

    #[test]
    fn test_generic_words_in_title_are_not_removed() {
        let names = ["Grand Mesa National Forest"];
        assert!(match_titles("Grand State Mesa grazing allotment", &names).is_empty());
        assert!(match_titles("Grand Office Mesa trail work", &names).is_empty());
        assert_eq!(
            match_titles("Grand Mesa travel management", &names),
            vec!["Grand Mesa National Forest"]
        );
    }

    #[test]
    fn test_no_match_is_empty() {
        let hits = match_titles("Agency Information Collection Activities", &["Deschutes National Forest"]);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_empty_simplified_form_uses_full_name_only() {
        let names = ["National Forests"];
        assert!(match_titles("Information collection for recreation fees", &names).is_empty());
        assert_eq!(
            match_titles("Land management plans for National Forests in Region 6", &names),
            vec!["National Forests"]
        );
    }

    #[test]
    fn test_full_name_is_case_insensitive() {
        let hits = match_titles("NEW ZONE ON THE GIFFORD PINCHOT NATIONAL FOREST", &["Gifford Pinchot National Forest"]);
        assert_eq!(hits, vec!["Gifford Pinchot National Forest"]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let matcher = TitleMatcher::new(["Deschutes National Forest", "Ochoco National Forest"]);
        let titles = vec![
            "Deschutes and Ochoco National Forests",
            "Nothing here",
            "Ochoco National Forest",
        ];
        let sequential: Vec<Vec<String>> = titles.iter().map(|t| matcher.match_title(t)).collect();
        assert_eq!(matcher.match_all_par(&titles[..]), sequential);
        assert_eq!(matcher.len(), 2);
    }
}
