use crate::config::Category;
use crate::text_utils::folded;
use crate::Passage;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;

/// Category ids currently enabled for searching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveCategories {
    ids: BTreeSet<String>,
}

impl ActiveCategories {
    pub fn all(categories: &[Category]) -> Self {
        Self { ids: categories.iter().map(|c| c.id.clone()).collect() }
    }

    pub fn only<I: IntoIterator<Item = S>, S: Into<String>>(ids: I) -> Self {
        Self { ids: ids.into_iter().map(Into::into).collect() }
    }

    /// Passages without a source are always considered.
    pub fn admits(&self, source: Option<&str>) -> bool {
        source.map_or(true, |s| self.ids.contains(s))
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Flips one category; returns whether it is now active.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(|s| s.as_str())
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Reference,
    Text,
}

/// Ordered hits for one query: reference matches first, then text-only matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    hits: Vec<usize>,
    reference_matches: usize,
}

impl SearchResults {
    /// Indices into the searched passage slice.
    pub fn hits(&self) -> &[usize] { &self.hits }
    pub fn len(&self) -> usize { self.hits.len() }
    pub fn is_empty(&self) -> bool { self.hits.is_empty() }

    pub fn tier_of(&self, position: usize) -> MatchTier {
        if position < self.reference_matches { MatchTier::Reference } else { MatchTier::Text }
    }

    pub fn into_hits(self) -> Vec<usize> { self.hits }
}

/// Folded reference and body of every passage, built once per load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoldedPassages {
    entries: Vec<(String, String)>,
}

impl FoldedPassages {
    pub fn build(passages: &[Passage]) -> Self {
        let entries = passages
            .par_iter()
            .map(|p| (folded(&p.reference), folded(&p.text)))
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

/// Case-insensitive literal substring search over references and bodies.
/// `folded_passages` must have been built from `passages`.
pub fn search(
    passages: &[Passage],
    folded_passages: &FoldedPassages,
    query: &str,
    active: &ActiveCategories,
) -> SearchResults {
    if query.is_empty() {
        return SearchResults::default();
    }
    let q = folded(query);
    let mut by_ref = Vec::new();
    let mut by_text = Vec::new();
    for (i, (p, (reference, text))) in passages.iter().zip(&folded_passages.entries).enumerate() {
        if !active.admits(p.source.as_deref()) {
            continue;
        }
        if reference.contains(&q) {
            by_ref.push(i);
        } else if text.contains(&q) {
            by_text.push(i);
        }
    }
    let reference_matches = by_ref.len();
    by_ref.extend(by_text);
    SearchResults { hits: by_ref, reference_matches }
}
