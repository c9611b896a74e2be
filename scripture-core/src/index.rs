use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Sorted, distinct body words used for typeahead.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Vocabulary {
    words: Vec<String>,
}

impl Vocabulary {
    pub fn from_words<I: IntoIterator<Item = String>>(words: I) -> Self {
        let mut words: Vec<String> = words.into_iter().map(|w| w.to_lowercase()).collect();
        words.sort();
        words.dedup();
        Self { words }
    }

    pub fn words(&self) -> &[String] { &self.words }
    pub fn len(&self) -> usize { self.words.len() }
    pub fn is_empty(&self) -> bool { self.words.is_empty() }

    pub fn contains(&self, w: &str) -> bool {
        self.words.binary_search_by(|x| x.as_str().cmp(w)).is_ok()
    }

    /// Up to `limit` words starting with `prefix`, in sorted order.
    /// Prefixes shorter than two characters yield nothing.
    pub fn suggest(&self, prefix: &str, limit: usize) -> Vec<&str> {
        let p = prefix.trim().to_lowercase();
        if p.chars().count() < 2 {
            return Vec::new();
        }
        let start = self.words.partition_point(|w| w.as_str() < p.as_str());
        self.words[start..]
            .iter()
            .take_while(|w| w.starts_with(&p))
            .take(limit)
            .map(|w| w.as_str())
            .collect()
    }
}

/// Distinct chapter keys in document order.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ChapterIndex {
    ids: Vec<String>,
    positions: HashMap<String, usize>,
}

impl From<Vec<String>> for ChapterIndex {
    fn from(ids: Vec<String>) -> Self {
        let mut b = IndexBuilder::default();
        for id in &ids {
            b.add_chapter(id);
        }
        b.chapters
    }
}

impl From<ChapterIndex> for Vec<String> {
    fn from(c: ChapterIndex) -> Self { c.ids }
}

impl PartialEq for ChapterIndex {
    fn eq(&self, other: &Self) -> bool { self.ids == other.ids }
}

impl ChapterIndex {
    pub fn position(&self, chapter_id: &str) -> Option<usize> {
        self.positions.get(chapter_id).copied()
    }

    pub fn get(&self, i: usize) -> Option<&str> {
        self.ids.get(i).map(|s| s.as_str())
    }

    pub fn ids(&self) -> &[String] { &self.ids }
    pub fn len(&self) -> usize { self.ids.len() }
    pub fn is_empty(&self) -> bool { self.ids.is_empty() }
}

/// Accumulates words and chapter keys while passages are parsed.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    words: HashSet<String>,
    chapters: ChapterIndex,
}

impl IndexBuilder {
    pub fn add_words<I: IntoIterator<Item = String>>(&mut self, words: I) {
        self.words.extend(words);
    }

    /// Registers a chapter key; only its first sighting fixes its position.
    pub fn add_chapter(&mut self, chapter_id: &str) {
        if self.chapters.positions.contains_key(chapter_id) {
            return;
        }
        let pos = self.chapters.ids.len();
        self.chapters.ids.push(chapter_id.to_string());
        self.chapters.positions.insert(chapter_id.to_string(), pos);
    }

    pub fn finish(self) -> (Vocabulary, ChapterIndex) {
        (Vocabulary::from_words(self.words), self.chapters)
    }
}
