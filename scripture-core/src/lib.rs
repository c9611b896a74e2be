use serde::{Deserialize, Serialize};

pub mod chapter;
pub mod config;
pub mod error;
pub mod index;
pub mod loader;
pub mod pagination;
pub mod parser;
pub mod search;
pub mod session;
pub mod snapshot;
pub mod text_utils;

pub use config::{Category, SourceFormat};
pub use error::{LoadError, Result};
pub use index::{ChapterIndex, Vocabulary};
pub use session::{LoadStatus, SearchHit, Session};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Passage {
    pub id: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source: Option<String>, // category id; absent for single-collection corpora
    #[serde(rename = "ref")]
    pub reference: String,
    pub text: String,
    #[serde(rename = "chapterId")]
    pub chapter_id: String,
}

/// Everything one load produces; replaced wholesale on reload.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ParsedCorpus {
    pub passages: Vec<Passage>,
    pub vocabulary: Vocabulary,
    pub chapters: ChapterIndex,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub legal_text: Option<String>,
}

impl ParsedCorpus {
    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    pub fn passage(&self, id: usize) -> Option<&Passage> {
        self.passages.get(id)
    }

    /// Passages of one chapter, in corpus order.
    pub fn chapter_passages<'a>(&'a self, chapter_id: &'a str) -> impl Iterator<Item = &'a Passage> + 'a {
        self.passages.iter().filter(move |p| p.chapter_id == chapter_id)
    }

    pub fn count_by_source(&self, source: &str) -> usize {
        self.passages
            .iter()
            .filter(|p| p.source.as_deref() == Some(source))
            .count()
    }
}
