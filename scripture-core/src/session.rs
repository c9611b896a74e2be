use crate::chapter::{ChapterNavigator, ChapterView};
use crate::config::Category;
use crate::error::{LoadError, Result};
use crate::loader::{FetchOutcome, Loader};
use crate::pagination::Paginator;
use crate::parser::parse_corpus;
use crate::search::{search, ActiveCategories, FoldedPassages, MatchTier};
use crate::snapshot::{SnapshotKey, SnapshotStore};
use crate::text_utils::highlight;
use crate::{ParsedCorpus, Passage};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

pub const SUGGESTION_LIMIT: usize = 15;
pub const DEFAULT_LEGAL_TEXT: &str = "Standard Works Data.";
/// Toggling a category re-runs the last query only when it is longer than this.
pub const RESEARCH_MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Ready { passages: usize },
    /// Nothing was parsed; `missing` lists the files that failed to load.
    Empty { missing: Vec<String> },
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadStatus::Idle => write!(f, "Not loaded."),
            LoadStatus::Loading => write!(f, "Loading Library..."),
            LoadStatus::Ready { .. } => write!(f, "Ready to search."),
            LoadStatus::Empty { missing } if missing.is_empty() => write!(f, "Error: no passages found."),
            LoadStatus::Empty { missing } => write!(f, "Error: {} not found.", missing.join(", ")),
        }
    }
}

/// Markers placed around highlighted query occurrences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlighter {
    pub prefix: String,
    pub suffix: String,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self { prefix: "**".into(), suffix: "**".into() }
    }
}

/// One revealed search result as handed to the presentation layer.
#[derive(Serialize, Debug, Clone)]
pub struct SearchHit<'a> {
    #[serde(flatten)]
    pub passage: &'a Passage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<&'a str>,
    pub tier: MatchTier,
    pub snippet: String,
}

/// Owns the loaded corpus and all per-user state: filter, current query, pagination cursor
/// and chapter pointer.
#[derive(Debug)]
pub struct Session {
    categories: Vec<Category>,
    corpus: ParsedCorpus,
    folded: FoldedPassages,
    status: LoadStatus,
    load_errors: Vec<(String, LoadError)>,
    active: ActiveCategories,
    query: String,
    reference_matches: usize,
    results: Paginator<usize>,
    navigator: ChapterNavigator,
    highlighter: Highlighter,
}

impl Session {
    pub fn new(categories: Vec<Category>) -> Self {
        let active = ActiveCategories::all(&categories);
        Self {
            categories,
            corpus: ParsedCorpus::default(),
            folded: FoldedPassages::default(),
            status: LoadStatus::Idle,
            load_errors: Vec::new(),
            active,
            query: String::new(),
            reference_matches: 0,
            results: Paginator::default(),
            navigator: ChapterNavigator::default(),
            highlighter: Highlighter::default(),
        }
    }

    pub fn with_highlighter(mut self, h: Highlighter) -> Self {
        self.highlighter = h;
        self
    }

    /// Loads the corpus through `loader`, preferring a matching snapshot from `store`.
    /// The snapshot is keyed by per-file stamps, and only a load where every file
    /// succeeded is written back.
    pub fn load(&mut self, loader: &Loader, store: Option<&dyn SnapshotStore>) -> Result<&LoadStatus> {
        self.begin_load()?;
        let cache = store.and_then(|s| {
            let Some(stamps) = loader.stamp_all(&self.categories) else {
                tracing::debug!("corpus files cannot be stamped; snapshot skipped");
                return None;
            };
            Some((s, SnapshotKey::for_config(&self.categories, &loader.base().describe(), &stamps)))
        });
        if let Some(corpus) = cache.as_ref().and_then(|(s, key)| s.load_snapshot(key)) {
            tracing::debug!(passages = corpus.passages.len(), "corpus restored from snapshot");
            self.install(corpus, Vec::new());
            return Ok(&self.status);
        }
        let outcome = loader.fetch_all(&self.categories);
        self.finish_fetch(outcome);
        if let (Some((store, key)), LoadStatus::Ready { .. }) = (&cache, &self.status) {
            if !self.load_errors.is_empty() {
                tracing::debug!(failed_files = self.load_errors.len(), "partial load; snapshot not saved");
            } else if let Err(e) = store.save_snapshot(key, &self.corpus) {
                tracing::warn!(error = %e, "failed to save corpus snapshot");
            }
        }
        Ok(&self.status)
    }

    /// Loads from already-fetched file contents keyed by category file name.
    pub fn load_files(&mut self, files: HashMap<String, String>) -> Result<&LoadStatus> {
        self.begin_load()?;
        self.finish_fetch(FetchOutcome { files, errors: Vec::new() });
        Ok(&self.status)
    }

    fn begin_load(&mut self) -> Result<()> {
        if self.status == LoadStatus::Loading {
            return Err(LoadError::AlreadyLoading);
        }
        self.status = LoadStatus::Loading;
        Ok(())
    }

    fn finish_fetch(&mut self, outcome: FetchOutcome) {
        let corpus = parse_corpus(&outcome.files, &self.categories);
        let mut errors = outcome.errors;
        // Files that were fetched but yielded nothing still count as missing.
        if corpus.is_empty() {
            for c in &self.categories {
                if outcome.files.contains_key(&c.file) && !errors.iter().any(|(f, _)| f == &c.file) {
                    errors.push((c.file.clone(), LoadError::InvalidSource(format!("{} has no passages", c.file))));
                }
            }
        }
        self.install(corpus, errors);
    }

    fn install(&mut self, corpus: ParsedCorpus, errors: Vec<(String, LoadError)>) {
        self.status = if corpus.is_empty() {
            LoadStatus::Empty { missing: errors.iter().map(|(f, _)| f.clone()).collect() }
        } else {
            LoadStatus::Ready { passages: corpus.passages.len() }
        };
        tracing::info!(
            passages = corpus.passages.len(),
            words = corpus.vocabulary.len(),
            chapters = corpus.chapters.len(),
            failed_files = errors.len(),
            "corpus loaded"
        );
        self.folded = FoldedPassages::build(&corpus.passages);
        self.corpus = corpus;
        self.load_errors = errors;
        self.query.clear();
        self.reference_matches = 0;
        self.results.reset(Vec::new());
        self.navigator.reset();
    }

    pub fn status(&self) -> &LoadStatus { &self.status }
    pub fn load_errors(&self) -> &[(String, LoadError)] { &self.load_errors }
    pub fn corpus(&self) -> &ParsedCorpus { &self.corpus }
    pub fn categories(&self) -> &[Category] { &self.categories }
    pub fn active(&self) -> &ActiveCategories { &self.active }
    pub fn query(&self) -> &str { &self.query }

    pub fn legal_text(&self) -> &str {
        self.corpus.legal_text.as_deref().unwrap_or(DEFAULT_LEGAL_TEXT)
    }

    pub fn category_name(&self, id: &str) -> Option<&str> {
        self.categories.iter().find(|c| c.id == id).map(|c| c.name.as_str())
    }

    pub fn passage(&self, id: usize) -> Option<&Passage> {
        self.corpus.passage(id)
    }

    pub fn chapters(&self) -> &[String] {
        self.corpus.chapters.ids()
    }

    pub fn suggest(&self, prefix: &str) -> Vec<&str> {
        self.corpus.vocabulary.suggest(prefix, SUGGESTION_LIMIT)
    }

    /// Runs a new search and rewinds pagination. An empty query is ignored and returns `None`.
    pub fn search(&mut self, query: &str) -> Option<usize> {
        if query.is_empty() {
            return None;
        }
        let results = search(&self.corpus.passages, &self.folded, query, &self.active);
        self.query = query.to_string();
        self.reference_matches = (0..results.len())
            .take_while(|&i| results.tier_of(i) == MatchTier::Reference)
            .count();
        let total = results.len();
        self.results.reset(results.into_hits());
        tracing::debug!(query, total, "search");
        Some(total)
    }

    /// Enables or disables a category; `None` for an unknown id.
    /// Re-runs the current query when it is long enough.
    pub fn toggle_category(&mut self, id: &str) -> Option<bool> {
        if !self.categories.iter().any(|c| c.id == id) {
            return None;
        }
        let now = self.active.toggle(id);
        if self.query.chars().count() > RESEARCH_MIN_QUERY_CHARS {
            let q = self.query.clone();
            self.search(&q);
        }
        Some(now)
    }

    pub fn set_active(&mut self, active: ActiveCategories) {
        self.active = active;
    }

    /// The next batch of results, highlighted. Empty when nothing is left.
    pub fn reveal_next_batch(&mut self) -> Vec<SearchHit<'_>> {
        let start = self.results.revealed();
        let batch = self.results.next_batch().to_vec();
        batch
            .into_iter()
            .enumerate()
            .filter_map(|(i, idx)| {
                let p = self.corpus.passages.get(idx)?;
                let (snippet, _) = highlight(&p.text, &self.query, &self.highlighter.prefix, &self.highlighter.suffix);
                let tier = if start + i < self.reference_matches { MatchTier::Reference } else { MatchTier::Text };
                Some(SearchHit {
                    passage: p,
                    category: p.source.as_deref().and_then(|s| self.category_name(s)),
                    tier,
                    snippet,
                })
            })
            .collect()
    }

    pub fn has_more(&self) -> bool { self.results.has_more() }
    pub fn remaining(&self) -> usize { self.results.remaining() }
    pub fn total_results(&self) -> usize { self.results.total() }
    pub fn revealed(&self) -> usize { self.results.revealed() }

    /// Opens a chapter for reading; unknown chapters leave the navigator untouched.
    pub fn view_chapter(&mut self, chapter_id: &str) -> Option<ChapterView> {
        let pos = self.navigator.open(&self.corpus.chapters, chapter_id)?;
        Some(ChapterView::assemble(&self.corpus, chapter_id, pos))
    }

    /// Steps through the chapter index; `None` when the move is out of range.
    pub fn navigate(&mut self, delta: isize) -> Option<ChapterView> {
        let pos = self.navigator.navigate(&self.corpus.chapters, delta)?;
        let id = self.corpus.chapters.get(pos)?;
        Some(ChapterView::assemble(&self.corpus, id, pos))
    }

    /// The chapter currently open, if any.
    pub fn current_chapter(&self) -> Option<ChapterView> {
        let pos = self.navigator.position()?;
        let id = self.corpus.chapters.get(pos)?;
        Some(ChapterView::assemble(&self.corpus, id, pos))
    }

    pub fn chapter_position(&self) -> Option<usize> { self.navigator.position() }
    pub fn can_go_back(&self) -> bool { self.navigator.can_go_back() }
    pub fn can_go_forward(&self) -> bool { self.navigator.can_go_forward(&self.corpus.chapters) }
}
