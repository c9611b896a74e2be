use crate::parser::verse_locator;
use crate::{ChapterIndex, ParsedCorpus};
use serde::Serialize;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ChapterVerse {
    pub id: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locator: Option<String>,
    pub text: String,
}

/// One chapter's passages, in corpus order.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ChapterView {
    #[serde(rename = "chapterId")]
    pub chapter_id: String,
    pub position: usize,
    pub verses: Vec<ChapterVerse>,
}

impl ChapterView {
    pub fn assemble(corpus: &ParsedCorpus, chapter_id: &str, position: usize) -> Self {
        let verses = corpus
            .chapter_passages(chapter_id)
            .map(|p| ChapterVerse {
                id: p.id,
                locator: verse_locator(&p.reference).map(|s| s.to_string()),
                text: p.text.clone(),
            })
            .collect();
        Self { chapter_id: chapter_id.to_string(), position, verses }
    }

    /// Joins the verses with `separator`, optionally prefixing each with its verse number.
    pub fn render(&self, separator: &str, numbered: bool) -> String {
        self.verses
            .iter()
            .map(|v| match (&v.locator, numbered) {
                (Some(n), true) => format!("{} {}", n, v.text),
                _ => v.text.clone(),
            })
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// Tracks the open chapter within the chapter index.
#[derive(Debug, Clone, Default)]
pub struct ChapterNavigator {
    current: Option<usize>,
}

impl ChapterNavigator {
    pub fn position(&self) -> Option<usize> {
        self.current
    }

    pub fn reset(&mut self) {
        self.current = None;
    }

    /// Opens `chapter_id`; an unknown chapter leaves the pointer unchanged.
    pub fn open(&mut self, index: &ChapterIndex, chapter_id: &str) -> Option<usize> {
        let pos = index.position(chapter_id)?;
        self.current = Some(pos);
        Some(pos)
    }

    /// Moves by `delta`; a move outside the index, or with no chapter open, is a no-op.
    pub fn navigate(&mut self, index: &ChapterIndex, delta: isize) -> Option<usize> {
        let cur = self.current?;
        let next = cur.checked_add_signed(delta)?;
        if next >= index.len() {
            return None;
        }
        self.current = Some(next);
        Some(next)
    }

    pub fn can_go_back(&self) -> bool {
        self.current.is_some_and(|c| c > 0)
    }

    pub fn can_go_forward(&self, index: &ChapterIndex) -> bool {
        self.current.is_some_and(|c| c + 1 < index.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::standard_works;
    use crate::parser::parse_corpus;
    use std::collections::HashMap;

    fn corpus() -> ParsedCorpus {
        let text = "\
Genesis 1:1 In the beginning God created the heaven and the earth.
Genesis 1:2 And the earth was without form, and void.
Genesis 2:1 Thus the heavens and the earth were finished.
Exodus 1:1 Now these are the names of the children of Israel.
";
        let mut m = HashMap::new();
        m.insert("standard_works.txt".to_string(), text.to_string());
        parse_corpus(&m, &standard_works())
    }

    #[test]
    fn chapter_assembled_in_order_with_numbers() {
        let c = corpus();
        let v = ChapterView::assemble(&c, "Genesis 1", 0);
        assert_eq!(v.verses.len(), 2);
        assert_eq!(
            v.render("\n\n", true),
            "1 In the beginning God created the heaven and the earth.\n\n2 And the earth was without form, and void."
        );
        assert_eq!(
            v.render(" ", false),
            "In the beginning God created the heaven and the earth. And the earth was without form, and void."
        );
    }

    #[test]
    fn navigation_is_clamped() {
        let c = corpus();
        let mut nav = ChapterNavigator::default();
        assert_eq!(nav.position(), None);
        assert_eq!(nav.navigate(&c.chapters, 1), None);

        assert_eq!(nav.open(&c.chapters, "Genesis 1"), Some(0));
        assert_eq!(nav.navigate(&c.chapters, -1), None);
        assert_eq!(nav.position(), Some(0));
        assert!(!nav.can_go_back());

        assert_eq!(nav.navigate(&c.chapters, 1), Some(1));
        assert_eq!(nav.navigate(&c.chapters, 1), Some(2));
        assert!(!nav.can_go_forward(&c.chapters));
        assert_eq!(nav.navigate(&c.chapters, 1), None);
        assert_eq!(nav.position(), Some(2));
        assert_eq!(nav.navigate(&c.chapters, -2), Some(0));
    }

    #[test]
    fn unknown_chapter_is_noop() {
        let c = corpus();
        let mut nav = ChapterNavigator::default();
        nav.open(&c.chapters, "Exodus 1");
        assert_eq!(nav.open(&c.chapters, "Leviticus 9"), None);
        assert_eq!(nav.position(), Some(2));
    }
}
