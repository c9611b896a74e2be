use crate::config::{Category, SourceFormat};
use crate::index::IndexBuilder;
use crate::text_utils::{extract_words, truncate_chars};
use crate::{ParsedCorpus, Passage};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

const SYNTHETIC_REFERENCE_CHARS: usize = 30;

fn line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^((?:[1-4]\s)?[A-Za-z\s]+\d+:\d+)\s+(.*)$").unwrap())
}

fn chapter_verse_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+:\d+").unwrap())
}

/// The two supported source layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parser {
    /// `[1-4 ]Book chapter:verse<ws>body`, one passage per line.
    ReferencePrefixed,
    /// Legal header block, then paragraphs separated by blank lines.
    ParagraphHeuristic { header_lines: usize, max_reference_len: usize },
}

impl Parser {
    pub fn for_format(format: &SourceFormat) -> Self {
        match *format {
            SourceFormat::ReferencePrefixed => Parser::ReferencePrefixed,
            SourceFormat::ParagraphHeuristic { header_lines, max_reference_len } => {
                Parser::ParagraphHeuristic { header_lines, max_reference_len }
            }
        }
    }

    /// Parses `text` as the file of `category`, appending passages to `acc`.
    pub fn parse(&self, text: &str, category: &Category, acc: &mut CorpusAccumulator) {
        match *self {
            Parser::ReferencePrefixed => parse_reference_lines(text, category, acc),
            Parser::ParagraphHeuristic { header_lines, max_reference_len } => {
                parse_paragraphs(text, category, header_lines, max_reference_len, acc)
            }
        }
    }
}

/// Chapter key of a line-oriented reference: everything before the last colon.
pub fn chapter_of_reference(reference: &str) -> &str {
    match reference.rfind(':') {
        Some(i) => reference[..i].trim(),
        None => reference.trim(),
    }
}

/// Chapter key of a paragraph reference: everything before the first colon.
pub fn chapter_of_paragraph_reference(reference: &str) -> &str {
    match reference.find(':') {
        Some(i) => reference[..i].trim(),
        None => reference.trim(),
    }
}

/// Verse locator of a reference: the token after its last colon.
pub fn verse_locator(reference: &str) -> Option<&str> {
    let (_, v) = reference.rsplit_once(':')?;
    let v = v.trim();
    (!v.is_empty()).then_some(v)
}

/// Splits one Format-A line into `(reference, body)`.
pub fn split_reference_line(line: &str) -> Option<(&str, &str)> {
    let caps = line_re().captures(line.trim())?;
    let reference = caps.get(1)?.as_str().trim();
    let body = caps.get(2)?.as_str().trim();
    Some((reference, body))
}

fn parse_reference_lines(text: &str, category: &Category, acc: &mut CorpusAccumulator) {
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let Some((reference, body)) = split_reference_line(line) else {
            acc.skipped += 1;
            continue;
        };
        if !category.accepts(reference) {
            continue;
        }
        let chapter = chapter_of_reference(reference).to_string();
        acc.push(category, reference, body, chapter);
    }
}

fn parse_paragraphs(
    text: &str,
    category: &Category,
    header_lines: usize,
    max_reference_len: usize,
    acc: &mut CorpusAccumulator,
) {
    let mut lines = text.lines();
    let header: Vec<&str> = lines.by_ref().take(header_lines).collect();
    if acc.legal_text.is_none() {
        let legal = header.join("\n").trim().to_string();
        if !legal.is_empty() {
            acc.legal_text = Some(legal);
        }
    }

    let mut para: Vec<&str> = Vec::new();
    for line in lines.chain(std::iter::once("")) {
        let t = line.trim();
        if !t.is_empty() {
            para.push(t);
            continue;
        }
        if para.is_empty() {
            continue;
        }
        let first = para[0];
        let (reference, body) = if para.len() > 1
            && first.chars().count() < max_reference_len
            && chapter_verse_re().is_match(first)
        {
            (first.to_string(), para[1..].join(" "))
        } else {
            let whole = para.join(" ");
            (truncate_chars(&whole, SYNTHETIC_REFERENCE_CHARS), whole)
        };
        para.clear();

        if body.trim().is_empty() || reference.is_empty() {
            acc.skipped += 1;
            continue;
        }
        if !category.accepts(&reference) {
            continue;
        }
        let chapter = chapter_of_paragraph_reference(&reference).to_string();
        acc.push(category, &reference, &body, chapter);
    }
}

/// Collects passages and index inputs across every parsed file.
#[derive(Debug, Default)]
pub struct CorpusAccumulator {
    passages: Vec<Passage>,
    index: IndexBuilder,
    legal_text: Option<String>,
    skipped: usize,
}

impl CorpusAccumulator {
    fn push(&mut self, category: &Category, reference: &str, body: &str, chapter_id: String) {
        let text = body.trim().to_string();
        self.index.add_words(extract_words(&text));
        self.index.add_chapter(&chapter_id);
        self.passages.push(Passage {
            id: self.passages.len(),
            source: Some(category.id.clone()),
            reference: reference.to_string(),
            text,
            chapter_id,
        });
    }

    pub fn finish(self) -> ParsedCorpus {
        let (vocabulary, chapters) = self.index.finish();
        ParsedCorpus {
            passages: self.passages,
            vocabulary,
            chapters,
            legal_text: self.legal_text,
        }
    }
}

/// Parses every category against the fetched files, in category order.
/// Categories whose file is missing contribute nothing.
pub fn parse_corpus(files: &HashMap<String, String>, categories: &[Category]) -> ParsedCorpus {
    let mut acc = CorpusAccumulator::default();
    for cat in categories {
        let Some(text) = files.get(&cat.file) else { continue };
        let before = acc.passages.len();
        Parser::for_format(&cat.format).parse(text, cat, &mut acc);
        tracing::debug!(category = %cat.id, passages = acc.passages.len() - before, "parsed category");
    }
    tracing::trace!(skipped = acc.skipped, "lines skipped as noise");
    acc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::standard_works;

    const SAMPLE: &str = "\
THE STANDARD WORKS
Genesis 1:1  In the beginning God created the heaven and the earth.
Genesis 1:2\tAnd the earth was without form, and void.

Genesis 2:1 Thus the heavens and the earth were finished.
John 1:1 In the beginning was the Word.
1 Nephi 3:7 And it came to pass that I, Nephi, said unto my father: I will go and do.
garbage line without reference
";

    fn files(text: &str) -> HashMap<String, String> {
        let mut m = HashMap::new();
        m.insert("standard_works.txt".to_string(), text.to_string());
        m
    }

    #[test]
    fn genesis_line_end_to_end() {
        let c = parse_corpus(&files(SAMPLE), &standard_works());
        let p = &c.passages[0];
        assert_eq!(p.reference, "Genesis 1:1");
        assert_eq!(p.chapter_id, "Genesis 1");
        assert_eq!(p.text, "In the beginning God created the heaven and the earth.");
        assert_eq!(p.source.as_deref(), Some("ot"));
    }

    #[test]
    fn passages_grouped_by_category_order_with_sequential_ids() {
        let c = parse_corpus(&files(SAMPLE), &standard_works());
        let refs: Vec<_> = c.passages.iter().map(|p| (p.id, p.reference.as_str(), p.source.as_deref())).collect();
        assert_eq!(
            refs,
            vec![
                (0, "Genesis 1:1", Some("ot")),
                (1, "Genesis 1:2", Some("ot")),
                (2, "Genesis 2:1", Some("ot")),
                (3, "John 1:1", Some("nt")),
                (4, "1 Nephi 3:7", Some("bom")),
            ]
        );
        assert_eq!(c.chapters.ids(), &["Genesis 1", "Genesis 2", "John 1", "1 Nephi 3"]);
    }

    #[test]
    fn chapter_id_is_reference_before_last_colon() {
        for line in ["Genesis 1:1 a", "1 Nephi 3:7 b", "Song of Solomon 2:4   c", "Psalms 119:105\td"] {
            let (r, _) = split_reference_line(line).unwrap();
            let last = r.rfind(':').unwrap();
            assert_eq!(chapter_of_reference(r), r[..last].trim());
        }
    }

    #[test]
    fn noise_lines_skipped() {
        assert!(split_reference_line("THE STANDARD WORKS").is_none());
        assert!(split_reference_line("Genesis 1:1").is_none());
        assert!(split_reference_line("5 Nephi 1:1 x").is_none());
    }

    #[test]
    fn passage_emitted_once_per_matching_category() {
        let cats = vec![
            Category::new("all", "All", "standard_works.txt", None),
            Category::new("ot", "OT", "standard_works.txt", Some(&["Genesis"])),
        ];
        let c = parse_corpus(&files("Genesis 1:1 In the beginning\n"), &cats);
        assert_eq!(c.passages.len(), 2);
        assert_eq!(c.passages[0].source.as_deref(), Some("all"));
        assert_eq!(c.passages[1].source.as_deref(), Some("ot"));
        assert_eq!(c.chapters.len(), 1);
    }

    #[test]
    fn deterministic() {
        let a = parse_corpus(&files(SAMPLE), &standard_works());
        let b = parse_corpus(&files(SAMPLE), &standard_works());
        assert_eq!(a, b);
    }

    #[test]
    fn vocabulary_from_bodies_only() {
        let c = parse_corpus(&files(SAMPLE), &standard_works());
        assert!(c.vocabulary.contains("beginning"));
        assert!(c.vocabulary.contains("nephi"));
        assert!(!c.vocabulary.contains("genesis"));
    }

    const PARAGRAPHS: &str = "\
LEGAL NOTICE
All rights reserved.
Alma 32:21
And now as I said concerning faith
faith is not to have a perfect knowledge.

This paragraph carries no reference line at all and is long.

Moroni 10:4
And when ye shall receive these things.
";

    fn para_cat(books: Option<&[&str]>) -> Category {
        Category::new("bom", "Book of Mormon", "bom.txt", books).with_format(SourceFormat::ParagraphHeuristic {
            header_lines: 2,
            max_reference_len: 40,
        })
    }

    #[test]
    fn paragraph_format_references_and_synthetic_fallback() {
        let mut m = HashMap::new();
        m.insert("bom.txt".to_string(), PARAGRAPHS.to_string());
        let c = parse_corpus(&m, &[para_cat(None)]);
        assert_eq!(c.legal_text.as_deref(), Some("LEGAL NOTICE\nAll rights reserved."));
        assert_eq!(c.passages.len(), 3);
        assert_eq!(c.passages[0].reference, "Alma 32:21");
        assert_eq!(c.passages[0].chapter_id, "Alma 32");
        assert_eq!(c.passages[0].text, "And now as I said concerning faith faith is not to have a perfect knowledge.");
        assert_eq!(c.passages[1].reference, "This paragraph carries no refe");
        assert_eq!(c.passages[1].chapter_id, c.passages[1].reference);
        assert_eq!(c.passages[1].text, "This paragraph carries no reference line at all and is long.");
        assert_eq!(c.passages[2].reference, "Moroni 10:4");
        assert_eq!(c.chapters.ids(), &["Alma 32", "This paragraph carries no refe", "Moroni 10"]);
    }

    #[test]
    fn paragraph_format_long_first_line_is_not_a_reference() {
        let text = "H\nA very long first line that mentions 3:16 but is far too long to be a reference\nsecond line\n";
        let cat = Category::new("x", "X", "x.txt", None).with_format(SourceFormat::ParagraphHeuristic {
            header_lines: 1,
            max_reference_len: 40,
        });
        let mut m = HashMap::new();
        m.insert("x.txt".to_string(), text.to_string());
        let c = parse_corpus(&m, &[cat]);
        assert_eq!(c.passages.len(), 1);
        assert_eq!(c.passages[0].reference, "A very long first line that me");
        assert_eq!(c.passages[0].chapter_id, "A very long first line that me");
    }

    #[test]
    fn paragraph_format_honours_book_filter() {
        let mut m = HashMap::new();
        m.insert("bom.txt".to_string(), PARAGRAPHS.to_string());
        let c = parse_corpus(&m, &[para_cat(Some(&["Moroni"]))]);
        assert_eq!(c.passages.len(), 1);
        assert_eq!(c.passages[0].reference, "Moroni 10:4");
    }

    #[test]
    fn missing_file_contributes_nothing() {
        let c = parse_corpus(&HashMap::new(), &standard_works());
        assert!(c.passages.is_empty());
        assert!(c.vocabulary.is_empty());
    }

    #[test]
    fn verse_locator_after_last_colon() {
        assert_eq!(verse_locator("Genesis 1:31"), Some("31"));
        assert_eq!(verse_locator("No colon here"), None);
    }
}
