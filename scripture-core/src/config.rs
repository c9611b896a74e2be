use crate::error::{LoadError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CORPUS_FILE: &str = "standard_works.txt";
pub const DEFAULT_HEADER_LINES: usize = 260;
pub const DEFAULT_MAX_REFERENCE_LEN: usize = 40;

pub fn scripture_home() -> PathBuf {
    if let Ok(p) = std::env::var("SCRIPTURE_DIR") {
        return PathBuf::from(p);
    }
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".scripture")
}

pub fn cache_dir() -> PathBuf {
    scripture_home().join("cache")
}

/// How the text of a category's file is laid out.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceFormat {
    /// One passage per line, prefixed by its reference.
    #[default]
    ReferencePrefixed,
    /// A legal/header block, then blank-line separated paragraphs.
    ParagraphHeuristic {
        #[serde(default = "default_header_lines")]
        header_lines: usize,
        #[serde(default = "default_max_reference_len")]
        max_reference_len: usize,
    },
}

fn default_header_lines() -> usize { DEFAULT_HEADER_LINES }
fn default_max_reference_len() -> usize { DEFAULT_MAX_REFERENCE_LEN }

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub file: String,
    /// Book names whose references belong to this category; `None` accepts everything.
    #[serde(default)]
    pub books: Option<Vec<String>>,
    #[serde(default)]
    pub format: SourceFormat,
}

impl Category {
    pub fn new(id: &str, name: &str, file: &str, books: Option<&[&str]>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            file: file.to_string(),
            books: books.map(|b| b.iter().map(|s| s.to_string()).collect()),
            format: SourceFormat::ReferencePrefixed,
        }
    }

    pub fn with_format(mut self, format: SourceFormat) -> Self {
        self.format = format;
        self
    }

    /// A reference belongs here when it starts with one of the book names followed by a space.
    pub fn accepts(&self, reference: &str) -> bool {
        match &self.books {
            None => true,
            Some(books) => books.iter().any(|b| {
                reference
                    .strip_prefix(b.as_str())
                    .is_some_and(|rest| rest.starts_with(' '))
            }),
        }
    }
}

const OLD_TESTAMENT: &[&str] = &[
    "Genesis", "Exodus", "Leviticus", "Numbers", "Deuteronomy", "Joshua", "Judges", "Ruth",
    "1 Samuel", "2 Samuel", "1 Kings", "2 Kings", "1 Chronicles", "2 Chronicles", "Ezra",
    "Nehemiah", "Esther", "Job", "Psalms", "Proverbs", "Ecclesiastes", "Song of Solomon",
    "Isaiah", "Jeremiah", "Lamentations", "Ezekiel", "Daniel", "Hosea", "Joel", "Amos",
    "Obadiah", "Jonah", "Micah", "Nahum", "Habakkuk", "Zephaniah", "Haggai", "Zechariah",
    "Malachi",
];

const NEW_TESTAMENT: &[&str] = &[
    "Matthew", "Mark", "Luke", "John", "Acts", "Romans", "1 Corinthians", "2 Corinthians",
    "Galatians", "Ephesians", "Philippians", "Colossians", "1 Thessalonians",
    "2 Thessalonians", "1 Timothy", "2 Timothy", "Titus", "Philemon", "Hebrews", "James",
    "1 Peter", "2 Peter", "1 John", "2 John", "3 John", "Jude", "Revelation",
];

const BOOK_OF_MORMON: &[&str] = &[
    "1 Nephi", "2 Nephi", "Jacob", "Enos", "Jarom", "Omni", "Words of Mormon", "Mosiah",
    "Alma", "Helaman", "3 Nephi", "4 Nephi", "Mormon", "Ether", "Moroni",
];

const DOCTRINE_AND_COVENANTS: &[&str] = &["Doctrine and Covenants", "Section", "D&C"];

const PEARL_OF_GREAT_PRICE: &[&str] = &[
    "Moses", "Abraham", "Joseph Smith—Matthew", "Joseph Smith—History", "Articles of Faith",
];

/// The five standard-works collections, all read from one shared file.
pub fn standard_works() -> Vec<Category> {
    vec![
        Category::new("ot", "Old Testament", DEFAULT_CORPUS_FILE, Some(OLD_TESTAMENT)),
        Category::new("nt", "New Testament", DEFAULT_CORPUS_FILE, Some(NEW_TESTAMENT)),
        Category::new("bom", "Book of Mormon", DEFAULT_CORPUS_FILE, Some(BOOK_OF_MORMON)),
        Category::new("dc", "D&C", DEFAULT_CORPUS_FILE, Some(DOCTRINE_AND_COVENANTS)),
        Category::new("pgp", "Pearl of GP", DEFAULT_CORPUS_FILE, Some(PEARL_OF_GREAT_PRICE)),
    ]
}

pub fn parse_categories(json: &str) -> Result<Vec<Category>> {
    let cats: Vec<Category> = serde_json::from_str(json)?;
    validate_categories(&cats)?;
    Ok(cats)
}

pub fn load_categories(path: &Path) -> Result<Vec<Category>> {
    let s = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_categories(&s)
}

fn validate_categories(cats: &[Category]) -> Result<()> {
    if cats.is_empty() {
        return Err(LoadError::Config("no categories configured".into()));
    }
    let mut seen = std::collections::HashSet::new();
    for c in cats {
        if c.id.trim().is_empty() {
            return Err(LoadError::Config("category with empty id".into()));
        }
        if c.file.trim().is_empty() {
            return Err(LoadError::Config(format!("category '{}' has no file", c.id)));
        }
        if !seen.insert(c.id.as_str()) {
            return Err(LoadError::Config(format!("duplicate category id '{}'", c.id)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_requires_book_then_space() {
        let nt = &standard_works()[1];
        assert!(nt.accepts("John 3:16"));
        assert!(!nt.accepts("Johnny 3:16"));
        assert!(nt.accepts("1 John 1:1"));
        let ot = &standard_works()[0];
        assert!(!ot.accepts("1 John 1:1"));
    }

    #[test]
    fn null_books_accept_everything() {
        let c = Category::new("all", "All", "x.txt", None);
        assert!(c.accepts("Anything 1:1"));
        assert!(c.accepts(""));
    }

    #[test]
    fn parse_json_with_defaults() {
        let json = r#"[
            {"id": "a", "name": "A", "file": "a.txt", "books": ["Genesis"]},
            {"id": "b", "name": "B", "file": "b.txt", "books": null,
             "format": {"kind": "paragraph_heuristic", "header_lines": 3}}
        ]"#;
        let cats = parse_categories(json).unwrap();
        assert_eq!(cats[0].format, SourceFormat::ReferencePrefixed);
        assert_eq!(
            cats[1].format,
            SourceFormat::ParagraphHeuristic { header_lines: 3, max_reference_len: DEFAULT_MAX_REFERENCE_LEN }
        );
        assert!(cats[1].books.is_none());
    }

    #[test]
    fn duplicate_ids_rejected() {
        let json = r#"[{"id": "a", "name": "A", "file": "a.txt"}, {"id": "a", "name": "B", "file": "b.txt"}]"#;
        assert!(matches!(parse_categories(json), Err(LoadError::Config(_))));
        assert!(matches!(parse_categories("[]"), Err(LoadError::Config(_))));
    }
}
