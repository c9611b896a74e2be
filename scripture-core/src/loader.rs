use crate::config::Category;
use crate::error::{LoadError, Result};
use rayon::prelude::*;
use reqwest::blocking::Client;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};
use url::Url;

/// Where relative category file names are resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceBase {
    Dir(PathBuf),
    Url(Url),
}

impl SourceBase {
    /// Parses an `http(s)` base URL; a missing trailing slash is added so joins keep the last segment.
    pub fn url(s: &str) -> Result<Self> {
        let mut u = Url::parse(s).map_err(|e| LoadError::InvalidSource(format!("{}: {}", s, e)))?;
        if !matches!(u.scheme(), "http" | "https") {
            return Err(LoadError::InvalidSource(format!("unsupported scheme in {}", s)));
        }
        if !u.path().ends_with('/') {
            let p = format!("{}/", u.path());
            u.set_path(&p);
        }
        Ok(SourceBase::Url(u))
    }

    pub fn describe(&self) -> String {
        match self {
            SourceBase::Dir(d) => d.display().to_string(),
            SourceBase::Url(u) => u.to_string(),
        }
    }
}

enum Location {
    File(PathBuf),
    Remote(Url),
}

/// Raw file contents keyed by the category `file` name, plus per-file failures.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub files: HashMap<String, String>,
    pub errors: Vec<(String, LoadError)>,
}

impl FetchOutcome {
    pub fn missing_files(&self) -> Vec<&str> {
        self.errors.iter().map(|(f, _)| f.as_str()).collect()
    }
}

pub struct Loader {
    base: SourceBase,
    client: Client,
}

impl Loader {
    pub fn new(base: SourceBase) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|source| LoadError::Http { url: base.describe(), source })?;
        Ok(Self { base, client })
    }

    pub fn base(&self) -> &SourceBase {
        &self.base
    }

    /// Fetches every distinct file named by `categories` exactly once, concurrently.
    /// Returns only after all fetches have finished or failed.
    pub fn fetch_all(&self, categories: &[Category]) -> FetchOutcome {
        let names = unique_files(categories);
        let fetched: Vec<(String, Result<String>)> = names
            .par_iter()
            .map(|name| (name.clone(), self.fetch_one(name)))
            .collect();

        let mut out = FetchOutcome::default();
        for (name, res) in fetched {
            match res {
                Ok(text) => {
                    tracing::debug!(file = %name, bytes = text.len(), "fetched corpus file");
                    out.files.insert(name, text);
                }
                Err(e) => {
                    tracing::warn!(file = %name, error = %e, "failed to load corpus file");
                    out.errors.push((name, e));
                }
            }
        }
        out
    }

    /// Change markers for every distinct file, or `None` when any file cannot be stamped.
    pub fn stamp_all(&self, categories: &[Category]) -> Option<Vec<(String, String)>> {
        unique_files(categories)
            .par_iter()
            .map(|name| self.stamp_one(name).map(|s| (name.clone(), s)))
            .collect()
    }

    /// Size and mtime for local files; `ETag` or `Last-Modified` for remote ones.
    pub fn stamp_one(&self, name: &str) -> Option<String> {
        match self.locate(name).ok()? {
            Location::File(p) => {
                let meta = std::fs::metadata(&p).ok()?;
                let mtime = meta.modified().ok()?.duration_since(UNIX_EPOCH).ok()?;
                Some(format!("{}:{}", meta.len(), mtime.as_nanos()))
            }
            Location::Remote(u) => {
                let resp = self.client.head(u).send().ok()?;
                if !resp.status().is_success() {
                    return None;
                }
                let h = resp.headers();
                let v = h
                    .get(reqwest::header::ETAG)
                    .or_else(|| h.get(reqwest::header::LAST_MODIFIED))?;
                v.to_str().ok().map(|s| s.to_string())
            }
        }
    }

    pub fn fetch_one(&self, name: &str) -> Result<String> {
        match self.locate(name)? {
            Location::File(p) => read_file(&p),
            Location::Remote(u) => self.get(&u),
        }
    }

    fn locate(&self, name: &str) -> Result<Location> {
        if let Ok(u) = Url::parse(name) {
            if matches!(u.scheme(), "http" | "https") {
                return Ok(Location::Remote(u));
            }
        }
        let p = Path::new(name);
        if p.is_absolute() {
            return Ok(Location::File(p.to_path_buf()));
        }
        match &self.base {
            SourceBase::Dir(d) => Ok(Location::File(d.join(p))),
            SourceBase::Url(b) => b
                .join(name)
                .map(Location::Remote)
                .map_err(|e| LoadError::InvalidSource(format!("{}: {}", name, e))),
        }
    }

    fn get(&self, u: &Url) -> Result<String> {
        let url = u.to_string();
        let resp = self
            .client
            .get(u.clone())
            .send()
            .map_err(|source| LoadError::Http { url: url.clone(), source })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(LoadError::HttpStatus { url, status: status.as_u16() });
        }
        let bytes = resp.bytes().map_err(|source| LoadError::Http { url, source })?;
        Ok(decode_text_bytes(&bytes))
    }
}

fn read_file(p: &Path) -> Result<String> {
    std::fs::read(p)
        .map(|b| decode_text_bytes(&b))
        .map_err(|source| LoadError::Io { path: p.display().to_string(), source })
}

/// Distinct file names in first-seen order.
pub fn unique_files(categories: &[Category]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    categories
        .iter()
        .filter(|c| seen.insert(c.file.as_str()))
        .map(|c| c.file.clone())
        .collect()
}

/// Decodes corpus bytes, honouring UTF-8/UTF-16 byte order marks.
pub fn decode_text_bytes(bytes: &[u8]) -> String {
    if bytes.len() >= 3 && bytes[..3] == [0xEF, 0xBB, 0xBF] {
        return String::from_utf8_lossy(&bytes[3..]).into_owned();
    }
    if bytes.len() >= 2 && bytes[..2] == [0xFE, 0xFF] {
        let (cow, _, _) = encoding_rs::UTF_16BE.decode(bytes);
        return cow.into_owned();
    }
    if bytes.len() >= 2 && bytes[..2] == [0xFF, 0xFE] {
        let (cow, _, _) = encoding_rs::UTF_16LE.decode(bytes);
        return cow.into_owned();
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (cow, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            cow.into_owned()
        }
    }
}
