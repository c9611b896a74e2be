use crate::config::Category;
use crate::error::{LoadError, Result};
use crate::ParsedCorpus;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::path::{Path, PathBuf};

/// Bump whenever the serialized shape of `ParsedCorpus` changes.
pub const SCHEMA_VERSION: u32 = 1;

/// Identifies which configuration and file versions a snapshot was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotKey {
    pub schema_version: u32,
    pub config_fingerprint: String,
}

impl SnapshotKey {
    /// `stamps` are per-file change markers (see `Loader::stamp_all`), so an edited
    /// corpus file produces a different key.
    pub fn for_config(categories: &[Category], source: &str, stamps: &[(String, String)]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(serde_json::to_vec(categories).unwrap_or_default());
        hasher.update(b"\0");
        hasher.update(source.as_bytes());
        for (file, stamp) in stamps {
            hasher.update(b"\0");
            hasher.update(file.as_bytes());
            hasher.update(b"=");
            hasher.update(stamp.as_bytes());
        }
        Self {
            schema_version: SCHEMA_VERSION,
            config_fingerprint: format!("{:x}", hasher.finalize()),
        }
    }
}

/// Optional persistence for parsed corpora.
pub trait SnapshotStore {
    fn load_snapshot(&self, key: &SnapshotKey) -> Option<ParsedCorpus>;
    fn save_snapshot(&self, key: &SnapshotKey, corpus: &ParsedCorpus) -> Result<()>;
}

#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    schema_version: u32,
    config_fingerprint: String,
    corpus: ParsedCorpus,
}

/// Stores the snapshot as one JSON file.
#[derive(Debug, Clone)]
pub struct JsonSnapshotStore {
    path: PathBuf,
}

impl JsonSnapshotStore {
    pub fn in_dir(dir: &Path) -> Self {
        Self { path: dir.join("corpus-snapshot.json") }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonSnapshotStore {
    fn load_snapshot(&self, key: &SnapshotKey) -> Option<ParsedCorpus> {
        let bytes = std::fs::read(&self.path).ok()?;
        let file: SnapshotFile = match serde_json::from_slice(&bytes) {
            Ok(f) => f,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "unreadable snapshot");
                return None;
            }
        };
        if file.schema_version != key.schema_version || file.config_fingerprint != key.config_fingerprint {
            tracing::debug!(path = %self.path.display(), "stale snapshot ignored");
            return None;
        }
        if file.corpus.is_empty() {
            return None;
        }
        Some(file.corpus)
    }

    fn save_snapshot(&self, key: &SnapshotKey, corpus: &ParsedCorpus) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| LoadError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }
        let file = SnapshotFile {
            schema_version: key.schema_version,
            config_fingerprint: key.config_fingerprint.clone(),
            corpus: corpus.clone(),
        };
        let bytes = serde_json::to_vec(&file)?;
        std::fs::write(&self.path, bytes).map_err(|source| LoadError::Io {
            path: self.path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::standard_works;
    use crate::parser::parse_corpus;
    use std::collections::HashMap;

    fn corpus() -> ParsedCorpus {
        let mut m = HashMap::new();
        m.insert(
            "standard_works.txt".to_string(),
            "Genesis 1:1 In the beginning\nAlma 32:21 faith is not to have a perfect knowledge\n".to_string(),
        );
        parse_corpus(&m, &standard_works())
    }

    fn stamps() -> Vec<(String, String)> {
        vec![("standard_works.txt".to_string(), "120:1700000000".to_string())]
    }

    #[test]
    fn save_then_load_same_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSnapshotStore::in_dir(dir.path());
        let key = SnapshotKey::for_config(&standard_works(), "/data", &stamps());
        assert!(store.load_snapshot(&key).is_none());
        let c = corpus();
        store.save_snapshot(&key, &c).unwrap();
        let back = store.load_snapshot(&key).unwrap();
        assert_eq!(back, c);
        assert_eq!(back.chapters.position("Alma 32"), Some(1));
    }

    #[test]
    fn changed_config_or_version_misses() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSnapshotStore::in_dir(dir.path());
        let key = SnapshotKey::for_config(&standard_works(), "/data", &stamps());
        store.save_snapshot(&key, &corpus()).unwrap();

        let other_source = SnapshotKey::for_config(&standard_works(), "/elsewhere", &stamps());
        assert!(store.load_snapshot(&other_source).is_none());

        let mut cats = standard_works();
        cats.truncate(2);
        assert!(store.load_snapshot(&SnapshotKey::for_config(&cats, "/data", &stamps())).is_none());

        let edited = vec![("standard_works.txt".to_string(), "121:1700000042".to_string())];
        assert!(store.load_snapshot(&SnapshotKey::for_config(&standard_works(), "/data", &edited)).is_none());

        let older = SnapshotKey { schema_version: SCHEMA_VERSION + 1, ..key };
        assert!(store.load_snapshot(&older).is_none());
    }

    #[test]
    fn corrupt_file_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSnapshotStore::in_dir(dir.path());
        std::fs::write(store.path(), b"{not json").unwrap();
        assert!(store.load_snapshot(&SnapshotKey::for_config(&standard_works(), "", &[])).is_none());
    }
}
