use thiserror::Error;

pub type Result<T> = std::result::Result<T, LoadError>;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("fetching {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("invalid source: {0}")]
    InvalidSource(String),

    #[error("a corpus load is already in progress")]
    AlreadyLoading,

    #[error("invalid category configuration: {0}")]
    Config(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl LoadError {
    /// Name of the file or URL the error concerns, when there is one.
    pub fn target(&self) -> Option<&str> {
        match self {
            LoadError::Io { path, .. } => Some(path),
            LoadError::Http { url, .. } | LoadError::HttpStatus { url, .. } => Some(url),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_names_the_failing_file() {
        let io = LoadError::Io {
            path: "/data/bom.txt".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(io.target(), Some("/data/bom.txt"));
        let status = LoadError::HttpStatus { url: "https://example.org/a.txt".into(), status: 404 };
        assert_eq!(status.target(), Some("https://example.org/a.txt"));
        assert_eq!(LoadError::AlreadyLoading.target(), None);
    }
}
