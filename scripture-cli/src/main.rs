use clap::{Args, Parser, Subcommand};
use scripture_core::config::{cache_dir, load_categories, scripture_home, standard_works};
use scripture_core::loader::{Loader, SourceBase};
use scripture_core::session::Highlighter;
use scripture_core::snapshot::{JsonSnapshotStore, SnapshotStore};
use scripture_core::{LoadStatus, Session};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\nBuilt: ",
        env!("BUILD_DATE"),
        "\nCommit: ",
        env!("GIT_HASH")
    )
}

#[derive(Parser, Debug)]
#[command(
    name = "scripture",
    about = "Search scripture passages and read them chapter by chapter",
    version,
    long_version = long_version()
)]
struct Cli {
    #[command(flatten)]
    opts: GlobalOpts,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct GlobalOpts {
    /// Directory holding corpus files (fallback: $SCRIPTURE_DIR or ~/.scripture)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Base URL to fetch corpus files from (fallback: $SCRIPTURE_SOURCE_URL)
    #[arg(long, global = true)]
    source_url: Option<String>,
    /// JSON file with the category list (default: built-in standard works)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Do not read or write the parsed-corpus snapshot
    #[arg(long, global = true, default_value_t = false)]
    no_cache: bool,
    /// Output JSON
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Search references and verse text (case-insensitive, literal)
    Search {
        /// Query text
        query: String,
        /// Restrict to these category ids (repeatable; default: all)
        #[arg(long = "category", short = 'c')]
        categories: Vec<String>,
        /// Print every result instead of the first batch
        #[arg(long, default_value_t = false)]
        all: bool,
        /// Number of batches to print
        #[arg(long, default_value_t = 1)]
        batches: usize,
    },
    /// Autocomplete words from the corpus vocabulary
    Suggest {
        /// Word prefix (at least two characters)
        prefix: String,
    },
    /// Read a whole chapter
    Chapter {
        /// Chapter key, e.g. "Genesis 1"
        id: String,
        /// Move to the following chapter
        #[arg(long, default_value_t = false, conflicts_with = "prev")]
        next: bool,
        /// Move to the preceding chapter
        #[arg(long, default_value_t = false)]
        prev: bool,
        /// Omit verse numbers
        #[arg(long, default_value_t = false)]
        no_numbers: bool,
    },
    /// List chapter keys in reading order
    Chapters {
        /// Only chapters starting with this text
        #[arg(long)]
        filter: Option<String>,
    },
    /// Show a single passage by id
    Verse {
        id: usize,
    },
    /// List configured categories with passage counts
    Categories {},
    /// Show the corpus legal notice
    Legal {},
    /// Load the corpus and report its status
    Status {},
    /// Line-oriented session: type queries, :more, :toggle, :chapter, :next, :prev, :quit
    Interactive {},
    /// Print CLI version
    Version {},
}

impl GlobalOpts {
    fn source_base(&self) -> anyhow::Result<SourceBase> {
        let url = self
            .source_url
            .clone()
            .or_else(|| std::env::var("SCRIPTURE_SOURCE_URL").ok().filter(|s| !s.is_empty()));
        if let Some(u) = url {
            return Ok(SourceBase::url(&u)?);
        }
        Ok(SourceBase::Dir(self.data_dir.clone().unwrap_or_else(scripture_home)))
    }

    fn cache_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(d) => d.join("cache"),
            None => cache_dir(),
        }
    }
}

fn highlighter_from_env() -> Highlighter {
    let d = Highlighter::default();
    Highlighter {
        prefix: std::env::var("SCRIPTURE_HL_PREFIX").unwrap_or(d.prefix),
        suffix: std::env::var("SCRIPTURE_HL_SUFFIX").unwrap_or(d.suffix),
    }
}

pub(crate) fn open_session(opts: &GlobalOpts) -> anyhow::Result<Session> {
    let categories = match &opts.config {
        Some(p) => load_categories(p)?,
        None => standard_works(),
    };
    let loader = Loader::new(opts.source_base()?)?;
    let store = (!opts.no_cache).then(|| JsonSnapshotStore::in_dir(&opts.cache_dir()));
    let mut session = Session::new(categories).with_highlighter(highlighter_from_env());
    eprintln!("[scripture] {}", LoadStatus::Loading);
    session.load(&loader, store.as_ref().map(|s| s as &dyn SnapshotStore))?;
    Ok(session)
}

/// Fails with the status message when nothing could be loaded.
pub(crate) fn ensure_ready(session: &Session) -> anyhow::Result<()> {
    match session.status() {
        LoadStatus::Ready { .. } => Ok(()),
        other => anyhow::bail!("{}", other),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let opts = cli.opts;
    match cli.command {
        Commands::Version {} => {
            println!("scripture {}", long_version());
        }
        Commands::Status {} => {
            let session = open_session(&opts)?;
            cmd::info::status(&session, opts.json)?;
        }
        Commands::Search { query, categories, all, batches } => {
            let mut session = open_session(&opts)?;
            ensure_ready(&session)?;
            cmd::search::search(&mut session, &query, &categories, all, batches, opts.json)?;
        }
        Commands::Suggest { prefix } => {
            let session = open_session(&opts)?;
            ensure_ready(&session)?;
            cmd::search::suggest(&session, &prefix, opts.json)?;
        }
        Commands::Chapter { id, next, prev, no_numbers } => {
            let mut session = open_session(&opts)?;
            ensure_ready(&session)?;
            let delta = if next { 1 } else if prev { -1 } else { 0 };
            cmd::chapter::chapter(&mut session, &id, delta, !no_numbers, opts.json)?;
        }
        Commands::Chapters { filter } => {
            let session = open_session(&opts)?;
            ensure_ready(&session)?;
            cmd::chapter::chapters(&session, filter.as_deref(), opts.json)?;
        }
        Commands::Verse { id } => {
            let session = open_session(&opts)?;
            ensure_ready(&session)?;
            cmd::chapter::verse(&session, id, opts.json)?;
        }
        Commands::Categories {} => {
            let session = open_session(&opts)?;
            cmd::info::categories(&session, opts.json)?;
        }
        Commands::Legal {} => {
            let session = open_session(&opts)?;
            cmd::info::legal(&session, opts.json)?;
        }
        Commands::Interactive {} => {
            let mut session = open_session(&opts)?;
            ensure_ready(&session)?;
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            cmd::interactive::run(&mut session, stdin.lock(), stdout.lock())?;
        }
    }
    Ok(())
}
