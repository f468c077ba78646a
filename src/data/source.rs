use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use super::loader::{self, Format};
use super::model::Table;
use crate::config::AppConfig;
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Sources and their identity
// ---------------------------------------------------------------------------

/// Where a dataset comes from.
#[derive(Debug, Clone)]
pub enum DataSource {
    /// The configured default remote dataset.
    DefaultRemote(String),
    /// A file on local disk (the default fallback, or a picked file).
    LocalFile(PathBuf),
    /// Raw bytes handed over by the user, with the original file name.
    Upload { name: String, bytes: Bytes },
    /// A URL typed in by the user.
    Url(String),
}

/// Canonical identity of a source, used as the memoization key.
/// Uploads are identified by a content hash so re-uploading the same file
/// hits the cache while a changed file does not.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceKey {
    Url(String),
    Path(PathBuf),
    Content(String),
    /// The default chain as a whole (remote URL, then fallback file).
    Default { url: String, fallback: PathBuf },
}

impl DataSource {
    pub fn key(&self) -> SourceKey {
        match self {
            DataSource::DefaultRemote(url) | DataSource::Url(url) => SourceKey::Url(url.clone()),
            DataSource::LocalFile(path) => SourceKey::Path(path.clone()),
            DataSource::Upload { bytes, .. } => {
                SourceKey::Content(blake3::hash(bytes).to_hex().to_string())
            }
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::DefaultRemote(url) => write!(f, "default dataset ({url})"),
            DataSource::LocalFile(path) => write!(f, "local file {}", path.display()),
            DataSource::Upload { name, .. } => write!(f, "uploaded file {name}"),
            DataSource::Url(url) => write!(f, "{url}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolving a single source
// ---------------------------------------------------------------------------

/// Fetch a URL body with a bounded timeout. Expiry is a load failure.
pub fn fetch_url(url: &str, timeout: Duration) -> Result<Bytes, LoadError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LoadError::Unreachable {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let classify = |e: reqwest::Error| {
        if e.is_timeout() {
            LoadError::Timeout {
                url: url.to_string(),
                secs: timeout.as_secs(),
            }
        } else {
            LoadError::Unreachable {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    };

    let response = client.get(url).send().map_err(classify)?;
    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    response.bytes().map_err(classify)
}

fn file_format(name: &str) -> Result<Format, LoadError> {
    Format::from_file_name(name).ok_or_else(|| LoadError::UnsupportedFormat(name.to_string()))
}

/// One direct attempt at turning a source into a table. No fallback.
pub fn load_source(source: &DataSource, timeout: Duration) -> Result<Table, LoadError> {
    let (bytes, format) = match source {
        DataSource::DefaultRemote(url) | DataSource::Url(url) => {
            (fetch_url(url, timeout)?, Format::from_name(url))
        }
        DataSource::LocalFile(path) => {
            let name = path.to_string_lossy();
            let format = file_format(&name)?;
            let raw = std::fs::read(path).map_err(|source| LoadError::Io {
                path: path.display().to_string(),
                source,
            })?;
            (Bytes::from(raw), format)
        }
        DataSource::Upload { name, bytes } => (bytes.clone(), file_format(name)?),
    };

    if bytes.is_empty() {
        return Err(LoadError::EmptyInput);
    }
    loader::parse_bytes(bytes, format).map_err(LoadError::Parse)
}

// ---------------------------------------------------------------------------
// Outcome of the default chain
// ---------------------------------------------------------------------------

/// Tagged result of resolving the default dataset.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded { table: Arc<Table>, origin: String },
    /// Every step failed; one entry per attempted source, in order.
    Failed { attempts: Vec<(String, LoadError)> },
}

// ---------------------------------------------------------------------------
// Memoization
// ---------------------------------------------------------------------------

/// Single-slot memo of the most recently loaded dataset. Loading a source
/// with a different key replaces (invalidates) the slot.
#[derive(Debug, Default)]
pub struct DatasetCache {
    slot: Option<(SourceKey, Arc<Table>)>,
}

impl DatasetCache {
    pub fn get(&self, key: &SourceKey) -> Option<Arc<Table>> {
        self.slot
            .as_ref()
            .filter(|(k, _)| k == key)
            .map(|(_, t)| Arc::clone(t))
    }

    pub fn insert(&mut self, key: SourceKey, table: Arc<Table>) {
        self.slot = Some((key, table));
    }

    pub fn invalidate(&mut self) {
        self.slot = None;
    }

    pub fn get_or_load<F>(&mut self, key: SourceKey, load: F) -> Result<Arc<Table>, LoadError>
    where
        F: FnOnce() -> Result<Table, LoadError>,
    {
        if let Some(table) = self.get(&key) {
            log::debug!("dataset cache hit for {key:?}");
            return Ok(table);
        }
        log::debug!("dataset cache miss for {key:?}");
        let table = Arc::new(load()?);
        self.insert(key, Arc::clone(&table));
        Ok(table)
    }
}

// ---------------------------------------------------------------------------
// Loader front-end
// ---------------------------------------------------------------------------

/// Resolves datasets for one session: the default chain plus user sources,
/// memoized by source identity.
#[derive(Debug)]
pub struct DatasetLoader {
    default_url: String,
    fallback_path: PathBuf,
    timeout: Duration,
    cache: DatasetCache,
}

impl DatasetLoader {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            default_url: config.default_url.clone(),
            fallback_path: config.fallback_path.clone(),
            timeout: config.fetch_timeout(),
            cache: DatasetCache::default(),
        }
    }

    /// Remote default first, then the local fallback file. Never panics or
    /// raises: all failures come back in [`LoadOutcome::Failed`].
    pub fn load_default(&mut self) -> LoadOutcome {
        let key = SourceKey::Default {
            url: self.default_url.clone(),
            fallback: self.fallback_path.clone(),
        };
        if let Some(table) = self.cache.get(&key) {
            log::debug!("default dataset served from cache");
            return LoadOutcome::Loaded {
                table,
                origin: "default dataset (cached)".to_string(),
            };
        }

        let chain = [
            DataSource::DefaultRemote(self.default_url.clone()),
            DataSource::LocalFile(self.fallback_path.clone()),
        ];

        let mut attempts = Vec::new();
        for source in chain {
            match load_source(&source, self.timeout) {
                Ok(table) => {
                    log::info!(
                        "Loaded {} rows x {} columns from {source}",
                        table.n_rows(),
                        table.n_cols()
                    );
                    let table = Arc::new(table);
                    self.cache.insert(key.clone(), Arc::clone(&table));
                    return LoadOutcome::Loaded {
                        table,
                        origin: source.to_string(),
                    };
                }
                Err(e) => {
                    log::warn!("Could not load {source}: {e}");
                    attempts.push((source.to_string(), e));
                }
            }
        }
        LoadOutcome::Failed { attempts }
    }

    /// Drop any memoized copy and resolve the default chain again.
    pub fn reload_default(&mut self) -> LoadOutcome {
        self.cache.invalidate();
        self.load_default()
    }

    /// A single direct attempt at a user-supplied source.
    pub fn load(&mut self, source: DataSource) -> Result<Arc<Table>, LoadError> {
        let timeout = self.timeout;
        let table = self
            .cache
            .get_or_load(source.key(), || load_source(&source, timeout))?;
        log::info!(
            "Loaded {} rows x {} columns from {source}",
            table.n_rows(),
            table.n_cols()
        );
        Ok(table)
    }
}
