//! # Sync Cache
//!
//! Remembers which subtitle files have already been synced so repeated runs
//! skip them.
//!
//! One set of paths is kept per media kind, each backed by a plain text file
//! with one path per line. Every successful record rewrites the whole file
//! from the in-memory set, so restarts never accumulate duplicate lines.
//!
//! The cache only saves work. Read failures are logged and treated as an
//! empty cache; write failures are logged and the in-memory set still
//! advances.

use bridge_traits::media::MediaKind;
use bridge_traits::storage::FileSystemAccess;
use bytes::Bytes;
use core_async::sync::RwLock;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Backing file locations, one per media kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePaths {
    pub movies: PathBuf,
    pub shows: PathBuf,
}

impl CachePaths {
    pub fn for_kind(&self, kind: MediaKind) -> &Path {
        match kind {
            MediaKind::Movie => &self.movies,
            MediaKind::Episode => &self.shows,
        }
    }
}

struct Backing {
    fs: Arc<dyn FileSystemAccess>,
    paths: CachePaths,
}

/// Persistent set of already-synced subtitle paths.
pub struct CacheStore {
    backing: Option<Backing>,
    movies: RwLock<BTreeSet<String>>,
    shows: RwLock<BTreeSet<String>>,
}

impl CacheStore {
    /// A store backed by the given files. Nothing is read until
    /// [`load`](Self::load) or [`reload`](Self::reload).
    pub fn new(fs: Arc<dyn FileSystemAccess>, paths: CachePaths) -> Self {
        Self {
            backing: Some(Backing { fs, paths }),
            movies: RwLock::new(BTreeSet::new()),
            shows: RwLock::new(BTreeSet::new()),
        }
    }

    /// A store that never hits and never writes.
    pub fn disabled() -> Self {
        Self {
            backing: None,
            movies: RwLock::new(BTreeSet::new()),
            shows: RwLock::new(BTreeSet::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backing.is_some()
    }

    fn set(&self, kind: MediaKind) -> &RwLock<BTreeSet<String>> {
        match kind {
            MediaKind::Movie => &self.movies,
            MediaKind::Episode => &self.shows,
        }
    }

    /// Read the backing file for `kind` into memory, replacing what was
    /// there. Returns the number of entries loaded.
    ///
    /// A missing file is an empty cache.
    pub async fn load(&self, kind: MediaKind) -> usize {
        let Some(backing) = &self.backing else {
            return 0;
        };

        let path = backing.paths.for_kind(kind);
        let entries = match read_entries(backing.fs.as_ref(), path).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read sync cache, starting empty");
                BTreeSet::new()
            }
        };

        let count = entries.len();
        *self.set(kind).write().await = entries;
        debug!(kind = %kind, path = %path.display(), count, "Loaded sync cache");
        count
    }

    /// Reload both kinds from disk.
    pub async fn reload(&self) {
        let movies = self.load(MediaKind::Movie).await;
        let shows = self.load(MediaKind::Episode).await;
        if self.is_enabled() {
            info!(movies, shows, "Sync cache loaded");
        }
    }

    pub async fn contains(&self, kind: MediaKind, path: &str) -> bool {
        self.is_enabled() && self.set(kind).read().await.contains(path)
    }

    pub async fn len(&self, kind: MediaKind) -> usize {
        self.set(kind).read().await.len()
    }

    /// Add `path` and rewrite the backing file with every known entry.
    pub async fn record(&self, kind: MediaKind, path: &str) {
        let Some(backing) = &self.backing else {
            return;
        };

        let contents = {
            let mut set = self.set(kind).write().await;
            if !set.insert(path.to_string()) {
                return;
            }
            render(&set)
        };

        let target = backing.paths.for_kind(kind);
        if let Err(e) = backing.fs.write_file(target, contents).await {
            warn!(path = %target.display(), error = %e, "Could not write sync cache");
        }
    }
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("paths", &self.backing.as_ref().map(|b| &b.paths))
            .finish()
    }
}

async fn read_entries(
    fs: &dyn FileSystemAccess,
    path: &Path,
) -> bridge_traits::error::Result<BTreeSet<String>> {
    if !fs.exists(path).await? {
        return Ok(BTreeSet::new());
    }

    let data = fs.read_file(path).await?;
    Ok(String::from_utf8_lossy(&data)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

fn render(entries: &BTreeSet<String>) -> Bytes {
    let mut out = String::new();
    for entry in entries {
        out.push_str(entry);
        out.push('\n');
    }
    Bytes::from(out)
}
