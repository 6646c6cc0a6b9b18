// src/storage/file.rs

//! File-backed seen-set.
//!
//! Line-oriented append-only file: one post identifier per line. The file is
//! read once at startup to rebuild an in-memory `HashSet` index, so lookups
//! never scan the file. Each `record` appends a line, flushes, and fsyncs
//! before returning, making every record a complete, independent, durable
//! operation. Process termination between any two records cannot corrupt
//! the store.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::storage::SeenStore;

struct Inner {
    seen: HashSet<String>,
    file: tokio::fs::File,
}

/// Seen-set persisted as an append-only text file.
pub struct FileSeenStore {
    path: PathBuf,
    inner: Mutex<Inner>,
}

impl FileSeenStore {
    /// Open (or create) the store at the given path and load all previously
    /// recorded identifiers. A read failure here is fatal to the caller:
    /// without the seen-set there is no duplicate-delivery guarantee.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let seen = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => {
                return Err(AppError::persistence(format!(
                    "failed to read seen-set {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| {
                AppError::persistence(format!(
                    "failed to open seen-set {} for append: {}",
                    path.display(),
                    e
                ))
            })?;

        log::debug!(
            "Loaded {} seen post ids from {}",
            seen.len(),
            path.display()
        );

        Ok(Self {
            path,
            inner: Mutex::new(Inner { seen, file }),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SeenStore for FileSeenStore {
    async fn contains(&self, id: &str) -> bool {
        self.inner.lock().await.seen.contains(id)
    }

    async fn record(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.seen.contains(id) {
            return Ok(());
        }

        let line = format!("{}\n", id);
        let write = async {
            inner.file.write_all(line.as_bytes()).await?;
            inner.file.flush().await?;
            inner.file.sync_data().await?;
            std::io::Result::Ok(())
        };
        write.await.map_err(|e| {
            AppError::persistence(format!(
                "failed to append '{}' to {}: {}",
                id,
                self.path.display(),
                e
            ))
        })?;

        inner.seen.insert(id.to_string());
        Ok(())
    }

    async fn len(&self) -> usize {
        self.inner.lock().await.seen.len()
    }
}
