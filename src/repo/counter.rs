use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::Context;
use tokio::sync::Mutex;
use crate::domain::VouchCount;

/// File-backed storage for the vouch counter.
///
/// The file holds the decimal ASCII representation of the count, nothing else.
/// A missing or unparsable file reads as zero. Writes are full overwrites.
/// All read-modify-write operations are serialized by an internal lock so
/// concurrently running handlers cannot interleave their load/save pairs.
#[derive(Clone)]
pub struct CounterStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl CounterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::default(),
        }
    }

    pub async fn load(&self) -> VouchCount {
        let _guard = self.lock.lock().await;
        read_count(&self.path)
    }

    pub async fn save(&self, count: VouchCount) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        write_count(&self.path, count)
    }

    pub async fn increment(&self) -> anyhow::Result<VouchCount> {
        self.update(VouchCount::incremented).await
    }

    /// Floors at zero.
    pub async fn decrement(&self) -> anyhow::Result<VouchCount> {
        self.update(VouchCount::decremented).await
    }

    pub async fn set(&self, count: VouchCount) -> anyhow::Result<VouchCount> {
        self.update(|_| count).await
    }

    pub async fn reset(&self) -> anyhow::Result<VouchCount> {
        self.set(VouchCount::ZERO).await
    }

    async fn update(&self, f: impl FnOnce(VouchCount) -> VouchCount) -> anyhow::Result<VouchCount> {
        let _guard = self.lock.lock().await;
        let count = f(read_count(&self.path));
        write_count(&self.path, count)?;
        Ok(count)
    }
}

fn read_count(path: &Path) -> VouchCount {
    match std::fs::read_to_string(path) {
        Ok(content) => content.trim().parse()
            .unwrap_or_else(|e| {
                log::warn!("unparsable counter file {}, falling back to zero: {e}", path.display());
                VouchCount::ZERO
            }),
        Err(e) if e.kind() == ErrorKind::NotFound => VouchCount::ZERO,
        Err(e) => {
            log::warn!("couldn't read the counter file {}, falling back to zero: {e}", path.display());
            VouchCount::ZERO
        }
    }
}

fn write_count(path: &Path, count: VouchCount) -> anyhow::Result<()> {
    std::fs::write(path, count.to_string())
        .with_context(|| format!("couldn't write the counter file {}", path.display()))
}
