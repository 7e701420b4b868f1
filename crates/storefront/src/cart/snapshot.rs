//! Durable cart snapshot.
//!
//! The cart is mirrored to a single JSON file holding the serialized entry
//! list. The file is read once at startup and rewritten in full after every
//! successful mutation. There is no partial-update or migration format: a
//! missing or unparseable file is treated as an empty cart.

use std::path::{Path, PathBuf};

use thiserror::Error;

use shoebox_core::CartEntry;

/// Errors that can occur while persisting the cart snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot serialization failed.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// File-backed store for the serialized cart.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Create a store writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The snapshot file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted cart, or an empty cart if the snapshot is missing
    /// or unreadable.
    pub async fn load(&self) -> Vec<CartEntry> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read cart snapshot");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Discarding unparseable cart snapshot");
                Vec::new()
            }
        }
    }

    /// Rewrite the snapshot with the given entries.
    ///
    /// Writes to a sibling temporary file and renames it into place, so a
    /// crash mid-write cannot leave a truncated snapshot behind.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError` if serialization or the filesystem write fails.
    pub async fn save(&self, entries: &[CartEntry]) -> Result<(), SnapshotError> {
        let raw = serde_json::to_vec(entries)?;

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &raw).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use shoebox_core::{Product, ProductId};

    use super::*;

    fn entry(id: i32, amount: u32) -> CartEntry {
        CartEntry::new(
            Product {
                id: ProductId::new(id),
                title: format!("Sneaker {id}"),
                price: Decimal::new(9990, 2),
                image: format!("https://cdn.example.com/shoes/{id}.jpg"),
            },
            amount,
        )
    }

    #[tokio::test]
    async fn test_round_trip_reproduces_identical_cart() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SnapshotStore::new(dir.path().join("cart.json"));

        let entries = vec![entry(1, 2), entry(3, 1)];
        store.save(&entries).await.expect("save");

        assert_eq!(store.load().await, entries);
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_empty_cart() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SnapshotStore::new(dir.path().join("cart.json"));

        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_snapshot_is_empty_cart() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cart.json");
        tokio::fs::write(&path, b"{ not json")
            .await
            .expect("write garbage");

        let store = SnapshotStore::new(path);
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SnapshotStore::new(dir.path().join("cart.json"));

        store.save(&[entry(1, 1)]).await.expect("first save");
        store.save(&[entry(2, 4)]).await.expect("second save");

        assert_eq!(store.load().await, vec![entry(2, 4)]);
    }
}
