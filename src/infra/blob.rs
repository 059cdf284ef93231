//! Filesystem blob store for payment proof uploads
//!
//! Files land directly in the uploads directory under names of the form
//! `<unix-millis>-<uuid>[.<ext>]`. The UUID makes names unique even when
//! several uploads arrive in the same millisecond. The public path handed
//! back to callers is `uploads/<name>`, which the static `/uploads` route
//! serves from the same directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::infra::{BlobStore, RegistrationError, Result};

/// URL prefix under which stored blobs are served
pub const UPLOADS_PREFIX: &str = "uploads";

const MAX_EXTENSION_LEN: usize = 16;

/// Blob store rooted at a local directory
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Open the store, creating the directory if it does not exist
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Directory the blobs are written to
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, public_path: &str) -> Result<PathBuf> {
        let name = public_path
            .strip_prefix(UPLOADS_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| {
                RegistrationError::Internal(format!("not an upload path: {public_path}"))
            })?;

        if !is_plain_file_name(name) {
            return Err(RegistrationError::Internal(format!(
                "invalid blob name: {name}"
            )));
        }

        Ok(self.root.join(name))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, original_name: Option<String>, bytes: Vec<u8>) -> Result<String> {
        let name = blob_name(original_name.as_deref());
        let path = self.root.join(&name);

        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        write_or_remove(&path, file, &bytes).await?;

        debug!(blob = %name, size = bytes.len(), "Stored upload");
        Ok(format!("{UPLOADS_PREFIX}/{name}"))
    }

    async fn remove(&self, public_path: &str) -> Result<()> {
        let path = self.path_for(public_path)?;
        tokio::fs::remove_file(&path).await?;
        debug!(blob = %public_path, "Removed upload");
        Ok(())
    }
}

/// Write `bytes` to a freshly created file at `path`. A partial file is never
/// left behind: on a failed write or flush the file is deleted.
async fn write_or_remove<W>(path: &Path, mut file: W, bytes: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        file.write_all(bytes).await?;
        file.flush().await
    }
    .await;

    if let Err(e) = written {
        drop(file);
        if let Err(remove_err) = tokio::fs::remove_file(path).await {
            warn!(path = %path.display(), error = %remove_err, "Failed to remove partial upload");
        }
        return Err(e.into());
    }
    Ok(())
}

/// Build a fresh blob name, keeping the original extension when it is sane.
pub fn blob_name(original_name: Option<&str>) -> String {
    let stem = format!(
        "{}-{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    );

    match original_name.and_then(extension_of) {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    }
}

fn extension_of(file_name: &str) -> Option<String> {
    // Client filenames may carry either separator.
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let (stem, ext) = base.rsplit_once('.')?;
    if stem.is_empty()
        || ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}

#[cfg(test)]
mod tests {
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use super::*;

    /// Writer whose every write fails, as on a full disk.
    struct FullDisk;

    impl AsyncWrite for FullDisk {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            Poll::Ready(Err(std::io::Error::other("no space left on device")))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("receipt.PNG"), Some("png".to_string()));
        assert_eq!(extension_of("scan.final.pdf"), Some("pdf".to_string()));
        assert_eq!(extension_of("C:\\Users\\me\\proof.jpeg"), Some("jpeg".to_string()));
        assert_eq!(extension_of("no_extension"), None);
        assert_eq!(extension_of(".hidden"), None);
        assert_eq!(extension_of("trailing."), None);
        assert_eq!(extension_of("weird.p$g"), None);
        assert_eq!(extension_of(&format!("long.{}", "a".repeat(17))), None);
    }

    #[test]
    fn test_blob_name_is_unique() {
        let a = blob_name(Some("proof.png"));
        let b = blob_name(Some("proof.png"));
        assert_ne!(a, b);
        assert!(a.ends_with(".png"));
        assert!(is_plain_file_name(&a));
    }

    #[test]
    fn test_blob_name_without_extension() {
        let name = blob_name(None);
        assert!(!name.contains('.'));
        let (millis, id) = name.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(id.len(), 32);
    }

    #[tokio::test]
    async fn test_put_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::open(dir.path().join("uploads")).await.unwrap();

        let public_path = store
            .put(Some("proof.jpg".to_string()), b"jpeg bytes".to_vec())
            .await
            .unwrap();
        assert!(public_path.starts_with("uploads/"));
        assert!(public_path.ends_with(".jpg"));

        let on_disk = store.path_for(&public_path).unwrap();
        assert_eq!(tokio::fs::read(&on_disk).await.unwrap(), b"jpeg bytes");

        store.remove(&public_path).await.unwrap();
        assert!(!on_disk.exists());
    }

    #[tokio::test]
    async fn test_remove_rejects_foreign_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::open(dir.path()).await.unwrap();

        assert!(store.remove("elsewhere/file.png").await.is_err());
        assert!(store.remove("uploads/../secret").await.is_err());
        assert!(store.remove("uploads/").await.is_err());
    }

    #[tokio::test]
    async fn test_failed_write_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(blob_name(Some("proof.png")));
        tokio::fs::write(&path, b"partial").await.unwrap();

        let err = write_or_remove(&path, FullDisk, b"png bytes")
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::Storage(_)));
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_successful_write_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        let file = tokio::fs::File::create(&path).await.unwrap();

        write_or_remove(&path, file, b"contents").await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"contents");
    }
}
