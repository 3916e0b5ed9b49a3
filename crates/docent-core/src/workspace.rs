//! Upload and index folders on local disk.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::CoreError;

const INDEX_SUBDIR: &str = "vector-index";

/// Outcome of [`DocumentWorkspace::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResetReport {
    pub index_removed: bool,
    pub uploads_removed: bool,
}

#[derive(Debug, Clone)]
pub struct DocumentWorkspace {
    data_dir: PathBuf,
    index_dir: PathBuf,
    extensions: Vec<String>,
}

impl DocumentWorkspace {
    /// Workspace accepting PDF uploads.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>, index_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            index_dir: index_dir.into(),
            extensions: vec!["pdf".into()],
        }
    }

    /// Restrict uploads to the given extensions (case-insensitive, no leading dot).
    #[must_use]
    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.set_extensions(extensions);
        self
    }

    pub(crate) fn set_extensions(&mut self, extensions: &[&str]) {
        self.extensions = extensions.iter().map(|e| e.to_ascii_lowercase()).collect();
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    #[must_use]
    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }

    /// Directory the vector index is persisted into.
    #[must_use]
    pub fn index_path(&self) -> PathBuf {
        self.index_dir.join(INDEX_SUBDIR)
    }

    #[must_use]
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// # Errors
    ///
    /// Returns an error if the upload directory cannot be created.
    pub async fn ensure_dirs(&self) -> Result<(), CoreError> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        Ok(())
    }

    /// Names of uploaded files, sorted. Empty when the upload folder is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder exists but cannot be read.
    pub async fn list_files(&self) -> Result<Vec<String>, CoreError> {
        let mut entries = match tokio::fs::read_dir(&self.data_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file()
                && let Some(name) = entry.file_name().to_str()
            {
                names.push(name.to_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Store an uploaded file under its own name. Existing files are never overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidName`] for names that are not a plain file name,
    /// [`CoreError::UnsupportedFormat`] for extensions outside the accepted set,
    /// and [`CoreError::Duplicate`] when a file with that name already exists.
    pub async fn save_upload(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, CoreError> {
        validate_name(name)?;
        if !self.accepts(name) {
            return Err(CoreError::UnsupportedFormat(name.to_owned()));
        }

        self.ensure_dirs().await?;
        let path = self.data_dir.join(name);
        let file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(CoreError::Duplicate(name.to_owned()));
            }
            Err(e) => return Err(e.into()),
        };
        write_or_discard(&path, file, bytes).await?;

        tracing::info!(file = name, bytes = bytes.len(), "stored upload");
        Ok(path)
    }

    /// Delete the index folder and the upload folder, then recreate an empty upload folder.
    ///
    /// # Errors
    ///
    /// Returns an error if either folder exists but cannot be removed.
    pub async fn reset(&self) -> Result<ResetReport, CoreError> {
        let index_removed = remove_dir_if_exists(&self.index_dir).await?;
        let uploads_removed = remove_dir_if_exists(&self.data_dir).await?;
        self.ensure_dirs().await?;
        tracing::info!(index_removed, uploads_removed, "workspace reset");
        Ok(ResetReport {
            index_removed,
            uploads_removed,
        })
    }

    fn accepts(&self, name: &str) -> bool {
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|a| a.eq_ignore_ascii_case(ext)))
    }
}

fn validate_name(name: &str) -> Result<(), CoreError> {
    let invalid = || CoreError::InvalidName(name.to_owned());
    if name.is_empty() || name.len() > 255 || name.starts_with('.') {
        return Err(invalid());
    }
    if name.contains(['/', '\\', '\0']) || name.chars().any(char::is_control) {
        return Err(invalid());
    }
    if Path::new(name).file_name().and_then(|n| n.to_str()) != Some(name) {
        return Err(invalid());
    }
    Ok(())
}

/// Write `bytes` through `writer`, removing the file at `path` if the write fails
/// so a partial upload never blocks a retry.
async fn write_or_discard<W: AsyncWrite + Unpin>(
    path: &Path,
    mut writer: W,
    bytes: &[u8],
) -> Result<(), CoreError> {
    let written = async {
        writer.write_all(bytes).await?;
        writer.flush().await
    }
    .await;
    drop(writer);

    if let Err(e) = written {
        if let Err(rm) = tokio::fs::remove_file(path).await {
            tracing::warn!(path = %path.display(), "failed to remove partial upload: {rm}");
        }
        return Err(e.into());
    }
    Ok(())
}

async fn remove_dir_if_exists(dir: &Path) -> Result<bool, CoreError> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use super::*;

    struct FailingWriter;

    impl AsyncWrite for FailingWriter {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            Poll::Ready(Err(std::io::Error::other("disk full")))
        }

        fn poll_flush(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    fn workspace(root: &Path) -> DocumentWorkspace {
        DocumentWorkspace::new(root.join("data"), root.join("db"))
    }

    #[tokio::test]
    async fn list_missing_folder_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        assert!(ws.list_files().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_and_list_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        ws.save_upload("b.pdf", b"%PDF-b").await.unwrap();
        let path = ws.save_upload("a.pdf", b"%PDF-a").await.unwrap();

        assert_eq!(path, dir.path().join("data").join("a.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-a");
        assert_eq!(ws.list_files().await.unwrap(), vec!["a.pdf", "b.pdf"]);
    }

    #[tokio::test]
    async fn duplicate_upload_keeps_first_file() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        ws.save_upload("doc.pdf", b"first").await.unwrap();

        let err = ws.save_upload("doc.pdf", b"second").await.unwrap_err();
        assert!(matches!(err, CoreError::Duplicate(ref n) if n == "doc.pdf"));
        let stored = std::fs::read(dir.path().join("data/doc.pdf")).unwrap();
        assert_eq!(stored, b"first");
    }

    #[tokio::test]
    async fn failed_write_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        ws.ensure_dirs().await.unwrap();
        let path = ws.data_dir().join("doc.pdf");
        std::fs::write(&path, b"%PD").unwrap();

        let err = write_or_discard(&path, FailingWriter, b"%PDF-1.7")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Io(_)));
        assert!(!path.exists());
        assert!(ws.list_files().await.unwrap().is_empty());

        ws.save_upload("doc.pdf", b"%PDF-1.7").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7");
    }

    #[tokio::test]
    async fn rejects_path_like_names() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        for name in ["", "../x.pdf", "a/b.pdf", "a\\b.pdf", ".hidden.pdf", "..", "x\0.pdf"] {
            let err = ws.save_upload(name, b"x").await.unwrap_err();
            assert!(matches!(err, CoreError::InvalidName(_)), "{name:?}");
        }
    }

    #[tokio::test]
    async fn rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        let err = ws.save_upload("notes.txt", b"x").await.unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedFormat(_)));
        ws.save_upload("REPORT.PDF", b"x").await.unwrap();
    }

    #[tokio::test]
    async fn custom_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path()).with_extensions(&["txt", "md"]);
        ws.save_upload("notes.txt", b"x").await.unwrap();
        assert!(ws.save_upload("paper.pdf", b"x").await.is_err());
    }

    #[tokio::test]
    async fn reset_removes_both_folders() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        ws.save_upload("doc.pdf", b"x").await.unwrap();
        std::fs::create_dir_all(ws.index_path()).unwrap();
        std::fs::write(ws.index_path().join("index.json"), "{}").unwrap();

        let report = ws.reset().await.unwrap();
        assert_eq!(
            report,
            ResetReport {
                index_removed: true,
                uploads_removed: true
            }
        );
        assert!(!ws.index_dir().exists());
        assert!(ws.data_dir().is_dir());
        assert!(ws.list_files().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reset_on_fresh_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        let report = ws.reset().await.unwrap();
        assert!(!report.index_removed);
        assert!(!report.uploads_removed);
        assert!(ws.data_dir().is_dir());
    }

    #[test]
    fn index_path_is_under_index_dir() {
        let ws = DocumentWorkspace::new("data", "db");
        assert_eq!(ws.index_path(), Path::new("db").join("vector-index"));
    }
}
