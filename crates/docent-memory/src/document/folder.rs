use std::path::Path;

use super::{Document, DocumentError, DocumentLoader};

/// Load every file in `dir` the loader supports, in file-name order.
///
/// # Errors
///
/// Returns [`DocumentError::NotFound`] when `dir` is missing, empty, or holds no
/// supported file, and propagates loader failures.
pub async fn load_folder(
    dir: &Path,
    loader: &(dyn DocumentLoader + '_),
) -> Result<Vec<Document>, DocumentError> {
    let not_found = || DocumentError::NotFound(dir.display().to_string());

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
        Err(e) => return Err(e.into()),
    };

    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();

    let supported: Vec<_> = paths.iter().filter(|p| loader.supports(p)).collect();
    if supported.is_empty() {
        return Err(not_found());
    }
    if supported.len() < paths.len() {
        tracing::debug!(
            skipped = paths.len() - supported.len(),
            "ignoring files with unsupported extensions"
        );
    }

    let mut documents = Vec::new();
    for path in supported {
        documents.extend(loader.load(path).await?);
    }
    Ok(documents)
}

/// Concatenate document texts in order, without separators.
#[must_use]
pub fn concat_documents(documents: &[Document]) -> String {
    let total = documents.iter().map(|d| d.content.len()).sum();
    documents
        .iter()
        .fold(String::with_capacity(total), |mut acc, d| {
            acc.push_str(&d.content);
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TextLoader;

    #[tokio::test]
    async fn missing_dir_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("data");
        let result = load_folder(&missing, &TextLoader::default()).await;
        assert!(matches!(result, Err(DocumentError::NotFound(_))));
    }

    #[tokio::test]
    async fn empty_dir_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_folder(dir.path(), &TextLoader::default()).await;
        assert!(matches!(result, Err(DocumentError::NotFound(_))));
    }

    #[tokio::test]
    async fn only_unsupported_files_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("image.png"), b"png").unwrap();
        let result = load_folder(dir.path(), &TextLoader::default()).await;
        assert!(matches!(result, Err(DocumentError::NotFound(_))));
    }

    #[tokio::test]
    async fn loads_in_name_order_and_skips_others() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "second").unwrap();
        std::fs::write(dir.path().join("a.txt"), "first").unwrap();
        std::fs::write(dir.path().join("c.png"), "skip").unwrap();
        std::fs::create_dir(dir.path().join("nested.txt")).unwrap();

        let docs = load_folder(dir.path(), &TextLoader::default())
            .await
            .unwrap();
        let contents: Vec<_> = docs.iter().map(|d| d.content.as_str()).collect();
        assert_eq!(contents, ["first", "second"]);
        assert_eq!(concat_documents(&docs), "firstsecond");
    }

    #[test]
    fn concat_empty() {
        assert!(concat_documents(&[]).is_empty());
    }
}
