pub mod error;
pub mod folder;
pub mod loader;
pub mod splitter;
pub mod types;

pub use error::DocumentError;
pub use folder::{concat_documents, load_folder};
pub use loader::TextLoader;
pub use splitter::{SplitterConfig, TextSplitter};
pub use types::{Chunk, Document, DocumentMetadata};

#[cfg(feature = "pdf")]
pub use loader::PdfLoader;

/// Default maximum file size: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

pub trait DocumentLoader: Send + Sync {
    fn load(
        &self,
        path: &std::path::Path,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Vec<Document>, DocumentError>> + Send + '_>,
    >;

    fn supported_extensions(&self) -> &[&str];

    /// Whether `path` has an extension this loader handles (case-insensitive).
    fn supports(&self, path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                self.supported_extensions()
                    .iter()
                    .any(|s| s.eq_ignore_ascii_case(ext))
            })
    }
}
