//! Document ingestion primitives: loaders, a recursive text splitter, and a
//! flat vector index persisted wholesale to disk.

pub mod document;
pub mod index;

#[cfg(feature = "pdf")]
pub use document::PdfLoader;
pub use document::{
    Chunk, Document, DocumentError, DocumentLoader, SplitterConfig, TextLoader, TextSplitter,
};
pub use index::{IndexEntry, IndexError, IndexManifest, ScoredChunk, VectorIndex};
