//! Text segmentation utilities for indexing source-code repositories.
//!
//! This crate turns raw file content into bounded, line-addressed chunks suitable
//! for embedding and retrieval. It has two halves:
//!
//! - [`chunk`]: the [`Chunker`](chunk::Chunker), which splits a file into
//!   [`CodeChunk`](chunk::CodeChunk)s. Files recognized as program source are split
//!   along a brace-depth heuristic so chunks tend to end at block boundaries; any
//!   other text is split purely by accumulated size. Consecutive chunks share a
//!   small line-level overlap so content spanning a cut point stays retrievable
//!   from either neighbor.
//! - [`extract`]: a small pre-step that rejects known binary formats and decodes
//!   base64-transported blobs before chunking is attempted.
//!
//! The heuristic is deliberately not a parser. Chunk boundaries are best-effort:
//! the goal is that most chunks are self-contained enough to embed well, not that
//! every boundary is semantically exact.
//!
//! ```
//! use gitchat_context::chunk::Chunker;
//!
//! let chunker = Chunker::default();
//! let chunks = chunker.chunk("fn main() {\n    println!(\"hi\");\n}\n", "src/main.rs");
//! assert!(!chunks.is_empty());
//! assert_eq!(chunks[0].start_line, 1);
//! ```

pub mod chunk;
pub mod extract;

pub use chunk::{CodeChunk, Chunker};
pub use extract::extract_text;
