//! Splitting file content into bounded, line-addressed chunks.

use serde::{Deserialize, Serialize};

/// File extensions treated as program source, enabling the brace-depth heuristic.
const SOURCE_EXTENSIONS: &[&str] = &[
    "js", "ts", "jsx", "tsx", "py", "java", "cpp", "c", "go", "rs", "rb", "php", "swift", "kt",
];

/// A bounded slice of a file's text content, addressed by line range.
///
/// Identity is structural: `file_path` plus the line range. Chunks are produced
/// only by [`Chunker::chunk`] and are immutable once created. Line numbers are
/// 1-based and inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeChunk {
    /// The text content of this chunk.
    pub content: String,
    /// Path of the source file within the repository.
    pub file_path: String,
    /// First line of the chunk (1-based).
    pub start_line: usize,
    /// Last line of the chunk (1-based, inclusive).
    pub end_line: usize,
    /// Language tag (file extension) for chunks cut from recognized source files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Splits file content into chunks bounded by a maximum character size.
///
/// For recognized source files the splitter scans line by line, keeping a running
/// brace-depth counter, and emits a boundary when the depth returns to zero on a
/// line that closes a block, when the accumulated text reaches `max_chunk_size`,
/// or at end of file. Other text files are split purely by accumulated size.
///
/// After each boundary the next chunk is seeded with the trailing
/// `overlap / 10` lines of the chunk just closed, so content spanning a cut
/// point remains retrievable from either neighbor.
#[derive(Debug, Clone)]
pub struct Chunker {
    max_chunk_size: usize,
    overlap: usize,
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            max_chunk_size: 500,
            overlap: 50,
        }
    }
}

impl Chunker {
    /// Create a chunker with an explicit size bound and overlap window.
    ///
    /// `max_chunk_size` is the accumulated character count that forces a
    /// boundary; `overlap` is a character budget whose tenth (in lines) seeds
    /// the next chunk.
    pub fn new(max_chunk_size: usize, overlap: usize) -> Self {
        Self {
            max_chunk_size,
            overlap,
        }
    }

    /// Split `content` into ordered chunks. Empty input produces no chunks.
    pub fn chunk(&self, content: &str, file_path: &str) -> Vec<CodeChunk> {
        if content.is_empty() {
            return Vec::new();
        }

        let lines: Vec<&str> = content.split('\n').collect();
        match source_extension(file_path) {
            Some(ext) => self.chunk_source(&lines, file_path, ext),
            None => self.chunk_plain(&lines, file_path),
        }
    }

    /// Number of trailing lines carried over into the next chunk.
    fn overlap_lines(&self, chunk_len: usize) -> usize {
        (self.overlap / 10).min(chunk_len)
    }

    fn chunk_source(&self, lines: &[&str], file_path: &str, ext: &str) -> Vec<CodeChunk> {
        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut current_size = 0usize;
        let mut start_line = 0usize;
        let mut brace_depth = 0i64;

        for (i, line) in lines.iter().enumerate() {
            if !current.is_empty() {
                current_size += 1; // joining newline
            }
            current.push(line);
            current_size += line.len();

            for ch in line.chars() {
                match ch {
                    '{' => brace_depth += 1,
                    '}' => brace_depth -= 1,
                    _ => {}
                }
            }

            let block_complete = brace_depth == 0 && line.trim().ends_with('}');
            let exceeds_size = current_size >= self.max_chunk_size;
            let end_of_file = i == lines.len() - 1;

            if block_complete || exceeds_size || end_of_file {
                chunks.push(CodeChunk {
                    content: current.join("\n"),
                    file_path: file_path.to_string(),
                    start_line: start_line + 1,
                    end_line: i + 1,
                    language: Some(ext.to_string()),
                });

                let keep = self.overlap_lines(current.len());
                current = current[current.len() - keep..].to_vec();
                current_size = joined_len(&current);
                start_line = i + 1 - keep;
                brace_depth = 0;
            }
        }

        // A file ending mid-block leaves a residual buffer that was never flushed
        // on a boundary of its own. Flush it if it is the only chunk or carries
        // more than trivial content.
        let residual = current.join("\n");
        if (!current.is_empty() && chunks.is_empty()) || residual.trim().len() > 50 {
            chunks.push(CodeChunk {
                content: residual,
                file_path: file_path.to_string(),
                start_line: start_line + 1,
                end_line: lines.len(),
                language: Some(ext.to_string()),
            });
        }

        chunks
    }

    fn chunk_plain(&self, lines: &[&str], file_path: &str) -> Vec<CodeChunk> {
        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut current_size = 0usize;
        let mut start_line = 0usize;

        for (i, line) in lines.iter().enumerate() {
            if !current.is_empty() {
                current_size += 1;
            }
            current.push(line);
            current_size += line.len();

            if current_size >= self.max_chunk_size || i == lines.len() - 1 {
                chunks.push(CodeChunk {
                    content: current.join("\n"),
                    file_path: file_path.to_string(),
                    start_line: start_line + 1,
                    end_line: i + 1,
                    language: None,
                });

                let keep = self.overlap_lines(current.len());
                current = current[current.len() - keep..].to_vec();
                current_size = joined_len(&current);
                start_line = i + 1 - keep;
            }
        }

        chunks
    }
}

fn joined_len(lines: &[&str]) -> usize {
    lines.iter().map(|l| l.len()).sum::<usize>() + lines.len().saturating_sub(1)
}

/// Returns the extension if the path names a recognized source file.
fn source_extension(file_path: &str) -> Option<&str> {
    let ext = file_path.rsplit('.').next()?;
    if std::path::Path::new(file_path).extension().is_none() {
        return None;
    }
    SOURCE_EXTENSIONS
        .iter()
        .find(|&&known| known.eq_ignore_ascii_case(ext))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker() -> Chunker {
        Chunker::default()
    }

    #[test]
    fn empty_content_produces_no_chunks() {
        assert!(chunker().chunk("", "src/main.rs").is_empty());
        assert!(chunker().chunk("", "README.md").is_empty());
    }

    #[test]
    fn short_source_file_is_a_single_leading_chunk() {
        let content = "fn add(a: i32, b: i32) -> i32 {\n    a + b\n}";
        let chunks = chunker().chunk(content, "src/math.rs");

        assert_eq!(chunks[0].content, content);
        assert_eq!(chunks[0].start_line, 1);
        assert_eq!(chunks[0].end_line, 3);
        assert_eq!(chunks[0].language.as_deref(), Some("rs"));
    }

    #[test]
    fn source_boundary_at_closed_block() {
        let content = "fn a() {\n    one();\n}\nfn b() {\n    two();\n}";
        let chunks = chunker().chunk(content, "lib.rs");

        // First boundary fires when the brace depth returns to zero on line 3.
        assert_eq!(chunks[0].end_line, 3);
        assert!(chunks[0].content.contains("fn a()"));
        assert!(chunks.iter().any(|c| c.content.contains("fn b()")));
    }

    #[test]
    fn long_single_function_splits_with_overlap() {
        // ~1200 characters inside one unterminated block: only the size bound
        // can force boundaries.
        let mut content = String::from("fn big() {\n");
        for i in 0..30 {
            content.push_str(&format!("    let value_{i} = compute_something({i});\n"));
        }
        content.push('}');

        let chunks = chunker().chunk(&content, "src/big.rs");
        assert!(chunks.len() >= 2, "expected a split, got {}", chunks.len());

        // Tail lines of each chunk reappear at the head of its successor.
        for pair in chunks.windows(2) {
            let first: Vec<&str> = pair[0].content.split('\n').collect();
            let second: Vec<&str> = pair[1].content.split('\n').collect();
            let overlap = pair[0].end_line + 1 - pair[1].start_line;
            assert!(overlap > 0, "consecutive chunks should share lines");
            assert_eq!(&first[first.len() - overlap..], &second[..overlap]);
        }
    }

    #[test]
    fn line_coverage_is_exact_at_first_occurrence() {
        let content = (0..40)
            .map(|i| format!("line number {i} with some padding text"))
            .collect::<Vec<_>>()
            .join("\n");
        let chunks = chunker().chunk(&content, "notes.txt");
        let total_lines = content.split('\n').count();

        // Every line appears, in order, at the first chunk that reaches it.
        let mut next_uncovered = 1;
        for chunk in &chunks {
            assert!(chunk.start_line <= next_uncovered);
            assert!(chunk.end_line >= chunk.start_line);
            if chunk.end_line >= next_uncovered {
                next_uncovered = chunk.end_line + 1;
            }
        }
        assert_eq!(next_uncovered, total_lines + 1);
    }

    #[test]
    fn plain_text_ignores_braces() {
        let content = "some notes { with braces }\n".repeat(30);
        let chunks = chunker().chunk(&content, "NOTES.md");

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.language.is_none()));
    }

    #[test]
    fn residual_buffer_is_flushed_when_file_ends_mid_block() {
        let mut content = String::from("fn unterminated() {\n");
        for i in 0..20 {
            content.push_str(&format!("    step_{i}();\n"));
        }
        // No closing brace: the last boundary is forced by end-of-file, and the
        // overlap reseed leaves a residual buffer behind.
        let chunks = chunker().chunk(&content, "src/partial.rs");

        assert!(!chunks.is_empty());
        assert_eq!(chunks.last().unwrap().end_line, content.split('\n').count());
    }

    #[test]
    fn extension_detection_is_case_insensitive() {
        let chunks = chunker().chunk("class A {\n}\n", "Main.JAVA");
        assert_eq!(chunks[0].language.as_deref(), Some("java"));
    }

    #[test]
    fn no_extension_falls_back_to_plain_chunking() {
        let chunks = chunker().chunk("target: build {\n}\n", "Makefile");
        assert!(chunks.iter().all(|c| c.language.is_none()));
    }
}
