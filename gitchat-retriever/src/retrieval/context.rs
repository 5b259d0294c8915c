//! Renders retrieved chunks into the prompt context block.

use super::retriever::RetrievalMatch;

/// Format matches for inclusion in a chat prompt.
///
/// Returns the empty string when there is nothing to show, so callers can
/// append the result unconditionally. Snippets are numbered in rank order and
/// separated by a horizontal rule the generation model can key on.
pub fn format_matches(matches: &[RetrievalMatch]) -> String {
    if matches.is_empty() {
        return String::new();
    }

    let parts: Vec<String> = matches
        .iter()
        .enumerate()
        .map(|(index, m)| {
            format!(
                "[Code Snippet {}]\nFile: {}\nLines: {}-{}\n{}",
                index + 1,
                m.chunk.file_path,
                m.chunk.start_line,
                m.chunk.end_line,
                m.chunk.content
            )
        })
        .collect();

    format!(
        "\n\n## Relevant Code Context:\n{}",
        parts.join("\n\n---\n\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ChunkMetadata;

    fn sample(file_path: &str, start: usize, end: usize, content: &str) -> RetrievalMatch {
        RetrievalMatch {
            score: 0.9,
            chunk: ChunkMetadata {
                repo_id: "o/r".to_string(),
                file_path: file_path.to_string(),
                start_line: start,
                end_line: end,
                content: content.to_string(),
                language: Some("rs".to_string()),
            },
        }
    }

    #[test]
    fn empty_matches_render_nothing() {
        assert_eq!(format_matches(&[]), "");
    }

    #[test]
    fn renders_numbered_snippets_with_separator() {
        let matches = vec![
            sample("src/lib.rs", 1, 4, "pub fn a() {}"),
            sample("src/main.rs", 10, 12, "fn main() {}"),
        ];

        let rendered = format_matches(&matches);
        assert_eq!(
            rendered,
            "\n\n## Relevant Code Context:\n\
             [Code Snippet 1]\nFile: src/lib.rs\nLines: 1-4\npub fn a() {}\
             \n\n---\n\n\
             [Code Snippet 2]\nFile: src/main.rs\nLines: 10-12\nfn main() {}"
        );
    }

    #[test]
    fn single_match_has_no_separator() {
        let rendered = format_matches(&[sample("a.rs", 1, 1, "x")]);
        assert!(!rendered.contains("---"));
        assert!(rendered.starts_with("\n\n## Relevant Code Context:\n[Code Snippet 1]"));
    }
}
