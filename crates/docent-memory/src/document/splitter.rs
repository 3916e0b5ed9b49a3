use std::collections::VecDeque;

use super::types::{Chunk, Document};

/// Recursive character splitter settings. Sizes are counted in characters.
#[derive(Debug, Clone)]
pub struct SplitterConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Tried in order; the empty separator splits into single characters.
    pub separators: Vec<String>,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 2000,
            chunk_overlap: 300,
            separators: ["\n\n", "\n", " ", ""].map(String::from).to_vec(),
        }
    }
}

pub struct TextSplitter {
    config: SplitterConfig,
}

impl TextSplitter {
    /// `chunk_size` is raised to at least 1 and `chunk_overlap` kept below it.
    #[must_use]
    pub fn new(mut config: SplitterConfig) -> Self {
        config.chunk_size = config.chunk_size.max(1);
        config.chunk_overlap = config.chunk_overlap.min(config.chunk_size - 1);
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    #[must_use]
    pub fn split(&self, document: &Document) -> Vec<Chunk> {
        self.split_text(&document.content)
            .into_iter()
            .enumerate()
            .map(|(i, content)| Chunk {
                content,
                metadata: document.metadata.clone(),
                chunk_index: i,
            })
            .collect()
    }

    #[must_use]
    pub fn split_text(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        self.split_recursive(text, &self.config.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let chunk_size = self.config.chunk_size;

        let sep_idx = separators
            .iter()
            .position(|s| s.is_empty() || text.contains(s.as_str()))
            .unwrap_or(separators.len().saturating_sub(1));
        let separator = separators.get(sep_idx).map_or("", String::as_str);
        let remaining = separators.get(sep_idx + 1..).unwrap_or(&[]);

        let pieces: Vec<&str> = if separator.is_empty() {
            split_chars(text)
        } else {
            text.split(separator).filter(|s| !s.is_empty()).collect()
        };

        let mut chunks = Vec::new();
        let mut fitting: Vec<&str> = Vec::new();
        for piece in pieces {
            if char_len(piece) <= chunk_size {
                fitting.push(piece);
                continue;
            }
            if !fitting.is_empty() {
                chunks.extend(self.merge_pieces(&fitting, separator));
                fitting.clear();
            }
            if remaining.is_empty() {
                let trimmed = piece.trim();
                if !trimmed.is_empty() {
                    chunks.push(trimmed.to_owned());
                }
            } else {
                chunks.extend(self.split_recursive(piece, remaining));
            }
        }
        if !fitting.is_empty() {
            chunks.extend(self.merge_pieces(&fitting, separator));
        }
        chunks
    }

    /// Merge pieces that each fit into chunks of at most `chunk_size` characters,
    /// carrying up to `chunk_overlap` characters of trailing pieces forward.
    fn merge_pieces(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let chunk_size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;
        let sep_len = char_len(separator);

        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0;

        for &piece in pieces {
            let len = char_len(piece);
            let joined_len = |total: usize, window: &VecDeque<&str>| {
                total + len + if window.is_empty() { 0 } else { sep_len }
            };

            if joined_len(total, &window) > chunk_size && !window.is_empty() {
                push_joined(&mut chunks, &window, separator);

                while total > overlap || (joined_len(total, &window) > chunk_size && total > 0) {
                    let Some(front) = window.pop_front() else {
                        break;
                    };
                    total -= char_len(front) + if window.is_empty() { 0 } else { sep_len };
                }
            }

            total += len + if window.is_empty() { 0 } else { sep_len };
            window.push_back(piece);
        }

        push_joined(&mut chunks, &window, separator);
        chunks
    }
}

fn push_joined(chunks: &mut Vec<String>, window: &VecDeque<&str>, separator: &str) {
    let joined = window.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_owned());
    }
}

fn split_chars(text: &str) -> Vec<&str> {
    text.char_indices()
        .map(|(i, c)| &text[i..i + c.len_utf8()])
        .collect()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
