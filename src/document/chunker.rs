/// Splits extracted document text into retrieval-sized chunks.
///
/// Paragraphs are packed greedily up to `chunk_size` characters. A paragraph
/// that is itself longer than `chunk_size` is split at word boundaries, with
/// roughly `chunk_overlap` characters carried over between consecutive
/// pieces so sentences cut at a boundary stay retrievable.
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        // An overlap >= chunk_size would stall the sliding window
        let chunk_overlap = chunk_overlap.min(chunk_size.saturating_sub(1));
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap,
        }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();

        for para in text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
            if char_len(para) > self.chunk_size {
                if !current.is_empty() {
                    chunks.push(std::mem::take(&mut current));
                }
                chunks.extend(self.split_long_paragraph(para));
                continue;
            }

            if !current.is_empty() && char_len(&current) + char_len(para) + 2 > self.chunk_size {
                chunks.push(std::mem::take(&mut current));
            }

            if !current.is_empty() {
                current.push_str("\n\n");
            }
            current.push_str(para);
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        chunks
    }

    fn split_long_paragraph(&self, para: &str) -> Vec<String> {
        let words: Vec<&str> = para.split_whitespace().collect();
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < words.len() {
            let mut end = start;
            let mut len = 0;

            while end < words.len() {
                let added = char_len(words[end]) + if len > 0 { 1 } else { 0 };
                if len + added > self.chunk_size && len > 0 {
                    break;
                }
                len += added;
                end += 1;
            }

            chunks.push(words[start..end].join(" "));

            if end == words.len() {
                break;
            }

            // Step the window back to carry an overlapping tail, while
            // guaranteeing forward progress
            let mut overlap_len = 0;
            let mut next_start = end;
            while next_start > start + 1 && overlap_len < self.chunk_overlap {
                next_start -= 1;
                overlap_len += char_len(words[next_start]) + 1;
            }
            start = next_start;
        }

        chunks
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_yields_no_chunks() {
        let chunker = TextChunker::new(1000, 100);
        assert!(chunker.split("").is_empty());
        assert!(chunker.split("  \n\n  ").is_empty());
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunker = TextChunker::new(1000, 100);
        let chunks = chunker.split("A short document.");
        assert_eq!(chunks, vec!["A short document.".to_string()]);
    }

    #[test]
    fn paragraphs_are_packed_up_to_chunk_size() {
        let chunker = TextChunker::new(50, 10);
        let text = "First paragraph here.\n\nSecond paragraph here.\n\nThird paragraph here.";
        let chunks = chunker.split(text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 50, "chunk too long: {:?}", chunk);
        }
    }

    #[test]
    fn long_paragraph_is_split_with_overlap() {
        let chunker = TextChunker::new(60, 20);
        let text = (0..40).map(|i| format!("word{:02}", i)).collect::<Vec<_>>().join(" ");
        let chunks = chunker.split(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 60);
        }

        // Consecutive pieces share their boundary words
        for pair in chunks.windows(2) {
            let tail_word = pair[0].split_whitespace().last().unwrap();
            assert!(
                pair[1].split_whitespace().any(|w| w == tail_word),
                "no overlap between {:?} and {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn all_words_survive_splitting() {
        let chunker = TextChunker::new(40, 8);
        let text = "Alpha beta gamma delta epsilon zeta eta theta iota kappa lambda mu nu xi omicron pi";
        let chunks = chunker.split(text);

        for word in text.split_whitespace() {
            assert!(
                chunks.iter().any(|c| c.split_whitespace().any(|w| w == word)),
                "lost word {:?}",
                word
            );
        }
    }
}
