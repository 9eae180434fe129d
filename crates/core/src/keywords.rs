//! Frequency-based keyword extraction over study material.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tokens shorter than this are ignored.
pub const MIN_KEYWORD_LEN: usize = 3;

const STOPWORDS: &[&str] = &[
    "about", "above", "after", "again", "all", "also", "and", "any", "are", "because", "been",
    "before", "being", "between", "both", "but", "can", "could", "did", "does", "doing", "down",
    "during", "each", "few", "for", "from", "further", "had", "has", "have", "having", "her",
    "here", "hers", "him", "his", "how", "into", "its", "itself", "just", "more", "most", "not",
    "now", "off", "once", "only", "other", "our", "ours", "out", "over", "own", "same", "she",
    "should", "some", "such", "than", "that", "the", "their", "them", "then", "there", "these",
    "they", "this", "those", "through", "too", "under", "until", "very", "was", "were", "what",
    "when", "where", "which", "while", "who", "whom", "why", "will", "with", "would", "you",
    "your", "yours",
];

/// A word and how often it appears.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub word: String,
    pub count: usize,
}

fn is_stopword(word: &str) -> bool {
    STOPWORDS.binary_search(&word).is_ok()
}

/// Return up to `limit` of the most frequent non-stopword terms in `text`.
///
/// Words are lowercased and split on anything that is not alphanumeric.
/// Ordering is by descending count, then alphabetically.
#[must_use]
pub fn extract_keywords(text: &str, limit: usize) -> Vec<Keyword> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= MIN_KEYWORD_LEN)
    {
        let word = token.to_lowercase();
        if is_stopword(&word) || word.chars().all(|c| c.is_numeric()) {
            continue;
        }
        *counts.entry(word).or_insert(0) += 1;
    }

    let mut keywords: Vec<Keyword> = counts
        .into_iter()
        .map(|(word, count)| Keyword { word, count })
        .collect();
    keywords.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    keywords.truncate(limit);
    keywords
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopword_table_is_sorted() {
        let mut sorted = STOPWORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, STOPWORDS);
    }

    #[test]
    fn ranks_by_frequency_then_alphabet() {
        let text = "Photosynthesis converts light. Light energy drives photosynthesis; \
                    chlorophyll absorbs light.";
        let words: Vec<_> = extract_keywords(text, 4)
            .into_iter()
            .map(|k| (k.word, k.count))
            .collect();
        assert_eq!(
            words,
            vec![
                ("light".to_string(), 3),
                ("photosynthesis".to_string(), 2),
                ("absorbs".to_string(), 1),
                ("chlorophyll".to_string(), 1),
            ]
        );
    }

    #[test]
    fn drops_stopwords_short_tokens_and_numbers() {
        let kws = extract_keywords("The cat and the dog in 2024 was there, ok?", 10);
        let words: Vec<_> = kws.iter().map(|k| k.word.as_str()).collect();
        assert_eq!(words, vec!["cat", "dog"]);
    }

    #[test]
    fn empty_text_and_zero_limit() {
        assert!(extract_keywords("", 5).is_empty());
        assert!(extract_keywords("memory memory", 0).is_empty());
    }
}
