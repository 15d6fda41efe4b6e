//! The in-memory inverted index populated during ingestion.

use std::collections::HashMap;
use std::sync::Mutex;

/// One indexed news item. Identity, equality, and ordering are all defined
/// on the `(title, url)` pair; the derived `Ord` is also the tie-break order
/// used when ranking query results.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Article {
    pub title: String,
    pub url: String,
}

/// Thread-safe mapping from token to the articles mentioning it.
///
/// Writers merge under one coarse lock. The lock is held only for the
/// in-memory merge, never across I/O.
#[derive(Debug, Default)]
pub struct TokenIndex {
    postings: Mutex<HashMap<String, HashMap<Article, usize>>>,
}

impl TokenIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of each token in `tokens` against `article`.
    /// Repeated tokens within a call and repeated calls for the same article
    /// both accumulate.
    pub fn add(&self, article: &Article, tokens: &[String]) {
        if tokens.is_empty() {
            return;
        }
        let mut postings = self.postings.lock().expect("index lock poisoned");
        for token in tokens {
            *postings
                .entry(token.clone())
                .or_default()
                .entry(article.clone())
                .or_insert(0) += 1;
        }
    }

    /// Articles mentioning `query`, most frequent first, ties broken by
    /// `(title, url)` so results are deterministic. The query is lowercased
    /// the same way the tokenizer lowercases article text; an unknown token
    /// yields an empty vector.
    pub fn matching(&self, query: &str) -> Vec<(Article, usize)> {
        let token = query.to_lowercase();
        let mut matches: Vec<(Article, usize)> = {
            let postings = self.postings.lock().expect("index lock poisoned");
            postings
                .get(&token)
                .map(|by_article| {
                    by_article
                        .iter()
                        .map(|(article, count)| (article.clone(), *count))
                        .collect()
                })
                .unwrap_or_default()
        };
        matches.sort_by(|(a, a_count), (b, b_count)| {
            b_count.cmp(a_count).then_with(|| a.cmp(b))
        });
        matches
    }

    /// Number of distinct tokens indexed so far.
    pub fn token_count(&self) -> usize {
        self.postings.lock().expect("index lock poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn article(title: &str, url: &str) -> Article {
        Article {
            title: title.to_string(),
            url: url.to_string(),
        }
    }

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn repeated_tokens_in_one_call_accumulate() {
        let index = TokenIndex::new();
        let a1 = article("t1", "u1");
        index.add(&a1, &tokens(&["alpha", "beta", "alpha"]));

        assert_eq!(index.matching("alpha"), vec![(a1.clone(), 2)]);
        assert_eq!(index.matching("beta"), vec![(a1, 1)]);
        assert_eq!(index.matching("gamma"), vec![]);
    }

    #[test]
    fn split_adds_equal_one_combined_add() {
        let split = TokenIndex::new();
        let combined = TokenIndex::new();
        let a = article("t", "u");

        split.add(&a, &tokens(&["x", "y", "x"]));
        split.add(&a, &tokens(&["y", "z"]));
        combined.add(&a, &tokens(&["x", "y", "x", "y", "z"]));

        for token in ["x", "y", "z"] {
            assert_eq!(split.matching(token), combined.matching(token));
        }
    }

    #[test]
    fn ranks_by_descending_count() {
        let index = TokenIndex::new();
        let a1 = article("t1", "u1");
        let a2 = article("t2", "u2");
        index.add(&a1, &tokens(&["x", "x"]));
        index.add(&a2, &tokens(&["x"]));

        assert_eq!(index.matching("x"), vec![(a1, 2), (a2, 1)]);
    }

    #[test]
    fn equal_counts_tie_break_on_title_then_url() {
        let index = TokenIndex::new();
        let c = article("banana", "u3");
        let b = article("apple", "u2");
        let a = article("apple", "u1");
        for art in [&c, &b, &a] {
            index.add(art, &tokens(&["q"]));
        }

        assert_eq!(index.matching("q"), vec![(a, 1), (b, 1), (c, 1)]);
    }

    #[test]
    fn same_title_different_url_are_distinct_articles() {
        let index = TokenIndex::new();
        let a = article("t", "u1");
        let b = article("t", "u2");
        index.add(&a, &tokens(&["w"]));
        index.add(&b, &tokens(&["w"]));

        assert_eq!(index.matching("w"), vec![(a, 1), (b, 1)]);
    }

    #[test]
    fn query_is_case_folded_like_article_text() {
        let index = TokenIndex::new();
        let a = article("t", "u");
        index.add(&a, &tokens(&["rust"]));

        assert_eq!(index.matching("Rust"), vec![(a, 1)]);
    }

    #[test]
    fn empty_token_slice_changes_nothing() {
        let index = TokenIndex::new();
        index.add(&article("t", "u"), &[]);
        assert_eq!(index.token_count(), 0);
    }

    #[test]
    fn concurrent_adds_conserve_every_occurrence() {
        const WRITERS: usize = 8;
        const CALLS_PER_WRITER: usize = 50;

        let index = TokenIndex::new();
        std::thread::scope(|scope| {
            for writer in 0..WRITERS {
                let index = &index;
                scope.spawn(move || {
                    let own = article(&format!("t{writer}"), &format!("u{writer}"));
                    let shared = article("shared", "us");
                    for _ in 0..CALLS_PER_WRITER {
                        index.add(&own, &tokens(&["common", "common"]));
                        index.add(&shared, &tokens(&["common"]));
                    }
                });
            }
        });

        let matches = index.matching("common");
        assert_eq!(matches.len(), WRITERS + 1);
        let total: usize = matches.iter().map(|(_, count)| count).sum();
        // Each writer contributes 2 per call to its own article and all of
        // them contribute 1 per call to the shared one.
        assert_eq!(total, WRITERS * CALLS_PER_WRITER * 3);
        let shared_count = matches
            .iter()
            .find(|(a, _)| a.title == "shared")
            .map(|(_, count)| *count);
        assert_eq!(shared_count, Some(WRITERS * CALLS_PER_WRITER));
    }
}
