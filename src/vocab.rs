
// imports
use crate::corpus::Corpus;

use std::collections::HashMap;
use tracing::info;

/// Tokens eligible for training, indexed by descending frequency.
#[derive(Clone, Debug, Default)]
pub struct Vocab {
    t2i: HashMap<String, usize>,
    i2t: Vec<String>,
    counts: Vec<usize>,
    min_count: usize,
}

impl Vocab {

    pub fn build(corpus: &Corpus, min_count: usize) -> Vocab {
        Vocab::from_counts(corpus.token_counts(), min_count)
    }

    pub fn from_counts(token2count: HashMap<String, usize>, min_count: usize) -> Vocab {

        // keep tokens seen at least min_count times, most common first,
        // ties broken alphabetically so indexes do not depend on hashing order
        let total = token2count.len();
        let mut tup = token2count
        .into_iter()
        .filter(|(_, v)| *v >= min_count)
        .collect::<Vec<(String, usize)>>();
        tup.sort_by(|(a, x), (b, y)| y.cmp(x).then_with(|| a.cmp(b)));

        let mut vocab = Vocab { min_count, ..Vocab::default() };
        for (i, (tok, count)) in tup.into_iter().enumerate() {
            vocab.t2i.insert(tok.clone(), i);
            vocab.i2t.push(tok);
            vocab.counts.push(count);
        }

        info!("using {} tokens with min_count {} out of {}", vocab.len(), min_count, total);
        vocab
    }

    pub fn len(&self) -> usize {
        self.i2t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.i2t.is_empty()
    }

    pub fn index(&self, token: &str) -> Option<usize> {
        self.t2i.get(token).copied()
    }

    pub fn token(&self, i: usize) -> Option<&str> {
        self.i2t.get(i).map(|t| t.as_str())
    }

    pub fn min_count(&self) -> usize {
        self.min_count
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub fn tokens(&self) -> &[String] {
        &self.i2t
    }

    pub fn t2i(&self) -> &HashMap<String, usize> {
        &self.t2i
    }

    /// Maps a sentence to vocabulary indexes, skipping unknown tokens.
    pub fn encode(&self, sentence: &[String]) -> Vec<usize> {
        sentence.iter().filter_map(|tok| self.index(tok)).collect()
    }
}


#[cfg(test)]
mod tests {

    use super::*;

    fn corpus() -> Corpus {
        Corpus::from_text("A cat and a dog. A cat! The end", 0)
    }

    #[test]
    fn orders_by_frequency_then_token() {

        let vocab = Vocab::build(&corpus(), 1);
        assert_eq!(vocab.tokens(), ["a", "cat", "and", "dog", "end", "the"]);
        assert_eq!(vocab.counts(), [3, 2, 1, 1, 1, 1]);
        assert_eq!(vocab.index("cat"), Some(1));
        assert_eq!(vocab.token(0), Some("a"));
    }

    #[test]
    fn respects_min_count() {

        let vocab = Vocab::build(&corpus(), 2);
        assert_eq!(vocab.tokens(), ["a", "cat"]);
        assert_eq!(vocab.index("dog"), None);

        let sentence: Vec<String> = ["a", "dog", "cat"].iter().map(|s| s.to_string()).collect();
        assert_eq!(vocab.encode(&sentence), vec![0, 1]);

        assert!(Vocab::build(&corpus(), 10).is_empty());
    }
}
