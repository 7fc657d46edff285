
// imports
use crate::error::Result;
use crate::loader::CorpusLoader;
use crate::text::{clean_sentence, segment, Normalizer, Tokenizer, WhitespaceTokenizer};

use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// The training corpus: one token sequence per segmented sentence, in order.
/// Sentences that cleaned down to nothing are kept as empty sequences.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Corpus {
    sentences: Vec<Vec<String>>,
}

impl Corpus {

    pub fn new(sentences: Vec<Vec<String>>) -> Self {
        Self { sentences }
    }

    pub fn from_text(raw: &str, preamble_offset: usize) -> Corpus {
        Corpus::from_text_with(raw, preamble_offset, &WhitespaceTokenizer)
    }

    pub fn from_text_with<T: Tokenizer>(raw: &str, preamble_offset: usize, tokenizer: &T) -> Corpus {

        let normalized = Normalizer::new(preamble_offset).normalize(raw);
        let sentences = segment(&normalized)
            .into_iter()
            .map(|sentence| tokenizer.tokenize(&clean_sentence(sentence)))
            .collect();

        Corpus { sentences }
    }

    pub fn from_dir(dir: impl AsRef<Path>, extension: &str, preamble_offset: usize) -> Result<Corpus> {

        let loaded = CorpusLoader::new(dir.as_ref(), extension).load()?;

        // no matching files is an empty corpus, not a single empty sentence
        if loaded.files.is_empty() {
            return Ok(Corpus::default());
        }
        let corpus = Corpus::from_text(&loaded.text, preamble_offset);

        info!(
            "built corpus of {} sentences ({} empty), {} tokens",
            corpus.len(),
            corpus.empty_sentences(),
            corpus.token_count()
        );
        Ok(corpus)
    }

    pub fn sentences(&self) -> &[Vec<String>] {
        &self.sentences
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn token_count(&self) -> usize {
        self.sentences.iter().map(|s| s.len()).sum()
    }

    pub fn empty_sentences(&self) -> usize {
        self.sentences.iter().filter(|s| s.is_empty()).count()
    }

    /// How many times each token appears in the corpus.
    pub fn token_counts(&self) -> HashMap<String, usize> {
        let mut token2count: HashMap<String, usize> = HashMap::new();
        for tok in self.sentences.iter().flatten() {
            *token2count.entry(tok.to_owned()).or_insert(0) += 1;
        }
        token2count
    }
}
