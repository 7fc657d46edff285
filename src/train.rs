

use ndarray::prelude::*;
use ndarray::Array;
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::config::{Objective, TrainParams};
use crate::corpus::Corpus;
use crate::error::{Error, Result};
use crate::vocab::Vocab;
use std::ops::AddAssign;
use std::time::Instant;
use tracing::{debug, info};

// scores are clamped to [-MAX_EXP, MAX_EXP] before the sigmoid
const MAX_EXP: f32 = 6.0;
const NOISE_POWER: f64 = 0.75;
const LOG_EPS: f32 = 1e-7;


/// Word2vec with negative sampling. `w_tokens` holds the embeddings,
/// `w_context` the output weights scored against them.
pub struct Train {
    w_tokens: Array2<f32>,
    w_context: Array2<f32>,
    rng: StdRng,
}

struct DisplayProgress {
    epoch_loss: f32,     // summed loss of the epoch
    n_updates: usize,    // number of positive examples in the epoch
    words_done: usize,   // positions visited across all epochs, drives the learning rate decay
    total_words: usize,  // positions to visit across all epochs
}

impl DisplayProgress {

    fn new(total_words: usize) -> Self {
        Self {
            epoch_loss: 0.0,
            n_updates: 0,
            words_done: 0,
            total_words,
        }
    }

    fn start_epoch(&mut self) {
        self.epoch_loss = 0.0;
        self.n_updates = 0;
    }

    fn mean_loss(&self) -> f32 {
        if self.n_updates == 0 { 0.0 } else { self.epoch_loss / self.n_updates as f32 }
    }

    fn learning_rate(&self, params: &TrainParams) -> f32 {
        let done = self.words_done as f32 / self.total_words.max(1) as f32;
        (params.learning_rate - (params.learning_rate - params.min_learning_rate) * done).max(params.min_learning_rate)
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x.clamp(-MAX_EXP, MAX_EXP)).exp())
}

impl Train {

    fn new(vocab_size: usize, embedding_dim: usize, seed: u64) -> Train {

        let mut rng = StdRng::seed_from_u64(seed);
        let w_tokens: Array2<f32> = Array::random_using((vocab_size, embedding_dim), Uniform::new(-0.5, 0.5), &mut rng);
        Self {
            w_tokens: w_tokens / embedding_dim as f32,
            w_context: Array2::zeros((vocab_size, embedding_dim)),
            rng,
        }
    }

    pub fn get_w_tokens(&self) -> Array2<f32> {
        self.w_tokens.clone()
    }

    pub fn get_w_context(&self) -> Array2<f32> {
        self.w_context.clone()
    }

    pub fn into_w_tokens(self) -> Array2<f32> {
        self.w_tokens
    }

    fn validate(vocab: &Vocab, params: &TrainParams) -> Result<()> {

        if vocab.is_empty() {
            return Err(Error::EmptyVocabulary { min_count: vocab.min_count() });
        }
        for (name, value) in [("vector_size", params.vector_size), ("epochs", params.epochs), ("window", params.window), ("negative", params.negative)] {
            if value == 0 {
                return Err(Error::Config(format!("{} should be positive", name)));
            }
        }
        if params.learning_rate <= 0.0 || params.min_learning_rate < 0.0 {
            return Err(Error::Config("learning rates should be positive".into()));
        }
        Ok(())
    }

    // scores hidden vector `h` against the positive `target` and `negative` noise tokens,
    // updates the context weights, and returns the gradient for `h` with the loss
    fn negative_sampling(&mut self, h: &Array1<f32>, target: usize, noise: &WeightedIndex<f64>, negative: usize, lr: f32) -> (Array1<f32>, f32) {

        let mut neu1e: Array1<f32> = Array1::zeros(h.len());
        let mut loss = 0.0;

        for d in 0..=negative {

            let (out, label) = if d == 0 {
                (target, 1.0)
            } else {
                let sample = noise.sample(&mut self.rng);
                if sample == target { continue }
                (sample, 0.0)
            };

            let p = sigmoid(h.dot(&self.w_context.row(out)));
            let g = (label - p) * lr;
            loss -= if d == 0 { p.max(LOG_EPS).ln() } else { (1.0 - p).max(LOG_EPS).ln() };

            neu1e.scaled_add(g, &self.w_context.row(out));
            self.w_context.row_mut(out).scaled_add(g, h);
        }

        (neu1e, loss)
    }

    fn skip_gram_step(&mut self, center: usize, context: &[usize], noise: &WeightedIndex<f64>, negative: usize, lr: f32) -> f32 {

        let mut loss = 0.0;
        for &c in context {
            let h = self.w_tokens.row(center).to_owned();
            let (neu1e, l) = self.negative_sampling(&h, c, noise, negative, lr);
            self.w_tokens.row_mut(center).add_assign(&neu1e);
            loss += l;
        }
        loss
    }

    fn cbow_step(&mut self, center: usize, context: &[usize], noise: &WeightedIndex<f64>, negative: usize, lr: f32) -> f32 {

        // average of the context embeddings predicts the center token
        let mut h: Array1<f32> = Array1::zeros(self.w_tokens.ncols());
        for &c in context {
            h.add_assign(&self.w_tokens.row(c));
        }
        h /= context.len() as f32;

        let (neu1e, loss) = self.negative_sampling(&h, center, noise, negative, lr);
        for &c in context {
            self.w_tokens.row_mut(c).add_assign(&neu1e);
        }
        loss
    }

    fn train(&mut self, sequences: &[Vec<usize>], noise: &WeightedIndex<f64>, params: &TrainParams) {

        let words_per_epoch: usize = sequences.iter().map(|s| s.len()).sum();
        let mut progress = DisplayProgress::new(words_per_epoch * params.epochs);

        for epoch in 0..params.epochs {

            let timer = Instant::now();
            progress.start_epoch();

            for sequence in sequences {

                let n = sequence.len();
                for pos in 0..n {

                    let lr = progress.learning_rate(params);
                    progress.words_done += 1;

                    // shrink the window by a random amount, nearer tokens are sampled more often
                    let span = params.window - self.rng.gen_range(0..params.window);
                    let context: Vec<usize> = (pos.saturating_sub(span)..(pos + span + 1).min(n))
                        .filter(|&j| j != pos)
                        .map(|j| sequence[j])
                        .collect();
                    if context.is_empty() { continue }

                    let loss = match params.objective {
                        Objective::SkipGram => self.skip_gram_step(sequence[pos], &context, noise, params.negative, lr),
                        Objective::Cbow => self.cbow_step(sequence[pos], &context, noise, params.negative, lr),
                    };
                    progress.epoch_loss += loss;
                    progress.n_updates += match params.objective {
                        Objective::SkipGram => context.len(),
                        Objective::Cbow => 1,
                    };
                }
            }

            info!("finished epoch {}, loss is {}, took: {} ms...", epoch, progress.mean_loss(), timer.elapsed().as_millis());
            debug!("learning rate now {}", progress.learning_rate(params));
        }
    }

    pub fn run(corpus: &Corpus, vocab: &Vocab, params: &TrainParams) -> Result<Train> {

        Train::validate(vocab, params)?;

        // noise distribution is the unigram distribution raised to 3/4
        let noise = WeightedIndex::new(vocab.counts().iter().map(|&c| (c as f64).powf(NOISE_POWER)))
            .map_err(|e| Error::Config(format!("cannot build noise distribution: {}", e)))?;

        // out-of-vocabulary tokens are dropped before windows are taken
        let sequences: Vec<Vec<usize>> = corpus.sentences().iter().map(|s| vocab.encode(s)).collect();

        info!("{}", params);
        info!("training on {} sentences over a vocabulary of {}", sequences.len(), vocab.len());

        let mut trainer = Train::new(vocab.len(), params.vector_size, params.seed);
        trainer.train(&sequences, &noise, params);
        Ok(trainer)
    }
}


#[cfg(test)]
mod tests {

    use super::*;
    use crate::similarity::Similarity;

    fn params(objective: Objective) -> TrainParams {
        TrainParams {
            min_count: 1,
            vector_size: 16,
            objective,
            epochs: 20,
            window: 2,
            ..TrainParams::default()
        }
    }

    fn toy_corpus() -> Corpus {
        let text = "King rules land. Queen rules land. Apple tastes sweet. Banana tastes sweet. ".repeat(50);
        Corpus::from_text(&text, 0)
    }

    #[test]
    fn output_has_one_row_per_token() {

        let corpus = toy_corpus();
        let vocab = Vocab::build(&corpus, 1);
        let trainer = Train::run(&corpus, &vocab, &params(Objective::SkipGram)).unwrap();

        assert_eq!(trainer.get_w_tokens().dim(), (8, 16));
        assert!(trainer.get_w_tokens().iter().all(|x| x.is_finite()));
        assert!(trainer.get_w_context().iter().any(|x| *x != 0.0));
    }

    #[test]
    fn same_seed_same_vectors() {

        let corpus = toy_corpus();
        let vocab = Vocab::build(&corpus, 1);
        let mut p = params(Objective::Cbow);
        p.epochs = 2;

        let a = Train::run(&corpus, &vocab, &p).unwrap().into_w_tokens();
        let b = Train::run(&corpus, &vocab, &p).unwrap().into_w_tokens();
        assert_eq!(a, b);

        p.seed = 7;
        let c = Train::run(&corpus, &vocab, &p).unwrap().into_w_tokens();
        assert_ne!(a, c);
    }

    #[test]
    fn shared_contexts_end_up_close() {

        for objective in [Objective::SkipGram, Objective::Cbow] {

            let corpus = toy_corpus();
            let vocab = Vocab::build(&corpus, 1);
            let w = Train::run(&corpus, &vocab, &params(objective)).unwrap().into_w_tokens();
            let sim = Similarity::new(w, vocab.t2i().clone()).unwrap();

            let close = sim.similarity("king", "queen").unwrap();
            let far = sim.similarity("king", "banana").unwrap();
            assert!(close > far, "{}: king~queen {} vs king~banana {}", objective, close, far);
        }
    }

    #[test]
    fn rejects_empty_vocabulary_and_bad_params() {

        let corpus = Corpus::from_text("one two. three", 0);
        let vocab = Vocab::build(&corpus, 5);
        assert!(matches!(
            Train::run(&corpus, &vocab, &params(Objective::SkipGram)),
            Err(Error::EmptyVocabulary { min_count: 5 })
        ));

        let empty = Corpus::default();
        assert!(matches!(
            Train::run(&empty, &Vocab::build(&empty, 1), &params(Objective::SkipGram)),
            Err(Error::EmptyVocabulary { .. })
        ));

        let vocab = Vocab::build(&corpus, 1);
        let mut p = params(Objective::SkipGram);
        p.window = 0;
        assert!(matches!(Train::run(&corpus, &vocab, &p), Err(Error::Config(_))));
    }

    #[test]
    fn sentences_without_context_are_skipped() {

        // single token sentences and empty sentences give no training pairs
        let corpus = Corpus::from_text("alone. . solo!", 0);
        let vocab = Vocab::build(&corpus, 1);
        let trainer = Train::run(&corpus, &vocab, &params(Objective::SkipGram)).unwrap();
        assert!(trainer.get_w_context().iter().all(|x| *x == 0.0));
    }
}
