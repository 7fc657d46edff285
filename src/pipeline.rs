
// imports
use crate::config::{Params, Queries};
use crate::corpus::Corpus;
use crate::error::{Error, Result};
use crate::similarity::Similarity;
use crate::train::Train;
use crate::vocab::Vocab;

use std::time::Instant;
use tracing::{info, warn};

pub struct Pipeline {}

impl Pipeline {

    // runs the main procedure:
    // -> corpus loading and tokenizing
    // -> vocabulary building
    // -> training

    pub fn run(params: &Params) -> Result<Similarity> {

        info!("{}", params);

        let timer = Instant::now();
        let corpus = Corpus::from_dir(&params.corpus_dir, &params.extension, params.preamble_offset)?;
        let vocab = Vocab::build(&corpus, params.train.min_count);
        info!("finished corpus and vocab, took {} ms ...", timer.elapsed().as_millis());

        let timer = Instant::now();
        let trainer = Train::run(&corpus, &vocab, &params.train)?;
        info!("finished training, took {} seconds ...", timer.elapsed().as_secs());

        Similarity::new(trainer.into_w_tokens(), vocab.t2i().clone())
    }

    /// Answers every configured query, printing the results. Out-of-vocabulary
    /// tokens are reported and skipped so the remaining queries still run.
    pub fn inspect(sim: &Similarity, queries: &Queries) {

        println!("vocabulary size: {}", sim.vocab_len());
        let k = queries.top_k;

        for token in &queries.similar_words {
            report_miss(run_similar(sim, token, k));
        }

        for (a, b) in &queries.similarity_pairs {
            match sim.similarity(a, b) {
                Ok(score) => println!("similarity({}, {}) = {}", a, b, score),
                Err(e) => report_miss(Err(e)),
            }
        }

        for (source, target) in &queries.analogies {
            report_miss(run_analogy(sim, source, target.as_deref(), k));
        }
    }
}

fn report_miss(outcome: Result<()>) {
    match outcome {
        Ok(()) => {}
        Err(Error::OutOfVocabulary(token)) => warn!("skipping query, '{}' is not in the vocabulary", token),
        Err(e) => warn!("query failed: {}", e),
    }
}

fn run_similar(sim: &Similarity, token: &str, k: usize) -> Result<()> {

    println!("searching {} most similar words to {}", k, token);
    for (i, (similar, score)) in sim.most_similar(token, k)?.iter().enumerate() {
        println!("{} : {} ? {} = {}", i, token, similar, score);
    }
    println!();
    Ok(())
}

fn run_analogy(sim: &Similarity, source: &[String; 3], target: Option<&str>, k: usize) -> Result<()> {

    // a is to b as c is to ?
    // translates to b - a + c : ?
    let [a, b, c] = source;
    let analogies = sim.extract_analogies([a.as_str(), b.as_str(), c.as_str()], k)?;

    let mut found_target = false;
    for (i, (analogy, score)) in analogies.iter().enumerate() {
        println!("{} : {} - {} + {} ? {} = {}", i, b, a, c, analogy, score);
        if Some(analogy.as_str()) == target {
            found_target = true;
            println!("found target '{}' analogy in place {}", analogy, 1 + i);
        }
    }

    if let (Some(target), false) = (target, found_target) {
        println!("target '{}' was not found within the first {} analogies", target, k);
    }
    println!();
    Ok(())
}
