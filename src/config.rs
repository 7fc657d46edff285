
use crate::error::{Error, Result};

use serde_json::Value;
use std::fmt::Display;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Training objective of the embedding trainer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Objective {
    /// predict the context tokens from the target token
    SkipGram,
    /// predict the target token from its averaged context
    Cbow,
}

impl FromStr for Objective {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            // "sg" is accepted as shorthand
            "skip_gram" | "sg" => Ok(Objective::SkipGram),
            "cbow" => Ok(Objective::Cbow),
            _ => Err(Error::Config(format!("unrecognized objective {}, expected skip_gram (or sg) or cbow", s))),
        }
    }
}

impl Display for Objective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Objective::SkipGram => write!(f, "skip_gram"),
            Objective::Cbow => write!(f, "cbow"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct TrainParams {
    pub min_count: usize,
    pub vector_size: usize,
    pub objective: Objective,
    pub epochs: usize,
    pub window: usize,
    pub negative: usize,
    pub learning_rate: f32,
    pub min_learning_rate: f32,
    pub seed: u64,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            min_count: 5,
            vector_size: 100,
            objective: Objective::SkipGram,
            epochs: 5,
            window: 5,
            negative: 5,
            learning_rate: 0.025,
            min_learning_rate: 0.0001,
            seed: 1,
        }
    }
}

impl Display for TrainParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "training hyper parameters:
        min_count: {},
        vector_size: {},
        objective: {},
        epochs: {},
        window: {},
        negative: {},
        learning_rate: {},
        min_learning_rate: {},
        seed: {}",
        self.min_count, self.vector_size, self.objective, self.epochs, self.window, self.negative,
        self.learning_rate, self.min_learning_rate, self.seed
        )
    }
}

/// Questions asked of the trained vectors once training is done.
#[derive(Clone, Debug, Default)]
pub struct Queries {
    pub top_k: usize,
    pub similar_words: Vec<String>,
    pub similarity_pairs: Vec<(String, String)>,
    /// a is to b as c is to ?, with an optional expected answer
    pub analogies: Vec<([String; 3], Option<String>)>,
}

#[derive(Clone, Debug)]
pub struct Params {
    pub corpus_dir: PathBuf,
    pub extension: String,
    pub preamble_offset: usize,
    pub train: TrainParams,
    pub queries: Queries,
}

impl Display for Params {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "using hyper-params:
        corpus_dir: {}
        extension: {}
        preamble_offset: {}
        Using {}",
        self.corpus_dir.display(), self.extension, self.preamble_offset, self.train)
    }
}

pub struct Config {
    params: Params
}

impl Config {

    pub fn get_params(&self) -> Params {
        self.params.clone()
    }

    pub fn new(path: &Path) -> Result<Config> {

        // parse input json
        let f = File::open(path).map_err(|e| Error::io(path, e))?;
        let json: Value = serde_json::from_reader(BufReader::new(f))?;
        Config::from_json(&json)
    }

    pub fn from_json(json: &Value) -> Result<Config> {

        if !json.is_object() {
            return Err(Error::Config("configuration must be a json object".into()));
        }

        // validate input in json
        let corpus_dir = match json.get("corpus_dir") {
            Some(v) => as_str(v, "corpus_dir")?,
            None => return Err(Error::Config("corpus_dir was not supplied through json".into())),
        };

        // handle default vs input parameters
        let defaults = TrainParams::default();
        let train = TrainParams {
            min_count: get_usize(json, "min_count", defaults.min_count)?,
            vector_size: get_usize(json, "vector_size", defaults.vector_size)?,
            objective: match json.get("objective") {
                Some(v) => as_str(v, "objective")?.parse()?,
                None => defaults.objective,
            },
            epochs: get_usize(json, "epochs", defaults.epochs)?,
            window: get_usize(json, "window", defaults.window)?,
            negative: get_usize(json, "negative", defaults.negative)?,
            learning_rate: get_f32(json, "learning_rate", defaults.learning_rate)?,
            min_learning_rate: get_f32(json, "min_learning_rate", defaults.min_learning_rate)?,
            seed: get_usize(json, "seed", defaults.seed as usize)? as u64,
        };

        let extension = match json.get("extension") {
            Some(v) => as_str(v, "extension")?.trim_start_matches('.').to_owned(),
            None => "txt".to_owned(),
        };

        let params = Params {
            corpus_dir: PathBuf::from(corpus_dir),
            extension,
            preamble_offset: get_usize(json, "preamble_offset", 0)?,
            train,
            queries: Config::queries(json)?,
        };

        Ok(Self { params })
    }

    fn queries(json: &Value) -> Result<Queries> {

        let similar_words = match json.get("similar_words") {
            Some(v) => string_list(v, "similar_words")?,
            None => Vec::new(),
        };

        let mut similarity_pairs = Vec::new();
        if let Some(v) = json.get("similarity_pairs") {
            for pair in as_array(v, "similarity_pairs")? {
                match string_list(pair, "similarity_pairs")?.as_slice() {
                    [a, b] => similarity_pairs.push((a.to_owned(), b.to_owned())),
                    _ => return Err(Error::Config("each similarity pair should hold two tokens".into())),
                }
            }
        }

        let mut analogies = Vec::new();
        if let Some(v) = json.get("analogies") {
            for quad in as_array(v, "analogies")? {
                match string_list(quad, "analogies")?.as_slice() {
                    [a, b, c] => analogies.push(([a.to_owned(), b.to_owned(), c.to_owned()], None)),
                    [a, b, c, d] => analogies.push(([a.to_owned(), b.to_owned(), c.to_owned()], Some(d.to_owned()))),
                    _ => return Err(Error::Config("each analogy should hold three or four tokens".into())),
                }
            }
        }

        Ok(Queries {
            top_k: get_usize(json, "top_k", 10)?,
            similar_words,
            similarity_pairs,
            analogies,
        })
    }
}

fn as_str<'a>(v: &'a Value, key: &str) -> Result<&'a str> {
    v.as_str().ok_or_else(|| Error::Config(format!("given {} is not a string", key)))
}

fn as_array<'a>(v: &'a Value, key: &str) -> Result<&'a Vec<Value>> {
    v.as_array().ok_or_else(|| Error::Config(format!("given {} is not an array", key)))
}

fn string_list(v: &Value, key: &str) -> Result<Vec<String>> {
    as_array(v, key)?
        .iter()
        .map(|x| as_str(x, key).map(|s| s.to_owned()))
        .collect()
}

fn get_usize(json: &Value, key: &str, default: usize) -> Result<usize> {
    match json.get(key) {
        Some(v) => v
            .as_u64()
            .map(|x| x as usize)
            .ok_or_else(|| Error::Config(format!("given {} is not a non-negative integer", key))),
        None => Ok(default),
    }
}

fn get_f32(json: &Value, key: &str, default: f32) -> Result<f32> {
    match json.get(key) {
        Some(v) => v
            .as_f64()
            .map(|x| x as f32)
            .ok_or_else(|| Error::Config(format!("given {} is not numeric", key))),
        None => Ok(default),
    }
}
