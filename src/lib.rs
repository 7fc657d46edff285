
mod error;
mod loader;
mod text;
mod corpus;
mod vocab;
mod train;
mod similarity;
mod pipeline;
pub mod config;

pub use error::{Error, Result};
pub use loader::{load_dir, decode_dropping_invalid, CorpusLoader, LoadedText};
pub use text::{clean_sentence, segment, Normalizer, Tokenizer, WhitespaceTokenizer};
pub use corpus::Corpus;
pub use vocab::Vocab;
pub use train::Train;
pub use similarity::Similarity;
pub use pipeline::Pipeline;
