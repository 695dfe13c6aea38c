mod dataset;
mod loader;

pub use dataset::{get_test, get_train, load_corpus, EncodedCorpus, EncodedExample};
pub use loader::{BatchLoader, DataLoader, SentimentBatch};
