pub mod classifier;

pub use classifier::SequenceClassifier;
