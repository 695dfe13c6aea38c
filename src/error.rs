use thiserror::Error;

/// Errors that can occur while loading data or running a training run.
#[derive(Debug, Error)]
pub enum TrainError {
    /// The aligned ids/mask/labels containers disagree on shape.
    #[error("shape mismatch in example {index}: {detail}")]
    ShapeMismatch {
        /// Index of the offending example in the corpus.
        index: usize,
        /// What disagreed.
        detail: String,
    },

    /// The corpus contains no examples.
    #[error("corpus is empty")]
    EmptyCorpus,

    /// An average was requested from a meter with zero accumulated weight.
    #[error("average is undefined: no observations recorded")]
    EmptyMeter,

    /// The loss left the finite range; continuing would corrupt the model.
    #[error("non-finite loss at epoch {epoch}, batch {batch}")]
    NonFiniteLoss { epoch: usize, batch: usize },
}

/// Result type alias for training operations.
pub type Result<T> = std::result::Result<T, TrainError>;
