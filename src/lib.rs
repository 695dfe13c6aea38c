//! Fine-tunes a transformer sentiment classifier and evaluates it after
//! every epoch.
//!
//! The crate is organized around the run's state machine: a [`data`] layer
//! turns a pre-tokenized corpus into mini-batches, [`training::Trainer`]
//! drives train/advance-schedule/evaluate per epoch, and [`checkpoint`]
//! persists the final weights.

pub mod checkpoint;
pub mod config;
pub mod data;
pub mod device;
pub mod error;
pub mod history;
pub mod metrics;
pub mod model;
pub mod training;

// Re-export commonly used types
pub use config::{ClassifierConfig, TrainConfig};
pub use error::TrainError;
pub use metrics::AverageMeter;
pub use model::SequenceClassifier;
pub use training::{EpochReport, EpochSummary, Trainer};
