use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::TrainError;

/// One pre-tokenized example as the tokenizer collaborator emits it:
/// fixed-length token ids, a same-length {0,1} attention mask, and a
/// binary sentiment label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodedExample {
    pub ids: Vec<i64>,
    pub mask: Vec<i64>,
    pub label: i64,
}

/// A validated corpus of encoded examples, all sharing one sequence length.
#[derive(Debug, Clone)]
pub struct EncodedCorpus {
    examples: Vec<EncodedExample>,
    seq_len: usize,
}

impl EncodedCorpus {
    /// Validate shape invariants up front so the loops never see a
    /// malformed batch: every sequence shares the first example's length,
    /// masks align with ids and hold only 0/1, labels are 0/1.
    pub fn from_examples(examples: Vec<EncodedExample>) -> Result<Self, TrainError> {
        let first = examples.first().ok_or(TrainError::EmptyCorpus)?;
        let seq_len = first.ids.len();

        for (index, example) in examples.iter().enumerate() {
            if example.ids.len() != seq_len {
                return Err(TrainError::ShapeMismatch {
                    index,
                    detail: format!("ids length {} != corpus length {}", example.ids.len(), seq_len),
                });
            }
            if example.mask.len() != example.ids.len() {
                return Err(TrainError::ShapeMismatch {
                    index,
                    detail: format!(
                        "mask length {} != ids length {}",
                        example.mask.len(),
                        example.ids.len()
                    ),
                });
            }
            if example.mask.iter().any(|&m| m != 0 && m != 1) {
                return Err(TrainError::ShapeMismatch {
                    index,
                    detail: "mask values must be 0 or 1".into(),
                });
            }
            if example.label != 0 && example.label != 1 {
                return Err(TrainError::ShapeMismatch {
                    index,
                    detail: format!("label {} outside {{0,1}}", example.label),
                });
            }
        }

        Ok(Self { examples, seq_len })
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn seq_len(&self) -> usize {
        self.seq_len
    }

    /// The classifier's position table covers `max_seq_len` slots; a longer
    /// corpus would index past it inside the model. Reject it up front,
    /// before any batch is built.
    pub fn check_max_seq_len(&self, max_seq_len: usize) -> Result<(), TrainError> {
        if self.seq_len > max_seq_len {
            return Err(TrainError::ShapeMismatch {
                index: 0,
                detail: format!(
                    "sequence length {} exceeds model max_seq_len {}",
                    self.seq_len, max_seq_len
                ),
            });
        }
        Ok(())
    }

    pub fn example(&self, index: usize) -> &EncodedExample {
        &self.examples[index]
    }
}

/// Load a corpus from a JSON file holding an array of encoded examples.
pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<EncodedCorpus> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset file: {:?}", path))?;
    let examples: Vec<EncodedExample> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse dataset JSON: {:?}", path))?;
    let corpus = EncodedCorpus::from_examples(examples)
        .with_context(|| format!("Invalid dataset: {:?}", path))?;
    Ok(corpus)
}

/// Training split, pre-tokenized by the external data collaborator.
pub fn get_train<P: AsRef<Path>>(data_dir: P) -> Result<EncodedCorpus> {
    load_corpus(data_dir.as_ref().join("train.json"))
}

/// Held-out split used by the evaluation loop.
pub fn get_test<P: AsRef<Path>>(data_dir: P) -> Result<EncodedCorpus> {
    load_corpus(data_dir.as_ref().join("test.json"))
}
