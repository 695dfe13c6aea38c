use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Architecture of the sequence classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub vocab_size: usize,
    pub hidden_size: usize,
    pub num_heads: usize,
    pub num_layers: usize,
    pub ff_multiplier: f32,
    pub dropout: f64,
    pub max_seq_len: usize,
    pub num_classes: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            vocab_size: 30_522,
            hidden_size: 128,
            num_heads: 4,
            num_layers: 2,
            ff_multiplier: 4.0,
            dropout: 0.1,
            max_seq_len: 512,
            num_classes: 2,
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) {
        assert!(self.vocab_size > 0, "vocab_size must be > 0");
        assert!(self.hidden_size > 0, "hidden_size must be > 0");
        assert!(self.num_heads > 0, "num_heads must be > 0");
        assert!(
            self.hidden_size % self.num_heads == 0,
            "hidden_size must be divisible by num_heads"
        );
        assert!(self.num_layers > 0, "num_layers must be > 0");
        assert!(self.max_seq_len > 0, "max_seq_len must be > 0");
        assert!(self.num_classes >= 2, "num_classes must be >= 2");
    }

    pub fn feedforward_dim(&self) -> usize {
        (self.hidden_size as f32 * self.ff_multiplier).round() as usize
    }
}

impl fmt::Display for ClassifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Hyperparameters of one training run, built from the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub out_path: PathBuf,
    pub batch_size: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    /// Epoch index at which the learning rate decays.
    pub sch_milestone: usize,
    pub seed: u64,
    #[serde(default = "default_print_freq")]
    pub print_freq: usize,
    pub model: ClassifierConfig,
}

impl TrainConfig {
    pub fn validate(&self) {
        assert!(self.batch_size > 0, "batch_size must be > 0");
        assert!(self.epochs > 0, "epochs must be > 0");
        assert!(self.learning_rate > 0.0, "learning_rate must be > 0");
        assert!(self.print_freq > 0, "print_freq must be > 0");
        self.model.validate();
    }
}

impl fmt::Display for TrainConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

fn default_print_freq() -> usize {
    25
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_classifier_config_is_valid() {
        ClassifierConfig::default().validate();
    }

    #[test]
    #[should_panic(expected = "divisible by num_heads")]
    fn uneven_heads_rejected() {
        let config = ClassifierConfig {
            hidden_size: 10,
            num_heads: 4,
            ..Default::default()
        };
        config.validate();
    }
}
