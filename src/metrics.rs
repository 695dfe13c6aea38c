use burn::tensor::backend::Backend;
use burn::tensor::{ElementConversion, Int, Tensor};

use crate::error::{Result, TrainError};

/// Running weighted mean of a scalar statistic.
///
/// Stores the exact `(sum, weight)` pair and divides on read, so the average
/// is the true weighted mean of everything seen so far regardless of how the
/// observations were batched. Weighting by example count (not 1 per batch)
/// is what keeps a short final batch from skewing the epoch average.
#[derive(Debug, Clone, Default)]
pub struct AverageMeter {
    val: f64,
    sum: f64,
    weight: f64,
}

impl AverageMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one observation with the given weight into the running mean.
    pub fn update(&mut self, value: f64, weight: f64) {
        self.val = value;
        self.sum += value * weight;
        self.weight += weight;
    }

    /// Most recent value, for `val (avg)` style progress lines.
    pub fn val(&self) -> f64 {
        self.val
    }

    /// Weighted mean over all observations so far.
    pub fn average(&self) -> Result<f64> {
        if self.weight > 0.0 {
            Ok(self.sum / self.weight)
        } else {
            Err(TrainError::EmptyMeter)
        }
    }
}

/// Top-1 accuracy of `logits [batch, classes]` against `targets [batch]`,
/// as a percentage in [0, 100].
pub fn accuracy_topk<B: Backend>(logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> f64 {
    let batch_size = logits.dims()[0];
    let predictions = logits.argmax(1);
    let correct = predictions
        .equal(targets.reshape([batch_size, 1]))
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>();

    100.0 * correct as f64 / batch_size as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn average_is_example_weighted() {
        // Batches of size 3 and 2 with accuracies 1.0 and 0.5: the mean must
        // be (3*1.0 + 2*0.5) / 5 = 0.8, not the unweighted 0.75.
        let mut meter = AverageMeter::new();
        meter.update(1.0, 3.0);
        meter.update(0.5, 2.0);
        assert!((meter.average().unwrap() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn empty_meter_has_no_average() {
        let meter = AverageMeter::new();
        assert!(matches!(meter.average(), Err(TrainError::EmptyMeter)));
    }

    #[test]
    fn val_tracks_last_observation() {
        let mut meter = AverageMeter::new();
        meter.update(2.0, 4.0);
        meter.update(6.0, 4.0);
        assert_eq!(meter.val(), 6.0);
        assert!((meter.average().unwrap() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn accuracy_is_a_percentage() {
        let device = Default::default();
        // Argmax matches the label in 3 of 4 rows.
        let logits = Tensor::<TestBackend, 2>::from_floats(
            [[0.1, 0.9], [0.8, 0.2], [0.3, 0.7], [0.6, 0.4]],
            &device,
        );
        let targets = Tensor::<TestBackend, 1, Int>::from_ints([1, 0, 1, 1], &device);
        let acc = accuracy_topk(logits, targets);
        assert!((acc - 75.0).abs() < 1e-9);
    }
}
