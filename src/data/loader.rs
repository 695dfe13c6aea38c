use anyhow::Result;
use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor, TensorData};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::dataset::EncodedCorpus;

/// One mini-batch of aligned tensors on the target device.
#[derive(Debug, Clone)]
pub struct SentimentBatch<B: Backend> {
    /// Token ids, `[batch, seq_len]`.
    pub ids: Tensor<B, 2, Int>,
    /// Attention mask, `[batch, seq_len]`, 1 for real tokens.
    pub mask: Tensor<B, 2, Int>,
    /// Class labels, `[batch]`.
    pub labels: Tensor<B, 1, Int>,
    /// Number of examples in this batch.
    pub size: usize,
}

/// Trait for data loading
pub trait DataLoader<B: Backend> {
    /// Get the next batch of data
    fn next_batch(&mut self) -> Result<Option<SentimentBatch<B>>>;

    /// Start a new pass over the corpus, drawing a fresh permutation
    /// when shuffling is enabled
    fn reset(&mut self);

    /// Get the total number of batches per pass (if known)
    fn num_batches(&self) -> Option<usize>;
}

/// Slices a fixed corpus into mini-batches of `batch_size`, optionally in a
/// freshly permuted order per pass. The final batch of a pass holds the
/// remainder (`n mod batch_size`) rather than being padded.
pub struct BatchLoader<B: Backend> {
    corpus: EncodedCorpus,
    batch_size: usize,
    shuffle: bool,
    rng: StdRng,
    order: Vec<usize>,
    cursor: usize,
    device: B::Device,
}

impl<B: Backend> BatchLoader<B> {
    pub fn new(
        corpus: EncodedCorpus,
        batch_size: usize,
        shuffle: bool,
        seed: u64,
        device: B::Device,
    ) -> Self {
        assert!(batch_size > 0, "batch_size must be > 0");
        let mut loader = Self {
            order: (0..corpus.len()).collect(),
            corpus,
            batch_size,
            shuffle,
            rng: StdRng::seed_from_u64(seed),
            cursor: 0,
            device,
        };
        loader.draw_order();
        loader
    }

    fn draw_order(&mut self) {
        if self.shuffle {
            self.order.shuffle(&mut self.rng);
        }
    }

    fn build_batch(&self, indices: &[usize]) -> SentimentBatch<B> {
        let batch = indices.len();
        let seq_len = self.corpus.seq_len();

        let mut ids = Vec::with_capacity(batch * seq_len);
        let mut mask = Vec::with_capacity(batch * seq_len);
        let mut labels = Vec::with_capacity(batch);
        for &index in indices {
            let example = self.corpus.example(index);
            ids.extend_from_slice(&example.ids);
            mask.extend_from_slice(&example.mask);
            labels.push(example.label);
        }

        SentimentBatch {
            ids: Tensor::from_data(TensorData::new(ids, [batch, seq_len]), &self.device),
            mask: Tensor::from_data(TensorData::new(mask, [batch, seq_len]), &self.device),
            labels: Tensor::from_data(TensorData::new(labels, [batch]), &self.device),
            size: batch,
        }
    }
}

impl<B: Backend> DataLoader<B> for BatchLoader<B> {
    fn next_batch(&mut self) -> Result<Option<SentimentBatch<B>>> {
        if self.cursor >= self.order.len() {
            return Ok(None);
        }

        let end = (self.cursor + self.batch_size).min(self.order.len());
        let indices: Vec<usize> = self.order[self.cursor..end].to_vec();
        self.cursor = end;

        Ok(Some(self.build_batch(&indices)))
    }

    fn reset(&mut self) {
        self.cursor = 0;
        self.draw_order();
    }

    fn num_batches(&self) -> Option<usize> {
        Some(self.corpus.len().div_ceil(self.batch_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::EncodedExample;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    fn corpus(n: usize) -> EncodedCorpus {
        // Example i carries id i so batch contents reveal the ordering.
        let examples = (0..n)
            .map(|i| EncodedExample {
                ids: vec![i as i64, 0],
                mask: vec![1, 0],
                label: (i % 2) as i64,
            })
            .collect();
        EncodedCorpus::from_examples(examples).unwrap()
    }

    fn drain_first_ids(loader: &mut BatchLoader<TestBackend>) -> Vec<i64> {
        let mut seen = Vec::new();
        while let Some(batch) = loader.next_batch().unwrap() {
            let ids = batch.ids.into_data().to_vec::<i64>().unwrap();
            for row in 0..batch.size {
                seen.push(ids[row * 2]);
            }
        }
        seen
    }

    #[test]
    fn covers_corpus_with_remainder_batch() {
        let mut loader = BatchLoader::<TestBackend>::new(corpus(5), 2, false, 1, Default::default());
        assert_eq!(loader.num_batches(), Some(3));

        let mut sizes = Vec::new();
        let mut seen = Vec::new();
        while let Some(batch) = loader.next_batch().unwrap() {
            sizes.push(batch.size);
            let ids = batch.ids.into_data().to_vec::<i64>().unwrap();
            for row in 0..batch.size {
                seen.push(ids[row * 2]);
            }
        }

        assert_eq!(sizes, vec![2, 2, 1]);
        let mut sorted = seen.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn unshuffled_order_is_corpus_order() {
        let mut loader = BatchLoader::<TestBackend>::new(corpus(6), 4, false, 9, Default::default());
        loader.reset();
        assert_eq!(drain_first_ids(&mut loader), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn same_seed_replays_same_shuffle() {
        let mut a = BatchLoader::<TestBackend>::new(corpus(16), 4, true, 7, Default::default());
        let mut b = BatchLoader::<TestBackend>::new(corpus(16), 4, true, 7, Default::default());
        assert_eq!(drain_first_ids(&mut a), drain_first_ids(&mut b));
    }

    #[test]
    fn each_pass_draws_a_fresh_permutation() {
        let mut loader =
            BatchLoader::<TestBackend>::new(corpus(32), 8, true, 3, Default::default());
        let first = drain_first_ids(&mut loader);
        loader.reset();
        let second = drain_first_ids(&mut loader);

        let mut sorted = second.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..32).collect::<Vec<i64>>());
        assert_ne!(first, second);
    }
}
