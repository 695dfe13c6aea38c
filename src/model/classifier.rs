use burn::module::Module;
use burn::nn::transformer::{TransformerEncoder, TransformerEncoderConfig, TransformerEncoderInput};
use burn::nn::{Embedding, EmbeddingConfig, Linear, LinearConfig};
use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};

use crate::config::ClassifierConfig;

/// Transformer encoder with a two-way classification head.
///
/// Generic over any `Backend`, so the identical module runs under autodiff
/// during training and on the inner backend during evaluation; dropout is
/// only active when the backend tracks gradients.
#[derive(Module, Debug)]
pub struct SequenceClassifier<B: Backend> {
    token_embed: Embedding<B>,
    pos_embed: Embedding<B>,
    encoder: TransformerEncoder<B>,
    head: Linear<B>,
    #[module(skip)]
    embed_scale: f32,
}

impl<B: Backend> SequenceClassifier<B> {
    pub fn new(config: ClassifierConfig, device: &B::Device) -> Self {
        config.validate();

        let token_embed = EmbeddingConfig::new(config.vocab_size, config.hidden_size).init(device);
        let pos_embed = EmbeddingConfig::new(config.max_seq_len, config.hidden_size).init(device);

        let encoder = TransformerEncoderConfig::new(
            config.hidden_size,
            config.feedforward_dim(),
            config.num_heads,
            config.num_layers,
        )
        .with_dropout(config.dropout)
        .with_norm_first(true)
        .init(device);

        let head = LinearConfig::new(config.hidden_size, config.num_classes).init(device);
        let embed_scale = (config.hidden_size as f32).sqrt().recip();

        Self {
            token_embed,
            pos_embed,
            encoder,
            head,
            embed_scale,
        }
    }

    /// `ids`/`mask` are `[batch, seq_len]`; returns class logits `[batch, classes]`.
    pub fn forward(&self, ids: Tensor<B, 2, Int>, mask: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let [batch, seq_len] = ids.dims();
        let device = ids.device();

        let token_embeds = self.token_embed.forward(ids) * self.embed_scale;
        let positions = Tensor::arange(0..seq_len as i64, &device)
            .reshape([1, seq_len])
            .repeat_dim(0, batch);
        let hidden = token_embeds + self.pos_embed.forward(positions);

        // Padding positions are where the attention mask is 0.
        let pad_mask = mask.clone().equal_elem(0);
        let encoded = self
            .encoder
            .forward(TransformerEncoderInput::new(hidden).mask_pad(pad_mask));
        let hidden_size = encoded.dims()[2];

        // Mean-pool over real tokens only.
        let mask_f = mask.float().unsqueeze_dim::<3>(2);
        let summed = (encoded * mask_f.clone()).sum_dim(1);
        let counts = mask_f.sum_dim(1).clamp_min(1.0);
        let pooled = (summed / counts).reshape([batch, hidden_size]);

        self.head.forward(pooled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    fn tiny_config() -> ClassifierConfig {
        ClassifierConfig {
            vocab_size: 32,
            hidden_size: 8,
            num_heads: 2,
            num_layers: 1,
            ff_multiplier: 2.0,
            dropout: 0.0,
            max_seq_len: 8,
            num_classes: 2,
        }
    }

    #[test]
    fn forward_shapes() {
        let device = Default::default();
        let model = SequenceClassifier::<TestBackend>::new(tiny_config(), &device);

        let ids = Tensor::<TestBackend, 2, Int>::from_ints([[1, 2, 3, 0], [4, 5, 0, 0]], &device);
        let mask = Tensor::<TestBackend, 2, Int>::from_ints([[1, 1, 1, 0], [1, 1, 0, 0]], &device);

        let logits = model.forward(ids, mask);
        assert_eq!(logits.dims(), [2, 2]);

        let values = logits.into_data().to_vec::<f32>().unwrap();
        assert!(values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn padding_does_not_change_logits() {
        let device = Default::default();
        let model = SequenceClassifier::<TestBackend>::new(tiny_config(), &device);

        let ids_a = Tensor::<TestBackend, 2, Int>::from_ints([[1, 2, 3, 0]], &device);
        let ids_b = Tensor::<TestBackend, 2, Int>::from_ints([[1, 2, 3, 9]], &device);
        let mask = Tensor::<TestBackend, 2, Int>::from_ints([[1, 1, 1, 0]], &device);

        let a = model.forward(ids_a, mask.clone()).into_data().to_vec::<f32>().unwrap();
        let b = model.forward(ids_b, mask).into_data().to_vec::<f32>().unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-4);
        }
    }
}
