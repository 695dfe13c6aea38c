use anyhow::Result;
use burn::module::AutodiffModule;
use burn::nn::loss::CrossEntropyLoss;
use burn::optim::adaptor::OptimizerAdaptor;
use burn::optim::momentum::MomentumConfig;
use burn::optim::{GradientsParams, Optimizer, Sgd, SgdConfig};
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::ElementConversion;
use tracing::info;

use crate::config::TrainConfig;
use crate::data::DataLoader;
use crate::error::TrainError;
use crate::metrics::{accuracy_topk, AverageMeter};
use crate::model::SequenceClassifier;
use crate::training::schedule::MilestoneLr;

/// Aggregate metrics of one full pass over a corpus.
#[derive(Debug, Clone)]
pub struct EpochReport {
    /// Example-weighted mean loss.
    pub loss: f64,
    /// Example-weighted mean top-1 accuracy, in [0, 100].
    pub accuracy: f64,
    /// Batches processed in the pass.
    pub batches: usize,
}

/// One completed epoch: the learning rate it ran under plus the training and
/// evaluation passes' aggregate metrics.
#[derive(Debug, Clone)]
pub struct EpochSummary {
    pub epoch: usize,
    pub lr: f64,
    pub train: EpochReport,
    pub eval: EpochReport,
}

/// Owns the model, optimizer, and schedule for the duration of a run and
/// drives the epoch state machine: train, advance the schedule, evaluate.
pub struct Trainer<B: AutodiffBackend> {
    model: SequenceClassifier<B>,
    optimizer: OptimizerAdaptor<Sgd<B::InnerBackend>, SequenceClassifier<B>, B>,
    schedule: MilestoneLr,
    criterion: CrossEntropyLoss<B>,
    config: TrainConfig,
    device: B::Device,
}

impl<B: AutodiffBackend> Trainer<B> {
    pub fn new(model: SequenceClassifier<B>, config: TrainConfig, device: B::Device) -> Self {
        config.validate();

        let optimizer = SgdConfig::new()
            .with_momentum(Some(MomentumConfig {
                momentum: 0.9,
                dampening: 0.0,
                nesterov: true,
            }))
            .init();
        let criterion = CrossEntropyLoss::new(None, &device);
        let schedule = MilestoneLr::new(config.learning_rate, config.sch_milestone);

        Self {
            model,
            optimizer,
            schedule,
            criterion,
            config,
            device,
        }
    }

    /// Run one training epoch: forward, loss, backward, and one Nesterov
    /// momentum SGD step per batch, with loss/accuracy accumulated weighted
    /// by batch example count.
    pub fn train_epoch<L: DataLoader<B>>(
        &mut self,
        loader: &mut L,
        epoch: usize,
    ) -> Result<EpochReport> {
        let mut losses = AverageMeter::new();
        let mut accs = AverageMeter::new();
        let num_batches = loader.num_batches();

        loader.reset();
        let mut batch_index = 0;
        while let Some(batch) = loader.next_batch()? {
            let logits = self.model.forward(batch.ids, batch.mask);
            let loss = self.criterion.forward(logits.clone(), batch.labels.clone());

            let loss_value = loss.clone().into_scalar().elem::<f64>();
            if !loss_value.is_finite() {
                return Err(TrainError::NonFiniteLoss {
                    epoch,
                    batch: batch_index,
                }
                .into());
            }
            let acc = accuracy_topk(logits, batch.labels);
            losses.update(loss_value, batch.size as f64);
            accs.update(acc, batch.size as f64);

            let grads = GradientsParams::from_grads(loss.backward(), &self.model);
            self.model = self
                .optimizer
                .step(self.schedule.current(), self.model.clone(), grads);

            if batch_index % self.config.print_freq == 0 {
                let total = num_batches.map_or_else(|| "?".into(), |n| n.to_string());
                info!(
                    "Epoch: [{}][{}/{}]\tLoss {:.4} ({:.4})\tAccuracy {:.3} ({:.3})",
                    epoch,
                    batch_index,
                    total,
                    losses.val(),
                    losses.average()?,
                    accs.val(),
                    accs.average()?,
                );
            }
            batch_index += 1;
        }

        Ok(EpochReport {
            loss: losses.average()?,
            accuracy: accs.average()?,
            batches: batch_index,
        })
    }

    /// Run one evaluation pass on the inner (non-autodiff) backend: forward
    /// only, no graph, no parameter update. Emits one summary line at the
    /// end of the pass.
    pub fn eval_epoch<L: DataLoader<B::InnerBackend>>(&self, loader: &mut L) -> Result<EpochReport> {
        let mut losses = AverageMeter::new();
        let mut accs = AverageMeter::new();

        let model = self.model.valid();
        let criterion = CrossEntropyLoss::new(None, &self.device);

        loader.reset();
        let mut batches = 0;
        while let Some(batch) = loader.next_batch()? {
            let logits = model.forward(batch.ids, batch.mask);
            let loss = criterion.forward(logits.clone(), batch.labels.clone());

            losses.update(loss.into_scalar().elem::<f64>(), batch.size as f64);
            accs.update(accuracy_topk(logits, batch.labels), batch.size as f64);
            batches += 1;
        }

        let report = EpochReport {
            loss: losses.average()?,
            accuracy: accs.average()?,
            batches,
        };
        info!("Test\t Loss ({:.4})\tAccuracy ({:.3})", report.loss, report.accuracy);

        Ok(report)
    }

    /// Drive the full run: for each epoch, report the current learning rate,
    /// train, advance the schedule, then evaluate on the held-out split.
    pub fn fit<LT, LV>(&mut self, train_loader: &mut LT, val_loader: &mut LV) -> Result<Vec<EpochSummary>>
    where
        LT: DataLoader<B>,
        LV: DataLoader<B::InnerBackend>,
    {
        let mut summaries = Vec::with_capacity(self.config.epochs);

        for epoch in 0..self.config.epochs {
            let lr = self.schedule.current();
            info!("current lr {:.5e}", lr);

            let train = self.train_epoch(train_loader, epoch)?;
            self.schedule.advance();

            let eval = self.eval_epoch(val_loader)?;

            summaries.push(EpochSummary {
                epoch,
                lr,
                train,
                eval,
            });
        }

        Ok(summaries)
    }

    pub fn model(&self) -> &SequenceClassifier<B> {
        &self.model
    }

    pub fn into_model(self) -> SequenceClassifier<B> {
        self.model
    }
}
