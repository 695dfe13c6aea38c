use anyhow::{Context, Result};
use burn::module::Module;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder};
use burn::tensor::backend::Backend;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::config::ClassifierConfig;
use crate::model::SequenceClassifier;

/// Persist the classifier's trainable parameters to `path` using Burn's
/// recorder (the recorder appends its own file extension).
pub fn save_model<B: Backend>(model: SequenceClassifier<B>, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
        }
    }

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    recorder
        .record(model.into_record(), path.to_path_buf())
        .with_context(|| format!("Failed to save model weights to: {:?}", path))?;

    info!("Model weights saved to: {:?}", path);
    Ok(())
}

/// Rebuild a classifier from `config` and restore weights saved by
/// [`save_model`].
pub fn load_model<B: Backend>(
    config: ClassifierConfig,
    path: &Path,
    device: &B::Device,
) -> Result<SequenceClassifier<B>> {
    let model = SequenceClassifier::<B>::new(config, device);

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    let record = recorder
        .load(path.to_path_buf(), device)
        .with_context(|| format!("Failed to load model weights from: {:?}", path))?;

    Ok(model.load_record(record))
}
