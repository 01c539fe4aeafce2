use burn::{
    nn::{
        loss::CrossEntropyLossConfig,
        Dropout, DropoutConfig,
        Linear, LinearConfig,
        Lstm, LstmConfig,
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::data::batcher::SequenceBatch;

// ─── ModelKind ────────────────────────────────────────────────────────────────
/// Model variants selectable with `--model`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// LSTM over the frame sequence, classify from the final hidden state
    BaselineLstm,
    /// No recurrence: average the frames, then a linear classifier
    FrameMean,
}

impl ModelKind {
    pub const ALL: [ModelKind; 2] = [ModelKind::BaselineLstm, ModelKind::FrameMean];

    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::BaselineLstm => "baseline_lstm",
            ModelKind::FrameMean    => "frame_mean",
        }
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = ModelKind::ALL.iter().map(ModelKind::name).collect();
                format!("unknown model '{s}', expected one of: {}", known.join(", "))
            })
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Config ───────────────────────────────────────────────────────────────────
#[derive(Config, Debug)]
pub struct SequenceClassifierConfig {
    pub input_dim:   usize,
    pub num_classes: usize,
    #[config(default = 256)]
    pub hidden_size: usize,
    #[config(default = 0.0)]
    pub dropout:     f64,
}

impl SequenceClassifierConfig {
    /// Model factory: build the variant named by `kind`.
    pub fn init<B: Backend>(&self, kind: ModelKind, device: &B::Device) -> SequenceClassifier<B> {
        let (lstm, head_in) = match kind {
            ModelKind::BaselineLstm => (
                Some(LstmConfig::new(self.input_dim, self.hidden_size, true).init(device)),
                self.hidden_size,
            ),
            ModelKind::FrameMean => (None, self.input_dim),
        };

        SequenceClassifier {
            lstm,
            dropout: DropoutConfig::new(self.dropout).init(),
            head:    LinearConfig::new(head_in, self.num_classes).init(device),
        }
    }
}

/// The architecture of a trained model, saved beside its checkpoints
/// so test mode rebuilds exactly what was trained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    pub kind:       ModelKind,
    pub classifier: SequenceClassifierConfig,
}

impl ModelSpec {
    pub fn init<B: Backend>(&self, device: &B::Device) -> SequenceClassifier<B> {
        self.classifier.init(self.kind, device)
    }
}

// ─── SequenceClassifier ───────────────────────────────────────────────────────
/// Many-to-one classifier: [batch, timesteps, features] → [batch, classes].
#[derive(Module, Debug)]
pub struct SequenceClassifier<B: Backend> {
    pub lstm:    Option<Lstm<B>>,
    pub dropout: Dropout,
    pub head:    Linear<B>,
}

/// Everything one batch produces, for training and evaluation alike.
pub struct ClassificationStep<B: Backend> {
    /// Mean cross-entropy over the batch, shape [1]
    pub loss:    Tensor<B, 1>,
    /// Raw class scores, shape [batch, classes]
    pub scores:  Tensor<B, 2>,
    pub correct: usize,
    pub samples: usize,
}

impl<B: Backend> SequenceClassifier<B> {
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 2> {
        let summary = match &self.lstm {
            Some(lstm) => {
                let (_, state) = lstm.forward(x, None);
                state.hidden
            }
            None => {
                let [batch, _, dim] = x.dims();
                x.mean_dim(1).reshape([batch, dim])
            }
        };
        self.head.forward(self.dropout.forward(summary))
    }

    pub fn forward_classification(&self, batch: SequenceBatch<B>) -> ClassificationStep<B> {
        let scores = self.forward(batch.features);
        let loss = CrossEntropyLossConfig::new()
            .init(&scores.device())
            .forward(scores.clone(), batch.labels.clone());

        // argmax(1) is [batch, 1]; flatten before comparing with [batch] labels
        let samples = batch.labels.dims()[0];
        let correct = scores
            .clone()
            .argmax(1)
            .flatten::<1>(0, 1)
            .equal(batch.labels)
            .int()
            .sum()
            .into_scalar()
            .elem::<i64>() as usize;

        ClassificationStep { loss, scores, correct, samples }
    }
}
