//! Interpretation of the classifier's tumor probability.

use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::model_trait::TumorClassifier;
use crate::tensor::InputTensor;

/// Probabilities strictly above this are reported as a tumor.
pub const TUMOR_THRESHOLD: f32 = 0.5;

/// Predicted class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisLabel {
    /// Probability above [`TUMOR_THRESHOLD`].
    TumorDetected,
    /// Probability at or below [`TUMOR_THRESHOLD`].
    NoTumor,
}

impl std::fmt::Display for DiagnosisLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TumorDetected => f.write_str("Tumor Detected"),
            Self::NoTumor => f.write_str("No Tumor"),
        }
    }
}

/// Classifier verdict for one image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    /// Raw tumor probability from the classifier.
    pub probability: f32,
    /// Thresholded class.
    pub label: DiagnosisLabel,
    /// Probability of the reported class.
    pub confidence: f32,
}

impl Diagnosis {
    /// Build a diagnosis from a tumor probability.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ValueRange`] if `probability` is not in `[0, 1]`.
    pub fn from_probability(probability: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(CoreError::ValueRange {
                min: probability,
                max: probability,
            });
        }

        let (label, confidence) = if probability > TUMOR_THRESHOLD {
            (DiagnosisLabel::TumorDetected, probability)
        } else {
            (DiagnosisLabel::NoTumor, 1.0 - probability)
        };

        Ok(Self {
            probability,
            label,
            confidence,
        })
    }

    /// Whether a tumor was detected.
    #[must_use]
    pub fn is_tumor(&self) -> bool {
        self.label == DiagnosisLabel::TumorDetected
    }
}

impl std::fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:.2}%)", self.label, self.confidence * 100.0)
    }
}

/// Run the classifier once and interpret its output.
///
/// # Errors
///
/// Returns an error if the input does not match the classifier's input shape,
/// the output is empty, or the probability is out of range.
pub fn classify<B, M>(model: &M, input: &InputTensor<B>) -> Result<Diagnosis>
where
    B: AutodiffBackend,
    M: TumorClassifier<B>,
{
    input.ensure_shape(model.input_shape())?;
    let output = model.forward(input.inner().clone());
    let [batch, n_outputs] = output.dims();
    if batch == 0 || n_outputs == 0 {
        return Err(CoreError::InvalidShape {
            expected: "(1, n_outputs >= 1)".to_string(),
            got: format!("({batch}, {n_outputs})"),
        });
    }

    let probability: f32 = output
        .slice([0..1, 0..1])
        .into_scalar()
        .elem();
    tracing::debug!(probability, "classifier output");

    Diagnosis::from_probability(probability)
}
