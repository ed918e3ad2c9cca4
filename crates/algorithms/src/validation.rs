//! Segmentation accuracy against a reference mask
//!
//! Intersection over union plus the usual binary classification scores,
//! all derived from one confusion count. Any non-zero cell is foreground.
//! Scores with a zero denominator are 0.

use fieldseg_core::raster::Mask;
use fieldseg_core::{Algorithm, Error, Result};
use ndarray::Zip;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Pixel counts of prediction against reference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionCounts {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
}

impl ConfusionCounts {
    /// Count two same-shaped masks cell by cell
    pub fn from_masks(prediction: &Mask, reference: &Mask) -> Result<Self> {
        prediction.ensure_same_shape(reference, "segmentation validator")?;

        let mut counts = Self::default();
        Zip::from(prediction.data())
            .and(reference.data())
            .for_each(|&p, &r| counts.record(p != 0, r != 0));
        Ok(counts)
    }

    /// Count paired binary labels
    pub fn from_labels(predicted: &[bool], actual: &[bool]) -> Result<Self> {
        if predicted.len() != actual.len() {
            return Err(Error::shape_mismatch(
                "classification metrics",
                (actual.len(), 1),
                (predicted.len(), 1),
            ));
        }

        let mut counts = Self::default();
        for (&p, &a) in predicted.iter().zip(actual) {
            counts.record(p, a);
        }
        Ok(counts)
    }

    fn record(&mut self, predicted: bool, actual: bool) {
        match (predicted, actual) {
            (true, true) => self.true_positive += 1,
            (true, false) => self.false_positive += 1,
            (false, false) => self.true_negative += 1,
            (false, true) => self.false_negative += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }

    /// `|P ∧ R| / |P ∨ R|`
    pub fn iou(&self) -> f64 {
        let union = self.true_positive + self.false_positive + self.false_negative;
        if union == 0 {
            trace!("empty union, IoU set to 0");
        }
        ratio(self.true_positive, union)
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positive + self.true_negative, self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_positive)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_negative)
    }

    /// Harmonic mean of precision and recall
    pub fn f1(&self) -> f64 {
        ratio(
            2 * self.true_positive,
            2 * self.true_positive + self.false_positive + self.false_negative,
        )
    }

    pub fn report(&self) -> ValidationReport {
        ValidationReport {
            iou: self.iou(),
            accuracy: self.accuracy(),
            precision: self.precision(),
            recall: self.recall(),
            f1: self.f1(),
            counts: *self,
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Every score at once, for report sinks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub iou: f64,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub counts: ConfusionCounts,
}

/// Intersection over union of two same-shaped masks.
///
/// Returns 0 when both masks are empty.
///
/// # Errors
/// [`Error::ShapeMismatch`] when the shapes differ.
pub fn iou(prediction: &Mask, reference: &Mask) -> Result<f64> {
    Ok(ConfusionCounts::from_masks(prediction, reference)?.iou())
}

/// Segmentation validator stage; input is `(prediction, reference)`
#[derive(Debug, Clone, Default)]
pub struct Validator;

impl Algorithm for Validator {
    type Input = (Mask, Mask);
    type Output = ValidationReport;
    type Params = ();
    type Error = Error;

    fn name(&self) -> &'static str {
        "Segmentation Validator"
    }

    fn description(&self) -> &'static str {
        "Intersection over union and classification scores against a reference mask"
    }

    fn execute(&self, input: Self::Input, _params: Self::Params) -> Result<Self::Output> {
        let (prediction, reference) = input;
        Ok(ConfusionCounts::from_masks(&prediction, &reference)?.report())
    }
}
