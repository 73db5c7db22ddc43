use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// A fitted standardization transform: `(x - mean) / scale` per feature.
///
/// The parameters come from the training pipeline and arrive as part of the
/// deserialized model bundle; nothing is fitted at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Number of features the scaler was fitted with.
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Applies the affine transform to a raw feature vector.
    ///
    /// The vector must be in the same feature order the scaler was fitted
    /// with. Length mismatches are rejected upstream by bundle validation and
    /// the classifier's input checks.
    pub fn transform(&self, input: &Array1<f64>) -> Array1<f64> {
        Array1::from_iter(
            input
                .iter()
                .zip(self.mean.iter().zip(self.scale.iter()))
                .map(|(&x, (&mean, &scale))| (x - mean) / scale),
        )
    }
}
