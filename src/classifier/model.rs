use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use ndarray::Array1;

use super::error::ClassifierError;
use crate::bundle::ModelBundle;

/// Raw feature values keyed by feature name.
///
/// Insertion order is irrelevant: the classifier assembles the model input in
/// the bundle's declared feature order, so callers can collect values in
/// whatever order their UI presents them.
pub type FeatureSample = HashMap<String, f64>;

/// The outcome of one classification: the winning label plus the full
/// per-class probability vector, ordered like the bundle's `target_names`.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub class_index: usize,
    pub probabilities: Vec<f64>,
}

/// A wine cultivar classifier backed by a loaded model bundle.
///
/// The bundle is read-only after load, so the classifier is `Send + Sync` and
/// can be shared across threads behind the `Arc` it already holds.
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use cultivar::{bundle, features, Classifier};
///
/// let bundle = bundle::load_cached(&bundle::default_bundle_path())?;
/// let classifier = Classifier::from_bundle(bundle);
///
/// let prediction = classifier.predict(&features::default_sample())?;
/// println!("Predicted cultivar: {}", prediction.label);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Classifier {
    bundle: Arc<ModelBundle>,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<Classifier>();
    }
};

impl Classifier {
    pub fn from_bundle(bundle: Arc<ModelBundle>) -> Self {
        Self { bundle }
    }

    /// Feature names in the order the model was fitted with.
    pub fn feature_names(&self) -> &[String] {
        &self.bundle.feature_names
    }

    /// Human-readable class labels, indexed by class.
    pub fn target_names(&self) -> &[String] {
        &self.bundle.target_names
    }

    /// Returns information about the classifier's current state
    pub fn info(&self) -> super::ClassifierInfo {
        super::ClassifierInfo {
            algorithm: "Random Forest",
            num_features: self.bundle.feature_names.len(),
            num_classes: self.bundle.target_names.len(),
            num_trees: self.bundle.model.trees.len(),
            feature_names: self.bundle.feature_names.clone(),
            class_labels: self.bundle.target_names.clone(),
        }
    }

    /// Classifies one sample and returns the predicted label with per-class
    /// probabilities.
    ///
    /// The input vector is assembled strictly in the bundle's feature order,
    /// then standardized with the fitted scaler before forest inference.
    ///
    /// # Errors
    /// Returns `ClassifierError::ValidationError` when a declared feature is
    /// missing from the sample or its value is not finite.
    pub fn predict(&self, sample: &FeatureSample) -> Result<Prediction, ClassifierError> {
        let mut values = Vec::with_capacity(self.bundle.feature_names.len());
        for name in &self.bundle.feature_names {
            let value = sample.get(name).copied().ok_or_else(|| {
                ClassifierError::ValidationError(format!("Missing value for feature '{}'", name))
            })?;
            if !value.is_finite() {
                return Err(ClassifierError::ValidationError(format!(
                    "Value for feature '{}' is not finite",
                    name
                )));
            }
            values.push(value);
        }

        let raw = Array1::from(values);
        let scaled = self.bundle.scaler.transform(&raw);
        let probabilities = self.bundle.model.predict_proba(&scaled);
        // Argmax over the averaged distribution; ties resolve to the lowest
        // index, matching RandomForest::predict.
        let mut class_index = 0;
        for (index, &p) in probabilities.iter().enumerate() {
            if p > probabilities[class_index] {
                class_index = index;
            }
        }
        let label = self
            .bundle
            .target_names
            .get(class_index)
            .cloned()
            .ok_or_else(|| {
                ClassifierError::PredictionError(format!(
                    "Predicted class index {} has no label",
                    class_index
                ))
            })?;

        debug!(
            "Predicted '{}' (class {}) with probabilities {:?}",
            label, class_index, probabilities
        );

        Ok(Prediction {
            label,
            class_index,
            probabilities,
        })
    }
}
