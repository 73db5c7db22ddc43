//! A wine cultivar classifier driven by a pre-trained random forest.
//!
//! The crate loads a serialized model bundle (fitted forest, fitted
//! standardization scaler, feature names, class labels) from disk once per
//! process, then classifies six-value chemical samples into cultivars with
//! per-class confidence.
//!
//! # Basic Usage
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use cultivar::{bundle, features, Classifier};
//!
//! let bundle = bundle::load_cached(&bundle::default_bundle_path())?;
//! let classifier = Classifier::from_bundle(bundle);
//!
//! let mut sample = features::default_sample();
//! sample.insert("alcohol".to_string(), 14.2);
//! sample.insert("proline".to_string(), 1280.0);
//!
//! let prediction = classifier.predict(&sample)?;
//! println!("Predicted cultivar: {}", prediction.label);
//! for (label, probability) in classifier
//!     .target_names()
//!     .iter()
//!     .zip(prediction.probabilities.iter())
//! {
//!     println!("{}: {:.2}%", label, probability * 100.0);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! The bundle is immutable after load and the classifier only holds an `Arc`
//! to it, so a `Classifier` can be cloned and shared across threads freely.

pub mod bundle;
pub mod classifier;
pub mod features;
pub mod form;

pub use bundle::{BundleError, ModelBundle};
pub use classifier::{
    Classifier, ClassifierError, ClassifierInfo, FeatureSample, Prediction,
};
pub use features::{FeatureSpec, FEATURE_SPECS};

pub fn init_logger() {
    env_logger::init();
}
