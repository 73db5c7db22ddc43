use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::classifier::{RandomForest, StandardScaler, TreeNode};

/// Default location of the serialized model bundle, relative to the working
/// directory.
pub const DEFAULT_BUNDLE_PATH: &str = "model/wine_cultivar_model.json";

#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("Model bundle not found at {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Failed to parse model bundle: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Invalid model bundle: {0}")]
    Invalid(String),
}

/// The serialized artifact produced by the training pipeline: a fitted
/// forest, the scaler it was fitted alongside, and the metadata needed to
/// assemble inputs and label outputs.
///
/// Immutable after load; the process never writes it back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    pub model: RandomForest,
    pub scaler: StandardScaler,
    pub feature_names: Vec<String>,
    pub target_names: Vec<String>,
}

impl ModelBundle {
    /// Reads and deserializes a bundle, then checks its structure.
    ///
    /// A missing file and any other load failure are distinct terminal
    /// conditions for callers; nothing is retried and there is no fallback
    /// model.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, BundleError> {
        let path = path.as_ref();
        log::info!("Loading model bundle from {:?}", path);
        if !path.exists() {
            return Err(BundleError::NotFound(path.to_path_buf()));
        }
        let bytes = fs::read(path)?;
        log::info!("Read {} bytes", bytes.len());
        let bundle: ModelBundle = serde_json::from_slice(&bytes)?;
        bundle.validate()?;
        log::info!(
            "Bundle loaded: {} features, {} classes, {} trees",
            bundle.feature_names.len(),
            bundle.target_names.len(),
            bundle.model.trees.len()
        );
        Ok(bundle)
    }

    /// Validates that the bundle pieces agree with each other.
    ///
    /// A bundle that fails here would otherwise misbehave deep inside
    /// inference (wrong-length scaler, out-of-range node index), so it is
    /// rejected at load time instead.
    fn validate(&self) -> Result<(), BundleError> {
        let n_features = self.feature_names.len();
        let n_classes = self.target_names.len();

        if n_features == 0 {
            return Err(BundleError::Invalid("no feature names declared".into()));
        }
        if n_classes == 0 {
            return Err(BundleError::Invalid("no target names declared".into()));
        }
        if self.scaler.len() != n_features || self.scaler.scale.len() != n_features {
            return Err(BundleError::Invalid(format!(
                "scaler was fitted with {} features, bundle declares {}",
                self.scaler.len(),
                n_features
            )));
        }
        if self.model.n_classes != n_classes {
            return Err(BundleError::Invalid(format!(
                "model predicts {} classes, bundle declares {} target names",
                self.model.n_classes, n_classes
            )));
        }
        if self.model.trees.is_empty() {
            return Err(BundleError::Invalid("forest has no trees".into()));
        }

        for (tree_index, tree) in self.model.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(BundleError::Invalid(format!(
                    "tree {} has no nodes",
                    tree_index
                )));
            }
            for node in &tree.nodes {
                match node {
                    TreeNode::Split {
                        feature,
                        left,
                        right,
                        ..
                    } => {
                        if *feature >= n_features {
                            return Err(BundleError::Invalid(format!(
                                "tree {} splits on feature {} but only {} exist",
                                tree_index, feature, n_features
                            )));
                        }
                        if *left >= tree.nodes.len() || *right >= tree.nodes.len() {
                            return Err(BundleError::Invalid(format!(
                                "tree {} has a child index out of range",
                                tree_index
                            )));
                        }
                    }
                    TreeNode::Leaf { distribution } => {
                        if distribution.len() != n_classes {
                            return Err(BundleError::Invalid(format!(
                                "tree {} has a leaf with {} classes, expected {}",
                                tree_index,
                                distribution.len(),
                                n_classes
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

/// Returns the bundle path to use: the `CULTIVAR_MODEL` environment variable
/// when set, the fixed relative default otherwise.
pub fn default_bundle_path() -> PathBuf {
    if let Ok(path) = env::var("CULTIVAR_MODEL") {
        return PathBuf::from(path);
    }
    PathBuf::from(DEFAULT_BUNDLE_PATH)
}

lazy_static! {
    static ref CACHED_BUNDLE: Mutex<Option<Arc<ModelBundle>>> = Mutex::new(None);
}

/// Loads the bundle at most once per process and hands back the same
/// in-memory objects on every later call.
///
/// The slot is held under a lock so concurrent first accesses cannot
/// double-load. A failed load is not cached, but callers treat load errors as
/// terminal anyway.
pub fn load_cached<P: AsRef<Path>>(path: P) -> Result<Arc<ModelBundle>, BundleError> {
    let mut slot = CACHED_BUNDLE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(bundle) = slot.as_ref() {
        log::debug!("Reusing cached model bundle");
        return Ok(Arc::clone(bundle));
    }
    let bundle = Arc::new(ModelBundle::load(path)?);
    *slot = Some(Arc::clone(&bundle));
    Ok(bundle)
}

/// A small two-feature, two-class bundle for unit tests.
#[cfg(test)]
pub(crate) fn test_bundle() -> ModelBundle {
    use crate::classifier::DecisionTree;

    let stump = |feature: usize, threshold: f64, left: Vec<f64>, right: Vec<f64>| DecisionTree {
        nodes: vec![
            TreeNode::Split {
                feature,
                threshold,
                left: 1,
                right: 2,
            },
            TreeNode::Leaf { distribution: left },
            TreeNode::Leaf {
                distribution: right,
            },
        ],
    };

    ModelBundle {
        model: RandomForest {
            n_classes: 2,
            trees: vec![
                stump(1, 0.5, vec![0.2, 0.8], vec![0.9, 0.1]),
                stump(0, 0.6, vec![0.3, 0.7], vec![0.8, 0.2]),
            ],
        },
        scaler: StandardScaler {
            mean: vec![13.0, 750.0],
            scale: vec![0.8, 315.0],
        },
        feature_names: vec!["alcohol".into(), "proline".into()],
        target_names: vec!["Cultivar 1".into(), "Cultivar 2".into()],
    }
}
