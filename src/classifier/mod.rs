mod error;
mod model;
pub mod forest;
pub mod scaler;

pub use error::ClassifierError;
pub use forest::{DecisionTree, RandomForest, TreeNode};
pub use model::{Classifier, FeatureSample, Prediction};
pub use scaler::StandardScaler;

/// Information about the current state and configuration of a classifier
#[derive(Debug, Clone)]
pub struct ClassifierInfo {
    /// Name of the underlying algorithm
    pub algorithm: &'static str,
    /// Number of features the model was fitted with
    pub num_features: usize,
    /// Number of classes the classifier is trained on
    pub num_classes: usize,
    /// Number of trees in the forest
    pub num_trees: usize,
    /// Feature names in model order
    pub feature_names: Vec<String>,
    /// Labels of the classes
    pub class_labels: Vec<String>,
}
