use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// A node in a fitted decision tree.
///
/// Trees are stored as a flat arena with the root at index 0, matching the
/// layout of the serialized bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Internal split: `x[feature] <= threshold` descends left, otherwise
    /// right.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Terminal node carrying the class distribution of the training samples
    /// that reached it.
    Leaf { distribution: Vec<f64> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Walks from the root and returns the distribution at the reached leaf.
    fn leaf_distribution(&self, input: &Array1<f64>) -> &[f64] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if input[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                TreeNode::Leaf { distribution } => return distribution,
            }
        }
    }
}

/// An inference-only random forest.
///
/// Probabilities are the mean of the per-tree leaf class distributions; the
/// predicted class is the argmax of that mean.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_classes: usize,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Per-class probabilities for a scaled feature vector.
    ///
    /// The returned vector has length `n_classes` and sums to 1 as long as
    /// every leaf distribution does (which bundle validation enforces).
    pub fn predict_proba(&self, input: &Array1<f64>) -> Vec<f64> {
        let mut probabilities = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (total, &p) in probabilities.iter_mut().zip(tree.leaf_distribution(input)) {
                *total += p;
            }
        }
        let tree_count = self.trees.len() as f64;
        for p in &mut probabilities {
            *p /= tree_count;
        }
        probabilities
    }

    /// Index of the most probable class; ties resolve to the lowest index.
    pub fn predict(&self, input: &Array1<f64>) -> usize {
        let probabilities = self.predict_proba(input);
        let mut best = 0;
        for (index, &p) in probabilities.iter().enumerate() {
            if p > probabilities[best] {
                best = index;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn stump(feature: usize, threshold: f64, left: Vec<f64>, right: Vec<f64>) -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { distribution: left },
                TreeNode::Leaf { distribution: right },
            ],
        }
    }

    #[test]
    fn test_single_tree_routing() {
        let forest = RandomForest {
            n_classes: 2,
            trees: vec![stump(0, 0.5, vec![1.0, 0.0], vec![0.0, 1.0])],
        };
        assert_eq!(forest.predict(&array![0.0, 9.9]), 0);
        assert_eq!(forest.predict(&array![1.0, 9.9]), 1);
    }

    #[test]
    fn test_threshold_boundary_goes_left() {
        let forest = RandomForest {
            n_classes: 2,
            trees: vec![stump(0, 0.5, vec![1.0, 0.0], vec![0.0, 1.0])],
        };
        // x[feature] <= threshold descends left
        assert_eq!(forest.predict(&array![0.5]), 0);
    }

    #[test]
    fn test_probabilities_average_across_trees() {
        let forest = RandomForest {
            n_classes: 2,
            trees: vec![
                stump(0, 0.0, vec![1.0, 0.0], vec![0.0, 1.0]),
                stump(0, 10.0, vec![0.5, 0.5], vec![0.0, 1.0]),
            ],
        };
        // First tree routes right, second routes left.
        let probabilities = forest.predict_proba(&array![5.0]);
        assert_eq!(probabilities, vec![0.25, 0.75]);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let forest = RandomForest {
            n_classes: 3,
            trees: vec![
                stump(0, 0.5, vec![0.8, 0.15, 0.05], vec![0.1, 0.2, 0.7]),
                stump(1, -1.0, vec![0.2, 0.6, 0.2], vec![0.3, 0.4, 0.3]),
            ],
        };
        for input in [array![0.0, 0.0], array![1.0, -2.0], array![-3.0, 4.0]] {
            let probabilities = forest.predict_proba(&input);
            assert_eq!(probabilities.len(), 3);
            let total: f64 = probabilities.iter().sum();
            assert!((total - 1.0).abs() < 1e-9);
            assert!(probabilities.iter().all(|&p| (0.0..=1.0).contains(&p)));
        }
    }

    #[test]
    fn test_tie_resolves_to_lowest_index() {
        let forest = RandomForest {
            n_classes: 2,
            trees: vec![stump(0, 0.0, vec![0.5, 0.5], vec![0.5, 0.5])],
        };
        assert_eq!(forest.predict(&array![1.0]), 0);
    }

    #[test]
    fn test_deeper_tree_traversal() {
        // Root splits on feature 0, the right child splits on feature 1.
        let tree = DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature: 0,
                    threshold: 0.0,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf {
                    distribution: vec![1.0, 0.0, 0.0],
                },
                TreeNode::Split {
                    feature: 1,
                    threshold: 0.0,
                    left: 3,
                    right: 4,
                },
                TreeNode::Leaf {
                    distribution: vec![0.0, 1.0, 0.0],
                },
                TreeNode::Leaf {
                    distribution: vec![0.0, 0.0, 1.0],
                },
            ],
        };
        let forest = RandomForest {
            n_classes: 3,
            trees: vec![tree],
        };
        assert_eq!(forest.predict(&array![-1.0, 0.0]), 0);
        assert_eq!(forest.predict(&array![1.0, -1.0]), 1);
        assert_eq!(forest.predict(&array![1.0, 1.0]), 2);
    }
}
