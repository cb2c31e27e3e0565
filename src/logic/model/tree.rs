//! Regression Tree (CART)
//!
//! Greedy squared-error splits on a flat node array. Building blocks for
//! the ensemble estimators; not a candidate on its own.

use serde::{Deserialize, Serialize};

use crate::error::{RecoveryError, RecoveryResult};
use crate::logic::features::{FeatureRow, FEATURE_COUNT};

/// Minimum SSE decrease for a split to count
const MIN_GAIN: f64 = 1e-12;

/// Growth limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// None = grow until leaves are pure or too small
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

impl TreeParams {
    pub fn with_depth(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum TreeNode {
    Leaf {
        value: f64,
    },
    /// Rows with `row[feature] <= threshold` go left
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// Sum and squared error of `targets` over `sample`
fn node_stats(targets: &[f64], sample: &[usize]) -> (f64, f64) {
    let n = sample.len() as f64;
    let sum: f64 = sample.iter().map(|&i| targets[i]).sum();
    let sum_sq: f64 = sample.iter().map(|&i| targets[i] * targets[i]).sum();
    (sum / n, (sum_sq - sum * sum / n).max(0.0))
}

impl RegressionTree {
    /// Grow a tree over `sample` (row indices, repeats allowed).
    ///
    /// Each split's SSE decrease is added to `importances[feature]`.
    pub fn fit(
        rows: &[FeatureRow],
        targets: &[f64],
        sample: &[usize],
        params: &TreeParams,
        importances: &mut [f64; FEATURE_COUNT],
    ) -> Self {
        let mut tree = Self::default();
        if !sample.is_empty() {
            tree.grow(rows, targets, sample.to_vec(), 0, params, importances);
        }
        tree
    }

    fn grow(
        &mut self,
        rows: &[FeatureRow],
        targets: &[f64],
        sample: Vec<usize>,
        depth: usize,
        params: &TreeParams,
        importances: &mut [f64; FEATURE_COUNT],
    ) -> usize {
        let (mean, sse) = node_stats(targets, &sample);
        let node_id = self.nodes.len();
        self.nodes.push(TreeNode::Leaf { value: mean });

        let depth_reached = params.max_depth.map_or(false, |max| depth >= max);
        if depth_reached || sample.len() < params.min_samples_split || sse <= MIN_GAIN {
            return node_id;
        }

        let Some(best) = Self::best_split(rows, targets, &sample, sse, params) else {
            return node_id;
        };

        let (left_sample, right_sample): (Vec<usize>, Vec<usize>) = sample
            .iter()
            .partition(|&&i| rows[i][best.feature] <= best.threshold);

        importances[best.feature] += best.gain;

        let left = self.grow(rows, targets, left_sample, depth + 1, params, importances);
        let right = self.grow(rows, targets, right_sample, depth + 1, params, importances);
        self.nodes[node_id] = TreeNode::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };

        node_id
    }

    fn best_split(
        rows: &[FeatureRow],
        targets: &[f64],
        sample: &[usize],
        parent_sse: f64,
        params: &TreeParams,
    ) -> Option<BestSplit> {
        let n = sample.len();
        let min_leaf = params.min_samples_leaf.max(1);
        if n < 2 * min_leaf {
            return None;
        }

        let mut best: Option<BestSplit> = None;
        let mut order = sample.to_vec();

        for feature in 0..FEATURE_COUNT {
            order.sort_by(|&a, &b| {
                rows[a][feature]
                    .partial_cmp(&rows[b][feature])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let total_sum: f64 = order.iter().map(|&i| targets[i]).sum();
            let total_sq: f64 = order.iter().map(|&i| targets[i] * targets[i]).sum();
            let mut left_sum = 0.0;
            let mut left_sq = 0.0;

            for split in 1..n {
                let y = targets[order[split - 1]];
                left_sum += y;
                left_sq += y * y;

                if split < min_leaf || n - split < min_leaf {
                    continue;
                }

                let lo = rows[order[split - 1]][feature];
                let hi = rows[order[split]][feature];
                if lo >= hi {
                    continue;
                }

                let nl = split as f64;
                let nr = (n - split) as f64;
                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let left_sse = (left_sq - left_sum * left_sum / nl).max(0.0);
                let right_sse = (right_sq - right_sum * right_sum / nr).max(0.0);
                let gain = parent_sse - left_sse - right_sse;

                let improves = match &best {
                    Some(b) => gain > b.gain + MIN_GAIN,
                    None => gain > MIN_GAIN,
                };
                if improves {
                    let mid = lo + (hi - lo) / 2.0;
                    best = Some(BestSplit {
                        feature,
                        threshold: if mid < hi { mid } else { lo },
                        gain,
                    });
                }
            }
        }

        best
    }

    pub fn predict(&self, row: &FeatureRow) -> f64 {
        let mut id = 0;
        loop {
            match self.nodes.get(id) {
                Some(TreeNode::Leaf { value }) => return *value,
                Some(TreeNode::Split { feature, threshold, left, right }) => {
                    id = if row[*feature] <= *threshold { *left } else { *right };
                }
                None => return f64::NAN,
            }
        }
    }

    /// Structural check for trees read back from disk
    ///
    /// Children always come after their parent in `nodes`, so every
    /// accepted tree terminates in `predict`.
    pub fn validate(&self) -> RecoveryResult<()> {
        if self.nodes.is_empty() {
            return Err(RecoveryError::MalformedArtifact("tree has no nodes".into()));
        }
        let len = self.nodes.len();
        for (id, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Leaf { value } if !value.is_finite() => {
                    return Err(RecoveryError::MalformedArtifact(format!(
                        "leaf {} holds non-finite value {}",
                        id, value
                    )));
                }
                TreeNode::Leaf { .. } => {}
                TreeNode::Split { feature, threshold, left, right } => {
                    let child_ok = |c: usize| c > id && c < len;
                    if feature >= FEATURE_COUNT || !threshold.is_finite() || !child_ok(left) || !child_ok(right) {
                        return Err(RecoveryError::MalformedArtifact(format!(
                            "split {} is out of range (feature {}, children {}/{}, {} nodes)",
                            id, feature, left, right, len
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[TreeNode], id: usize) -> usize {
            match nodes.get(id) {
                Some(TreeNode::Split { left, right, .. }) => 1 + walk(nodes, *left).max(walk(nodes, *right)),
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_data() -> (Vec<FeatureRow>, Vec<f64>) {
        let rows: Vec<FeatureRow> = (0..20)
            .map(|i| {
                let mut r = [0.0; FEATURE_COUNT];
                r[2] = i as f64;
                r[4] = (i % 3) as f64;
                r
            })
            .collect();
        let targets = rows.iter().map(|r| if r[2] < 10.0 { 2.0 } else { 8.0 }).collect();
        (rows, targets)
    }

    #[test]
    fn test_learns_step_function() {
        let (rows, targets) = step_data();
        let sample: Vec<usize> = (0..rows.len()).collect();
        let mut imp = [0.0; FEATURE_COUNT];
        let tree = RegressionTree::fit(&rows, &targets, &sample, &TreeParams::default(), &mut imp);

        assert_eq!(tree.depth(), 1);
        for (row, y) in rows.iter().zip(&targets) {
            assert_eq!(tree.predict(row), *y);
        }
        match &tree.nodes[0] {
            TreeNode::Split { feature, threshold, .. } => {
                assert_eq!(*feature, 2);
                assert_eq!(*threshold, 9.5);
            }
            other => panic!("expected split, got {:?}", other),
        }
        assert!(imp[2] > 0.0);
        assert_eq!(imp[4], 0.0);
    }

    #[test]
    fn test_depth_limit_respected() {
        let (rows, _) = step_data();
        let targets: Vec<f64> = rows.iter().map(|r| r[2] * r[2]).collect();
        let sample: Vec<usize> = (0..rows.len()).collect();
        let mut imp = [0.0; FEATURE_COUNT];
        let tree = RegressionTree::fit(&rows, &targets, &sample, &TreeParams::with_depth(3), &mut imp);
        assert!(tree.depth() <= 3);
    }

    #[test]
    fn test_fitted_tree_validates() {
        let (rows, targets) = step_data();
        let sample: Vec<usize> = (0..rows.len()).collect();
        let mut imp = [0.0; FEATURE_COUNT];
        let tree = RegressionTree::fit(&rows, &targets, &sample, &TreeParams::default(), &mut imp);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_children_are_rejected() {
        let tree = RegressionTree {
            nodes: vec![TreeNode::Split {
                feature: 0,
                threshold: 1.0,
                left: 5,
                right: 6,
            }],
        };
        assert!(matches!(tree.validate(), Err(RecoveryError::MalformedArtifact(_))));
        assert!(tree.predict(&[0.0; FEATURE_COUNT]).is_nan());

        let cyclic = RegressionTree {
            nodes: vec![
                TreeNode::Split { feature: 0, threshold: 1.0, left: 0, right: 1 },
                TreeNode::Leaf { value: 2.0 },
            ],
        };
        assert!(cyclic.validate().is_err());
        assert!(RegressionTree::default().validate().is_err());
    }

    #[test]
    fn test_constant_target_is_single_leaf() {
        let (rows, _) = step_data();
        let targets = vec![4.0; rows.len()];
        let sample: Vec<usize> = (0..rows.len()).collect();
        let mut imp = [0.0; FEATURE_COUNT];
        let tree = RegressionTree::fit(&rows, &targets, &sample, &TreeParams::default(), &mut imp);
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.predict(&rows[0]), 4.0);
    }
}
