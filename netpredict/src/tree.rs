// BSD 3-Clause License
//
// Copyright (c) 2025, BlackPortal ○
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this
//    list of conditions and the following disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice,
//    this list of conditions and the following disclaimer in the documentation
//    and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its
//    contributors may be used to endorse or promote products derived from
//    this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
// FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
// DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
// CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
// OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

// Splits gaining less than this are not worth a node.
const MIN_SPLIT_GAIN: f64 = 1e-6;

/// Growth limits and regularization shared by every tree of an ensemble.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    pub max_depth: usize,
    pub reg_lambda: f64,
    pub gamma: f64,
    pub min_child_weight: f64,
}

/// Represents a node of a regression tree, either a split or a leaf at any given moment.
///
/// Rows whose `feature` value is strictly below `threshold` descend left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Internal {
        feature: usize,
        threshold: f64,
        gain: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    Leaf { weight: f64 },
}

/// A single regression tree fitted to gradient statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    root: TreeNode,
}

#[derive(Debug, Clone, Copy)]
struct Split {
    feature: usize,
    threshold: f64,
    gain: f64,
}

struct TreeBuilder<'a> {
    x: &'a Array2<f64>,
    grad: &'a Array1<f64>,
    hess: &'a Array1<f64>,
    columns: &'a [usize],
    params: &'a TreeParams,
}

impl RegressionTree {
    /// Grows a tree on the rows in `rows`, considering only the feature
    /// indices in `columns`.
    ///
    /// Splits are chosen greedily by exact enumeration of every distinct
    /// feature value, scoring each candidate with the second-order gain
    /// `½[G_L²/(H_L+λ) + G_R²/(H_R+λ) − G²/(H+λ)] − γ`. Leaves hold the
    /// optimal weight `−G/(H+λ)`.
    pub fn grow(
        x: &Array2<f64>,
        grad: &Array1<f64>,
        hess: &Array1<f64>,
        rows: Vec<usize>,
        columns: &[usize],
        params: &TreeParams,
    ) -> RegressionTree {
        let builder = TreeBuilder { x, grad, hess, columns, params };
        RegressionTree { root: builder.build_node(rows, 0) }
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    /// Multiplies every leaf weight by `factor`.
    pub fn shrink(&mut self, factor: f64) {
        fn visit(node: &mut TreeNode, factor: f64) {
            match node {
                TreeNode::Leaf { weight } => *weight *= factor,
                TreeNode::Internal { left, right, .. } => {
                    visit(left, factor);
                    visit(right, factor);
                }
            }
        }
        visit(&mut self.root, factor);
    }

    pub fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        let mut current = &self.root;
        loop {
            match current {
                TreeNode::Leaf { weight } => return *weight,
                TreeNode::Internal { feature, threshold, left, right, .. } => {
                    current = if row[*feature] < *threshold { left } else { right };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        fn depth(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Internal { left, right, .. } => 1 + depth(left).max(depth(right)),
            }
        }
        depth(&self.root)
    }

    pub fn n_leaves(&self) -> usize {
        fn leaves(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Internal { left, right, .. } => leaves(left) + leaves(right),
            }
        }
        leaves(&self.root)
    }

    /// Adds the gain of every split to the entry of the feature it splits on.
    pub fn accumulate_gain(&self, totals: &mut [f64]) {
        fn visit(node: &TreeNode, totals: &mut [f64]) {
            if let TreeNode::Internal { feature, gain, left, right, .. } = node {
                totals[*feature] += *gain;
                visit(left, totals);
                visit(right, totals);
            }
        }
        visit(&self.root, totals);
    }
}

impl TreeBuilder<'_> {
    /// Recursively splits the rows on the best feature and threshold.
    fn build_node(&self, rows: Vec<usize>, depth: usize) -> TreeNode {
        let (g, h) = self.sums(&rows);

        if depth >= self.params.max_depth || rows.len() < 2 {
            return self.leaf(g, h);
        }

        let split = match self.find_best_split(&rows, g, h) {
            Some(split) => split,
            None => return self.leaf(g, h),
        };

        let (left_rows, right_rows) = self.split_rows(rows, split.feature, split.threshold);
        if left_rows.is_empty() || right_rows.is_empty() {
            return self.leaf(g, h);
        }

        TreeNode::Internal {
            feature: split.feature,
            threshold: split.threshold,
            gain: split.gain,
            left: Box::new(self.build_node(left_rows, depth + 1)),
            right: Box::new(self.build_node(right_rows, depth + 1)),
        }
    }

    fn sums(&self, rows: &[usize]) -> (f64, f64) {
        rows.iter().fold((0.0, 0.0), |(g, h), &r| (g + self.grad[r], h + self.hess[r]))
    }

    fn leaf(&self, g: f64, h: f64) -> TreeNode {
        let denom = h + self.params.reg_lambda;
        let weight = if denom > 0.0 { -g / denom } else { 0.0 };
        TreeNode::Leaf { weight }
    }

    fn score(&self, g: f64, h: f64) -> f64 {
        let denom = h + self.params.reg_lambda;
        if denom > 0.0 { g * g / denom } else { 0.0 }
    }

    fn find_best_split(&self, rows: &[usize], g_total: f64, h_total: f64) -> Option<Split> {
        let parent_score = self.score(g_total, h_total);
        let mut best: Option<Split> = None;

        for &feature in self.columns {
            let mut values: Vec<(f64, usize)> =
                rows.iter().map(|&r| (self.x[[r, feature]], r)).collect();
            values.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut g_left = 0.0;
            let mut h_left = 0.0;
            for i in 0..values.len() - 1 {
                let (value, row) = values[i];
                g_left += self.grad[row];
                h_left += self.hess[row];

                let next_value = values[i + 1].0;
                if next_value <= value {
                    continue;
                }

                let g_right = g_total - g_left;
                let h_right = h_total - h_left;
                if h_left < self.params.min_child_weight || h_right < self.params.min_child_weight {
                    continue;
                }

                let gain = 0.5
                    * (self.score(g_left, h_left) + self.score(g_right, h_right) - parent_score)
                    - self.params.gamma;
                if gain > MIN_SPLIT_GAIN && best.map_or(true, |b| gain > b.gain) {
                    best = Some(Split { feature, threshold: midpoint(value, next_value), gain });
                }
            }
        }
        best
    }

    /// Partitions `rows` by comparing `feature` against `threshold`.
    fn split_rows(
        &self,
        rows: Vec<usize>,
        feature: usize,
        threshold: f64,
    ) -> (Vec<usize>, Vec<usize>) {
        rows.into_iter().partition(|&r| self.x[[r, feature]] < threshold)
    }
}

// Midpoint of two adjacent distinct values, falling back to the upper one
// when rounding collapses the midpoint onto the lower.
fn midpoint(lower: f64, upper: f64) -> f64 {
    let mid = lower + (upper - lower) / 2.0;
    if mid > lower { mid } else { upper }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn params(max_depth: usize) -> TreeParams {
        TreeParams { max_depth, reg_lambda: 0.0, gamma: 0.0, min_child_weight: 1.0 }
    }

    // Gradients of squared error at a zero prediction are simply -y.
    fn grow(x: &Array2<f64>, y: &Array1<f64>, params: &TreeParams) -> RegressionTree {
        let grad = y.mapv(|v| -v);
        let hess = Array1::ones(y.len());
        let columns: Vec<usize> = (0..x.ncols()).collect();
        RegressionTree::grow(x, &grad, &hess, (0..y.len()).collect(), &columns, params)
    }

    #[test]
    fn test_tree_learns_step() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![0.0, 0.0, 10.0, 10.0];
        let tree = grow(&x, &y, &params(6));

        match tree.root() {
            TreeNode::Internal { feature, threshold, .. } => {
                assert_eq!(*feature, 0);
                assert_eq!(*threshold, 2.5);
            }
            other => panic!("Expected a split, got {:?}", other),
        }
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.predict_row(array![1.5].view()), 0.0);
        assert_eq!(tree.predict_row(array![3.5].view()), 10.0);
    }

    #[test]
    fn test_tree_picks_informative_feature() {
        let x = array![[5.0, 1.0], [1.0, 2.0], [4.0, 3.0], [2.0, 4.0]];
        let y = array![-3.0, -3.0, 3.0, 3.0];
        let tree = grow(&x, &y, &params(1));

        match tree.root() {
            TreeNode::Internal { feature, .. } => assert_eq!(*feature, 1),
            other => panic!("Expected a split, got {:?}", other),
        }
    }

    #[test]
    fn test_tree_respects_max_depth() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0], [8.0]];
        let y = array![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];

        assert_eq!(grow(&x, &y, &params(1)).depth(), 1);
        assert_eq!(grow(&x, &y, &params(2)).n_leaves(), 4);
        assert!(grow(&x, &y, &params(6)).depth() <= 6);
    }

    #[test]
    fn test_tree_constant_target_is_a_leaf() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![4.0, 4.0, 4.0];
        let tree = grow(&x, &y, &params(6));
        assert_eq!(tree.root(), &TreeNode::Leaf { weight: 4.0 });
    }

    #[test]
    fn test_tree_identical_features_cannot_split() {
        let x = array![[1.0], [1.0], [1.0]];
        let y = array![0.0, 5.0, 10.0];
        let tree = grow(&x, &y, &params(6));
        assert_eq!(tree.n_leaves(), 1);
    }

    #[test]
    fn test_tree_gamma_prunes_weak_splits() {
        let x = array![[1.0], [2.0]];
        let y = array![0.0, 1.0];
        let strict = TreeParams { gamma: 10.0, ..params(6) };
        assert_eq!(grow(&x, &y, &strict).n_leaves(), 1);
    }

    #[test]
    fn test_tree_min_child_weight() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![0.0, 0.0, 9.0];
        let heavy = TreeParams { min_child_weight: 2.0, ..params(6) };
        assert_eq!(grow(&x, &y, &heavy).n_leaves(), 1);
    }

    #[test]
    fn test_tree_lambda_shrinks_leaf() {
        let x = array![[1.0], [2.0]];
        let y = array![3.0, 3.0];
        let regularized = TreeParams { reg_lambda: 1.0, ..params(6) };
        // -G / (H + λ) = 6 / 3
        assert_eq!(grow(&x, &y, &regularized).root(), &TreeNode::Leaf { weight: 2.0 });
    }

    #[test]
    fn test_tree_column_subset() {
        let x = array![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0], [4.0, 4.0]];
        let y = array![0.0, 0.0, 10.0, 10.0];
        let grad = y.mapv(|v: f64| -v);
        let hess = Array1::ones(4);
        let tree = RegressionTree::grow(&x, &grad, &hess, vec![0, 1, 2, 3], &[1], &params(6));
        match tree.root() {
            TreeNode::Internal { feature, .. } => assert_eq!(*feature, 1),
            other => panic!("Expected a split, got {:?}", other),
        }
    }

    #[test]
    fn test_tree_shrink_and_gain() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![0.0, 0.0, 10.0, 10.0];
        let mut tree = grow(&x, &y, &params(6));
        tree.shrink(0.5);
        assert_eq!(tree.predict_row(array![4.0].view()), 5.0);

        let mut totals = [0.0];
        tree.accumulate_gain(&mut totals);
        // ½ (0 + 400/2 − 400/4) = 50
        assert!((totals[0] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_midpoint_adjacent_floats() {
        let lower = 1.0_f64;
        let upper = f64::from_bits(lower.to_bits() + 1);
        assert_eq!(midpoint(lower, upper), upper);
        assert_eq!(midpoint(1.0, 3.0), 2.0);
    }
}
