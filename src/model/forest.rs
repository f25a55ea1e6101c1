use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub random_seed: u64,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            random_seed: 42,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    score: f64,
}

impl RegressionTree {
    pub fn fit(x: &[Vec<f64>], y: &[f64], sample: &[usize], params: &ForestParams) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        if sample.is_empty() {
            tree.nodes.push(Node::Leaf { value: 0.0 });
            return tree;
        }
        tree.grow(x, y, sample.to_vec(), 0, params);
        tree
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(Node::Leaf { value }) => return *value,
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = features.get(*feature).copied().unwrap_or(0.0);
                    idx = if value <= *threshold { *left } else { *right };
                }
                None => return 0.0,
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn grow(
        &mut self,
        x: &[Vec<f64>],
        y: &[f64],
        indices: Vec<usize>,
        depth: usize,
        params: &ForestParams,
    ) -> usize {
        let count = indices.len();
        let sum: f64 = indices.iter().map(|&i| y[i]).sum();
        let node_id = self.nodes.len();
        self.nodes.push(Node::Leaf {
            value: sum / count as f64,
        });

        let min_leaf = params.min_samples_leaf.max(1);
        let depth_reached = params.max_depth.is_some_and(|max| depth >= max);
        if depth_reached
            || count < params.min_samples_split.max(2)
            || count < 2 * min_leaf
            || is_pure(y, &indices)
        {
            return node_id;
        }

        let Some(split) = best_split(x, y, &indices, min_leaf) else {
            return node_id;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| x[i][split.feature] <= split.threshold);
        let left_id = self.grow(x, y, left, depth + 1, params);
        let right_id = self.grow(x, y, right, depth + 1, params);
        self.nodes[node_id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: left_id,
            right: right_id,
        };
        node_id
    }
}

fn is_pure(y: &[f64], indices: &[usize]) -> bool {
    let first = y[indices[0]];
    indices.iter().all(|&i| (y[i] - first).abs() <= f64::EPSILON)
}

// Maximizes `sum_l^2 / n_l + sum_r^2 / n_r`, which is equivalent to minimizing
// the summed squared error of the two children.
fn best_split(x: &[Vec<f64>], y: &[f64], indices: &[usize], min_leaf: usize) -> Option<SplitCandidate> {
    let count = indices.len();
    let total: f64 = indices.iter().map(|&i| y[i]).sum();
    let parent_score = total * total / count as f64;
    let n_features = x.get(indices[0]).map(Vec::len).unwrap_or(0);

    let mut best: Option<SplitCandidate> = None;
    let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(count);

    for feature in 0..n_features {
        let (min, max) = indices.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
            let value = x[i][feature];
            (lo.min(value), hi.max(value))
        });
        if min >= max {
            continue;
        }

        pairs.clear();
        pairs.extend(indices.iter().map(|&i| (x[i][feature], y[i])));
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut left_sum = 0.0;
        for pos in 0..count - 1 {
            left_sum += pairs[pos].1;
            let left_count = pos + 1;
            let right_count = count - left_count;
            if pairs[pos].0 >= pairs[pos + 1].0 || left_count < min_leaf || right_count < min_leaf {
                continue;
            }

            let right_sum = total - left_sum;
            let score = left_sum * left_sum / left_count as f64 + right_sum * right_sum / right_count as f64;
            let improves = best.as_ref().map_or(true, |current| score > current.score + 1e-12);
            if improves {
                let (lower, upper) = (pairs[pos].0, pairs[pos + 1].0);
                let mut threshold = lower + (upper - lower) / 2.0;
                if threshold >= upper {
                    threshold = lower;
                }
                best = Some(SplitCandidate {
                    feature,
                    threshold,
                    score,
                });
            }
        }
    }

    best.filter(|split| split.score > parent_score + 1e-12)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    params: ForestParams,
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl RandomForestRegressor {
    pub fn fit(x: &[Vec<f64>], y: &[f64], params: ForestParams) -> Self {
        let n_features = x.first().map(Vec::len).unwrap_or(0);
        let mut rng = StdRng::seed_from_u64(params.random_seed);
        let rows = x.len();

        let mut trees = Vec::with_capacity(params.n_estimators);
        for _ in 0..params.n_estimators {
            let sample: Vec<usize> = (0..rows).map(|_| rng.gen_range(0..rows)).collect();
            trees.push(RegressionTree::fit(x, y, &sample, &params));
        }

        Self {
            params,
            n_features,
            trees,
        }
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let total: f64 = self.trees.iter().map(|tree| tree.predict(features)).sum();
        total / self.trees.len() as f64
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}
