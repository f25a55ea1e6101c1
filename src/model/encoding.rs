use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    categories: Vec<Vec<String>>,
}

impl OneHotEncoder {
    pub fn fit<const N: usize>(rows: &[[&str; N]]) -> Self {
        let mut seen: Vec<BTreeSet<&str>> = vec![BTreeSet::new(); N];
        for row in rows {
            for (column, value) in row.iter().enumerate() {
                seen[column].insert(*value);
            }
        }
        Self {
            categories: seen
                .into_iter()
                .map(|set| set.into_iter().map(str::to_string).collect())
                .collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    pub fn categories(&self, column: usize) -> &[String] {
        self.categories.get(column).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn encode_into(&self, values: &[&str], out: &mut Vec<f64>) {
        for (column, categories) in self.categories.iter().enumerate() {
            let offset = out.len();
            out.resize(offset + categories.len(), 0.0);
            let value = values.get(column).copied().unwrap_or("");
            if let Ok(position) = categories.binary_search_by(|category| category.as_str().cmp(value)) {
                out[offset + position] = 1.0;
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    pub fn fit<const N: usize>(rows: &[[f64; N]]) -> Self {
        if rows.is_empty() {
            return Self {
                means: vec![0.0; N],
                scales: vec![1.0; N],
            };
        }

        let count = rows.len() as f64;
        let mut means = vec![0.0; N];
        for row in rows {
            for (mean, value) in means.iter_mut().zip(row) {
                *mean += value / count;
            }
        }

        let mut scales = vec![0.0; N];
        for row in rows {
            for ((scale, mean), value) in scales.iter_mut().zip(&means).zip(row) {
                *scale += (value - mean).powi(2) / count;
            }
        }
        for scale in &mut scales {
            *scale = scale.sqrt();
            if *scale <= f64::EPSILON {
                *scale = 1.0;
            }
        }

        Self { means, scales }
    }

    pub fn width(&self) -> usize {
        self.means.len()
    }

    pub fn encode_into(&self, values: &[f64], out: &mut Vec<f64>) {
        for (column, (mean, scale)) in self.means.iter().zip(&self.scales).enumerate() {
            let value = values.get(column).copied().unwrap_or(0.0);
            out.push((value - mean) / scale);
        }
    }
}
