use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::error::{EngineError, Result};
use crate::features::{FeatureFrame, FeatureRow};
use crate::model::encoding::{OneHotEncoder, StandardScaler};
use crate::model::forest::{ForestParams, RandomForestRegressor};
use crate::text::{StopWords, TfidfVectorizer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    text: TfidfVectorizer,
    categorical: OneHotEncoder,
    numeric: StandardScaler,
}

impl Preprocessor {
    pub fn fit(rows: &[FeatureRow], max_text_features: usize) -> Result<Self> {
        let texts: Vec<&str> = rows.iter().map(|row| row.combined_text.as_str()).collect();
        let mut text = TfidfVectorizer::new((1, 1), Some(max_text_features), StopWords::English);
        text.fit(&texts)?;

        let categorical_rows: Vec<[&str; 4]> = rows.iter().map(FeatureRow::categorical_values).collect();
        let numeric_rows: Vec<[f64; 1]> = rows.iter().map(FeatureRow::numeric_values).collect();

        Ok(Self {
            text,
            categorical: OneHotEncoder::fit(&categorical_rows),
            numeric: StandardScaler::fit(&numeric_rows),
        })
    }

    pub fn width(&self) -> usize {
        self.text.len() + self.categorical.width() + self.numeric.width()
    }

    pub fn transform(&self, row: &FeatureRow) -> Vec<f64> {
        let mut out = self.text.transform(&row.combined_text);
        out.reserve(self.categorical.width() + self.numeric.width());
        self.categorical.encode_into(&row.categorical_values(), &mut out);
        self.numeric.encode_into(&row.numeric_values(), &mut out);
        out
    }

    pub fn text_vocabulary(&self) -> Vec<&str> {
        self.text.feature_names()
    }

    pub fn categories(&self, column: usize) -> &[String] {
        self.categorical.categories(column)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPipeline {
    preprocessor: Preprocessor,
    regressor: RandomForestRegressor,
}

impl ModelPipeline {
    pub fn fit(frame: &FeatureFrame, config: &ModelConfig) -> Result<Self> {
        let preprocessor = Preprocessor::fit(&frame.rows, config.max_text_features)?;
        let matrix: Vec<Vec<f64>> = frame.rows.iter().map(|row| preprocessor.transform(row)).collect();
        let params = ForestParams {
            n_estimators: config.n_estimators,
            random_seed: config.random_seed,
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            min_samples_leaf: config.min_samples_leaf,
        };
        let regressor = RandomForestRegressor::fit(&matrix, &frame.targets, params);
        Ok(Self {
            preprocessor,
            regressor,
        })
    }

    pub fn predict(&self, row: &FeatureRow) -> Result<f64> {
        let features = self.preprocessor.transform(row);
        if features.len() != self.regressor.n_features() {
            return Err(EngineError::FeatureMismatch(format!(
                "preprocessor produced {} features, regressor expects {}",
                features.len(),
                self.regressor.n_features()
            )));
        }
        Ok(self.regressor.predict(&features).max(0.0))
    }

    pub fn predict_many(&self, rows: &[FeatureRow]) -> Result<Vec<f64>> {
        rows.iter().map(|row| self.predict(row)).collect()
    }

    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    pub fn regressor(&self) -> &RandomForestRegressor {
        &self.regressor
    }
}
