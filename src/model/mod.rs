pub mod artifact;
pub mod encoding;
pub mod forest;
pub mod pipeline;
pub mod training;

pub use artifact::{load_artifact, save_artifact, ModelArtifact, ARTIFACT_FORMAT_VERSION};
pub use encoding::{OneHotEncoder, StandardScaler};
pub use forest::{ForestParams, RandomForestRegressor, RegressionTree};
pub use pipeline::{ModelPipeline, Preprocessor};
pub use training::{
    fit_and_save, holdout_split, r2_score, rmse, train, HoldoutMetrics, TrainOutcome, TrainingSummary,
};
