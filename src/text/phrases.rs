use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::text::{StopWords, TfidfVectorizer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseScore {
    pub phrase: String,
    pub weight: f64,
}

#[derive(Debug, Clone)]
pub struct PhraseExtractor {
    pub top_n: usize,
    pub ngram_range: (usize, usize),
    pub max_features: Option<usize>,
    pub stop_words: StopWords,
}

impl Default for PhraseExtractor {
    fn default() -> Self {
        Self {
            top_n: 5,
            ngram_range: (1, 3),
            max_features: Some(100),
            stop_words: StopWords::English,
        }
    }
}

impl PhraseExtractor {
    pub fn new(stop_words: StopWords) -> Self {
        Self {
            stop_words,
            ..Self::default()
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn extract(&self, documents: &[Option<&str>]) -> Vec<PhraseScore> {
        let corpus: Vec<&str> = documents.iter().flatten().copied().collect();
        if corpus.is_empty() {
            return Vec::new();
        }

        let mut vectorizer = TfidfVectorizer::new(self.ngram_range, self.max_features, self.stop_words.clone());
        let matrix = match vectorizer.fit_transform(&corpus) {
            Ok(matrix) => matrix,
            Err(err) => {
                warn!(documents = corpus.len(), error = %err, "Phrase extraction skipped");
                return Vec::new();
            }
        };

        let mut sums = vec![0.0; vectorizer.len()];
        for row in &matrix {
            for (sum, weight) in sums.iter_mut().zip(row) {
                *sum += weight;
            }
        }

        let mut ranked: Vec<PhraseScore> = vectorizer
            .feature_names()
            .into_iter()
            .zip(sums)
            .map(|(phrase, weight)| PhraseScore {
                phrase: phrase.to_string(),
                weight,
            })
            .collect();
        ranked.sort_by(|a, b| b.weight.total_cmp(&a.weight).then_with(|| a.phrase.cmp(&b.phrase)));
        ranked.truncate(self.top_n);

        debug!(documents = corpus.len(), phrases = ranked.len(), "Extracted phrases");
        ranked
    }
}
