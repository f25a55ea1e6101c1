pub mod phrases;
pub mod stopwords;
pub mod tfidf;

pub use phrases::{PhraseExtractor, PhraseScore};
pub use stopwords::StopWords;
pub use tfidf::{tokenize, TfidfVectorizer};
