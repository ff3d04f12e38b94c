pub mod classifier;
pub mod inference;
#[cfg(feature = "ml")]
pub mod ml_model;

pub use classifier::{Classifier, LinearClassifier, LinearModelFile};
pub use inference::{load_classifier, BoxedClassifier};
#[cfg(feature = "ml")]
pub use inference::InferenceEngine;
#[cfg(feature = "ml")]
pub use ml_model::{HeartDiseaseMlp, ModelConfig, NUM_CLASSES};
