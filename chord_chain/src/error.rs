// Crate-wide error type.
//
// Each stage has its own error enum next to its code; this wraps them so
// the pipeline and the CLI can propagate any failure with `?`.

use crate::corpus::CorpusError;
use crate::midi::RenderError;
use crate::sampler::SampleError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("corpus error: {0}")]
    Corpus(#[from] CorpusError),

    #[error("sampling error: {0}")]
    Sample(#[from] SampleError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

impl Error {
    /// True for sampling failures that mean the learned model is unusable
    /// (empty, inconsistent or malformed) rather than an I/O or input issue.
    pub fn is_model_failure(&self) -> bool {
        matches!(self, Error::Sample(_))
    }
}
