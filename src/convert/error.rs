//! Conversion errors and their process exit codes.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::util::Error;

/// Part of the AGX stream being enumerated when a read failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamScope {
    Constants,
    TimeSteps,
}

impl fmt::Display for StreamScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constants => f.write_str("constant parameters"),
            Self::TimeSteps => f.write_str("time steps"),
        }
    }
}

/// A failed conversion. Every variant aborts the run.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The AGX input could not be opened
    #[error("Failed to open AGX file {}: {source}", path.display())]
    SourceOpen { path: PathBuf, source: Error },

    /// The AGX header is missing or malformed
    #[error("Failed to read AGX header: {0}")]
    HeaderRead(#[source] Error),

    /// The output stage could not be created
    #[error("Failed to create USD stage {}: {source}", path.display())]
    DocumentCreate { path: PathBuf, source: Error },

    /// A parameter or time step could not be read
    #[error("Failed to read {scope}: {source}")]
    StreamRead { scope: StreamScope, source: Error },

    /// The stage rejected an edit
    #[error("Failed to author stage: {0}")]
    Author(#[source] Error),

    /// The stage could not be written
    #[error("Failed to save USD file {}: {source}", path.display())]
    Save { path: PathBuf, source: Error },
}

impl ConvertError {
    /// Exit code of the command line tool for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SourceOpen { .. } => 2,
            _ => 3,
        }
    }

    pub(crate) fn stream(scope: StreamScope) -> impl FnOnce(Error) -> Self {
        move |source| Self::StreamRead { scope, source }
    }
}
