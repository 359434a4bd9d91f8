use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors for the batch filtering workflow.
///
/// Everything per-address (DNS flakiness, probe failures) is downgraded to a
/// classification outcome long before it can reach this type; what remains is
/// unusable input or broken output/checkpoint storage.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("input must contain a '{name}' column")]
    MissingColumn { name: &'static str },
    #[error("could not read input: {source}")]
    Read {
        #[source]
        source: csv::Error,
    },
    #[error("could not write filtered output: {source}")]
    Write {
        #[source]
        source: csv::Error,
    },
    #[error("could not open output file {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("checkpoint store failure: {source}")]
    Checkpoint {
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Resolver(#[from] crate::mx::Error),
}

impl FilterError {
    pub(crate) fn read(source: csv::Error) -> Self {
        Self::Read { source }
    }

    pub(crate) fn write(source: csv::Error) -> Self {
        Self::Write { source }
    }

    pub(crate) fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Output {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn checkpoint(source: std::io::Error) -> Self {
        Self::Checkpoint { source }
    }
}
