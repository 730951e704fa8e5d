use std::path::PathBuf;

use bucket_contents_core::storage::StorageError;
use bucket_contents_core::ContentsError;
use snafu::Snafu;

pub type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CliError {
    #[snafu(display("Failed to read store snapshot {path:?}"))]
    ReadStore {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Failed to write store snapshot {path:?}"))]
    WriteStore {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Store snapshot {path:?} is not valid"))]
    Snapshot {
        path: PathBuf,
        source: StorageError,
    },

    #[snafu(display("Failed to read input file {path:?}"))]
    ReadInput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("{path:?} is not a valid notebook: {source}"))]
    ParseNotebook {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[snafu(display("{source}"))]
    Contents { source: ContentsError },
}

impl From<ContentsError> for CliError {
    fn from(source: ContentsError) -> Self {
        CliError::Contents { source }
    }
}
