//! Error types for asset parsing and loading.

use std::io;

use thiserror::Error;

/// A directive used out of order, with the wrong arguments, or referring to
/// something that does not exist. Always fatal for the asset being parsed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("line {line}: `{directive}` before material declaration")]
    PropertyBeforeMaterial { directive: String, line: u32 },
    #[error("line {line}: unknown material directive `{directive}`")]
    UnknownMaterialDirective { directive: String, line: u32 },
    #[error("line {line}: `{directive}` before object declaration")]
    PropertyBeforeObject { directive: String, line: u32 },
    #[error("line {line}: unknown geometry directive `{directive}`")]
    UnknownGeometryDirective { directive: String, line: u32 },
    #[error("line {line}: unknown material name `{name}`")]
    UnknownMaterialName { name: String, line: u32 },
    #[error("line {line}: face index {index} out of range (table has {len} entries)")]
    FaceIndexOutOfRange { index: u64, len: usize, line: u32 },
    #[error("line {line}: face must have exactly three corners")]
    FaceCornerCount { line: u32 },
    #[error("{line}:{column}: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        line: u32,
        column: u32,
    },
}

/// Failure to produce an asset. Every variant names the file involved.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("malformed asset {path}: {source}")]
    Format {
        path: String,
        #[source]
        source: FormatError,
    },
}

impl AssetError {
    pub fn format(path: &str, source: FormatError) -> Self {
        Self::Format {
            path: path.to_owned(),
            source,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Self::Io { path, .. } | Self::Decode { path, .. } | Self::Format { path, .. } => path,
        }
    }

    /// Whether retrying may succeed, e.g. a file still held open by the
    /// program that is writing it.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Decode { .. })
    }
}

pub type AssetResult<T> = Result<T, AssetError>;
