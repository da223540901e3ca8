//! Request payloads held in memory or on disk.

use bytes::Bytes;
use camino::Utf8PathBuf;
use thiserror::Error;
use tokio_util::io::ReaderStream;

/// Raised when a file-backed payload cannot be measured or read.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("failed to read upload body from {path}: {message}")]
pub struct BodyError {
    /// File that failed.
    pub path: Utf8PathBuf,
    /// Underlying I/O failure.
    pub message: String,
}

impl BodyError {
    fn io(path: &Utf8PathBuf, err: &std::io::Error) -> Self {
        Self {
            path: path.clone(),
            message: err.to_string(),
        }
    }
}

/// Payload for `PUT` and `POST` requests.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TransferBody {
    /// Bytes already in memory.
    Bytes(Bytes),
    /// Contents of a local file.
    File(Utf8PathBuf),
}

impl TransferBody {
    /// Size of the payload in bytes.
    ///
    /// Files report their metadata size, so the file is not read.
    ///
    /// # Errors
    ///
    /// Returns [`BodyError`] when file metadata is unavailable.
    pub async fn content_length(&self) -> Result<u64, BodyError> {
        match self {
            Self::Bytes(bytes) => Ok(u64::try_from(bytes.len()).unwrap_or(u64::MAX)),
            Self::File(path) => tokio::fs::metadata(path)
                .await
                .map(|metadata| metadata.len())
                .map_err(|err| BodyError::io(path, &err)),
        }
    }

    /// Opens the payload as a request body. Files are opened here and
    /// streamed from disk, never buffered whole.
    ///
    /// # Errors
    ///
    /// Returns [`BodyError`] when the file cannot be opened.
    pub async fn request_body(&self) -> Result<reqwest::Body, BodyError> {
        match self {
            Self::Bytes(bytes) => Ok(reqwest::Body::from(bytes.clone())),
            Self::File(path) => tokio::fs::File::open(path)
                .await
                .map(|file| reqwest::Body::wrap_stream(ReaderStream::new(file)))
                .map_err(|err| BodyError::io(path, &err)),
        }
    }

    /// Loads the whole payload into memory.
    ///
    /// # Errors
    ///
    /// Returns [`BodyError`] when the file cannot be read.
    pub async fn read(&self) -> Result<Bytes, BodyError> {
        match self {
            Self::Bytes(bytes) => Ok(bytes.clone()),
            Self::File(path) => tokio::fs::read(path)
                .await
                .map(Bytes::from)
                .map_err(|err| BodyError::io(path, &err)),
        }
    }
}

impl From<Bytes> for TransferBody {
    fn from(value: Bytes) -> Self {
        Self::Bytes(value)
    }
}

impl From<Vec<u8>> for TransferBody {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(value))
    }
}

impl From<&'static str> for TransferBody {
    fn from(value: &'static str) -> Self {
        Self::Bytes(Bytes::from_static(value.as_bytes()))
    }
}

impl From<Utf8PathBuf> for TransferBody {
    fn from(value: Utf8PathBuf) -> Self {
        Self::File(value)
    }
}
