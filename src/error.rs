use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the whole SDK.
/// Every fallible operation returns `SdkResult<T>`.
#[derive(Debug, Error)]
pub enum SdkError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    #[error("request timed out: {url}")]
    Timeout { url: String },

    // ── Integrity ───────────────────────────────────────
    #[error("SHA-1 mismatch for {path:?}: expected {expected}, got {actual}")]
    Sha1Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // ── Version resolution ──────────────────────────────
    #[error("unknown version: {0}")]
    UnknownVersion(String),

    #[error("version manifest unavailable: {0}")]
    Manifest(String),

    // ── Maven ───────────────────────────────────────────
    #[error("invalid Maven coordinate: {0}")]
    InvalidMavenCoordinate(String),

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Archive ─────────────────────────────────────────
    #[error("zip extraction error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // ── Mod loaders ─────────────────────────────────────
    #[error("target version not installed: {0}")]
    TargetMissing(String),

    #[error("installer exited with code {code:?}")]
    InstallerFailed {
        code: Option<i32>,
        output: String,
    },

    #[error("loader API unreachable: {0}")]
    LoaderApi(String),

    // ── Java / launch ───────────────────────────────────
    #[error("Java execution failed: {0}")]
    JavaExecution(String),

    #[error("launch failed: {0}")]
    Launch(String),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type SdkResult<T> = Result<T, SdkError>;

impl From<std::io::Error> for SdkError {
    fn from(source: std::io::Error) -> Self {
        SdkError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl SdkError {
    /// Coarse error category, for callers that dispatch on failure class
    /// rather than on the concrete variant.
    pub fn kind(&self) -> &'static str {
        match self {
            SdkError::Io { .. } => "io",
            SdkError::Http(_) | SdkError::DownloadFailed { .. } | SdkError::Timeout { .. } => {
                "network"
            }
            SdkError::Sha1Mismatch { .. } => "integrity",
            SdkError::UnknownVersion(_) | SdkError::Manifest(_) => "version",
            SdkError::InvalidMavenCoordinate(_) => "maven",
            SdkError::Json(_) => "parsing",
            SdkError::Zip(_) => "archive",
            SdkError::TargetMissing(_)
            | SdkError::InstallerFailed { .. }
            | SdkError::LoaderApi(_) => "loader",
            SdkError::JavaExecution(_) | SdkError::Launch(_) => "launch",
            SdkError::Other(_) => "generic",
        }
    }

    /// Whether retrying the same operation can plausibly succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SdkError::Http(_)
                | SdkError::DownloadFailed { .. }
                | SdkError::Timeout { .. }
                | SdkError::LoaderApi(_)
                | SdkError::Io { .. }
        )
    }
}
