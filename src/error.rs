use thiserror::Error;

pub type VoiceResult<T> = Result<T, VoiceError>;

/// Maximum number of characters of raw extractor stdout carried inside an
/// [`VoiceError::ExtractorOutput`] for diagnosis. Anything longer is cut so a
/// runaway engine cannot bloat error messages or logs.
const STDOUT_SNIPPET_MAX_CHARS: usize = 400;

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("json failure: {0}")]
    Json(#[from] serde_json::Error),

    /// Extractor binary absent from PATH (or the configured override does not
    /// resolve). Process-level failure: the engine was never started.
    #[error("extractor binary `{command}` not found on PATH")]
    ExtractorMissing { command: String },

    /// Extractor process spawned but exited non-zero.
    #[error("extractor process failed: `{command}` (status: {status}){stderr_suffix}")]
    ExtractorFailed {
        command: String,
        status: i32,
        stderr_suffix: String,
    },

    /// Extractor process exceeded its hard deadline and was killed.
    #[error("extractor timed out after {timeout_ms}ms: `{command}`{stderr_suffix}")]
    ExtractorTimedOut {
        command: String,
        timeout_ms: u64,
        stderr_suffix: String,
    },

    /// Extractor exited cleanly but its stdout is unusable: not JSON at all,
    /// or a well-formed `success: false` envelope from the engine.
    #[error("extractor output rejected: {detail}{stdout_suffix}")]
    ExtractorOutput {
        detail: String,
        stdout_suffix: String,
    },

    /// Extractor JSON parsed but a field is missing, non-finite, or outside
    /// its physically plausible bounds.
    #[error("extractor result failed validation: {detail}")]
    ExtractorValidation { detail: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("no {what} found for `{id}`")]
    NotFound { what: String, id: String },
}

impl VoiceError {
    #[must_use]
    pub fn from_extractor_failure(command: String, status: i32, stderr: String) -> Self {
        Self::ExtractorFailed {
            command,
            status,
            stderr_suffix: stderr_suffix(&stderr),
        }
    }

    #[must_use]
    pub fn from_extractor_timeout(command: String, timeout_ms: u64, stderr: String) -> Self {
        Self::ExtractorTimedOut {
            command,
            timeout_ms,
            stderr_suffix: stderr_suffix(&stderr),
        }
    }

    /// Build an [`VoiceError::ExtractorOutput`] carrying a bounded snippet of
    /// the raw stdout so failures stay diagnosable from the error alone.
    #[must_use]
    pub fn from_extractor_output(detail: impl Into<String>, raw_stdout: &str) -> Self {
        let trimmed = raw_stdout.trim();
        let stdout_suffix = if trimmed.is_empty() {
            String::new()
        } else {
            let snippet: String = trimmed.chars().take(STDOUT_SNIPPET_MAX_CHARS).collect();
            if trimmed.chars().count() > STDOUT_SNIPPET_MAX_CHARS {
                format!("; stdout: {snippet}…")
            } else {
                format!("; stdout: {snippet}")
            }
        };
        Self::ExtractorOutput {
            detail: detail.into(),
            stdout_suffix,
        }
    }

    #[must_use]
    pub fn validation(detail: impl Into<String>) -> Self {
        Self::ExtractorValidation {
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn not_found(what: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            what: what.into(),
            id: id.into(),
        }
    }

    /// Stable, unique, machine-readable error code for every variant. The
    /// `VP-PROC-*` family covers all process-level extractor failures (missing
    /// binary, non-zero exit, timeout).
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "VP-IO",
            Self::Json(_) => "VP-JSON",
            Self::ExtractorMissing { .. } => "VP-PROC-MISSING",
            Self::ExtractorFailed { .. } => "VP-PROC-EXIT",
            Self::ExtractorTimedOut { .. } => "VP-PROC-TIMEOUT",
            Self::ExtractorOutput { .. } => "VP-OUTPUT",
            Self::ExtractorValidation { .. } => "VP-VALIDATE",
            Self::InvalidRequest(_) => "VP-REQUEST",
            Self::Storage(_) => "VP-STORAGE",
            Self::NotFound { .. } => "VP-NOT-FOUND",
        }
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("; stderr: {trimmed}")
    }
}
