use std::fmt;

use reqwest::StatusCode;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    BadUrl(String),
    NotInRange(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::BadUrl(e) => write!(f, "Server URL error: {}", e),
            ConfigError::NotInRange(e) => write!(f, "Value out of range: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

/// Failures talking to the detection service.
#[derive(Debug)]
pub enum ApiError {
    /// Transport level failure (connect, timeout, body decoding).
    Http(reqwest::Error),
    /// Non-2xx answer without a usable error payload.
    UnexpectedStatus { status: StatusCode, body: String },
    /// The service answered and reported a failure itself.
    Service(String),
    IoError(std::io::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Http(err) => write!(f, "http error: {err}"),
            ApiError::UnexpectedStatus { status, body } => {
                write!(f, "unexpected status {status}: {body}")
            }
            ApiError::Service(message) => write!(f, "{message}"),
            ApiError::IoError(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        ApiError::Http(value)
    }
}

impl From<std::io::Error> for ApiError {
    fn from(value: std::io::Error) -> Self {
        ApiError::IoError(value)
    }
}

#[derive(Debug)]
pub enum PermissionError {
    DeviceUnavailable(String),
    Denied,
}

impl fmt::Display for PermissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionError::DeviceUnavailable(device) => {
                write!(f, "Camera device unavailable: {}", device)
            }
            PermissionError::Denied => write!(f, "Camera access denied"),
        }
    }
}

impl std::error::Error for PermissionError {}

#[derive(Debug)]
pub enum LiveSessionError {
    AlreadyActive,
    NotActive,
    Permission(PermissionError),
    Service(ApiError),
}

impl fmt::Display for LiveSessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiveSessionError::AlreadyActive => write!(f, "Live detection is already active"),
            LiveSessionError::NotActive => write!(f, "Live detection is not active"),
            LiveSessionError::Permission(e) => write!(f, "Permission error: {}", e),
            LiveSessionError::Service(e) => write!(f, "Service error: {}", e),
        }
    }
}

impl std::error::Error for LiveSessionError {}

impl From<PermissionError> for LiveSessionError {
    fn from(err: PermissionError) -> Self {
        LiveSessionError::Permission(err)
    }
}

impl From<ApiError> for LiveSessionError {
    fn from(err: ApiError) -> Self {
        LiveSessionError::Service(err)
    }
}

/// Reasons a candidate file is refused before any upload happens.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    UnsupportedType { name: String, media_type: String },
    TooLarge { size: u64, limit: u64 },
    AnalysisInProgress,
    NoFileSelected,
    Unreadable(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::UnsupportedType { .. } => {
                write!(f, "Please select a valid video file (MP4, AVI, MOV, WMV)")
            }
            ValidationError::TooLarge { limit, .. } => write!(
                f,
                "File size must be less than {}MB",
                limit / (1024 * 1024)
            ),
            ValidationError::AnalysisInProgress => {
                write!(f, "An analysis is already in progress")
            }
            ValidationError::NoFileSelected => write!(f, "No file selected"),
            ValidationError::Unreadable(e) => write!(f, "Unable to read file: {}", e),
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug)]
pub enum UploadError {
    Validation(ValidationError),
    Service(ApiError),
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::Validation(e) => write!(f, "{}", e),
            UploadError::Service(e) => write!(f, "Analysis failed: {}", e),
        }
    }
}

impl std::error::Error for UploadError {}

impl From<ValidationError> for UploadError {
    fn from(err: ValidationError) -> Self {
        UploadError::Validation(err)
    }
}

impl From<ApiError> for UploadError {
    fn from(err: ApiError) -> Self {
        UploadError::Service(err)
    }
}

#[derive(Debug)]
pub enum ExportError {
    NoResults,
    Serialization(serde_json::Error),
    IoError(std::io::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::NoResults => write!(f, "No analysis results to export"),
            ExportError::Serialization(e) => write!(f, "Report serialization failed: {}", e),
            ExportError::IoError(e) => write!(f, "Report write failed: {}", e),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Serialization(err)
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::IoError(err)
    }
}

#[derive(Debug)]
pub enum ControllerError {
    ConfigurationError(ConfigError),
    ServiceError(ApiError),
    LiveSessionError(LiveSessionError),
    UploadError(UploadError),
    ExportError(ExportError),
    InitializationFailed(String),
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::ConfigurationError(e) => write!(f, "Configuration error: {}", e),
            ControllerError::ServiceError(e) => write!(f, "Service error: {}", e),
            ControllerError::LiveSessionError(e) => write!(f, "Live session error: {}", e),
            ControllerError::UploadError(e) => write!(f, "Upload error: {}", e),
            ControllerError::ExportError(e) => write!(f, "Export error: {}", e),
            ControllerError::InitializationFailed(e) => write!(f, "Initialization failed: {}", e),
        }
    }
}

impl std::error::Error for ControllerError {}

impl From<ConfigError> for ControllerError {
    fn from(err: ConfigError) -> Self {
        ControllerError::ConfigurationError(err)
    }
}

impl From<ApiError> for ControllerError {
    fn from(err: ApiError) -> Self {
        ControllerError::ServiceError(err)
    }
}

impl From<LiveSessionError> for ControllerError {
    fn from(err: LiveSessionError) -> Self {
        ControllerError::LiveSessionError(err)
    }
}

impl From<UploadError> for ControllerError {
    fn from(err: UploadError) -> Self {
        ControllerError::UploadError(err)
    }
}

impl From<ExportError> for ControllerError {
    fn from(err: ExportError) -> Self {
        ControllerError::ExportError(err)
    }
}
