use thiserror::Error;

/// Result type alias for blockhole operations
pub type Result<T> = std::result::Result<T, BlockholeError>;

/// Errors that can occur while fetching, merging or pushing blocklists
#[derive(Error, Debug)]
pub enum BlockholeError {
    /// Severity string is not one of `noop`, `silence`, `suspend`
    #[error("invalid severity value '{0}'")]
    InvalidSeverity(String),

    /// Boolean field value could not be understood
    #[error("cannot parse value '{0}' as boolean")]
    BooleanParse(String),

    /// A block record in a source payload is malformed
    #[error("malformed blocklist record: {0}")]
    Parse(String),

    /// Mergeplan is not `max` or `min`
    #[error("mergeplan '{0}' not implemented")]
    UnsupportedMergePlan(String),

    /// Threshold type is not `count` or `pct`
    #[error("threshold type '{0}' not implemented")]
    UnsupportedThresholdType(String),

    /// List format has no registered parser
    #[error("unknown blocklist format '{0}'")]
    UnsupportedFormat(String),

    /// Field name is not a domain block attribute
    #[error("unknown block field '{0}'")]
    UnknownField(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Authentication failed - invalid or missing token
    #[error("authentication failed: {0}")]
    Unauthorized(String),

    /// Resource not found
    #[error("resource not found: {resource}")]
    NotFound {
        /// Description of the resource that wasn't found
        resource: String,
    },

    /// Instance API returned an error response
    #[error("API error ({code}): {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Error message from the API
        message: String,
    },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV reading/writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure while handling a blocklist source
    #[error("source {origin}: {source}")]
    Source {
        /// Source URL or instance
        origin: String,
        /// Underlying error
        #[source]
        source: Box<BlockholeError>,
    },

    /// Failure while pushing to a destination instance
    #[error("destination {host}: {source}")]
    Destination {
        /// Destination host
        host: String,
        /// Underlying error
        #[source]
        source: Box<BlockholeError>,
    },
}

impl BlockholeError {
    /// Wrap this error with the identity of the source it came from
    #[must_use]
    pub fn for_source(self, origin: impl Into<String>) -> Self {
        Self::Source {
            origin: origin.into(),
            source: Box::new(self),
        }
    }

    /// Wrap this error with the identity of the destination it came from
    #[must_use]
    pub fn for_destination(self, host: impl Into<String>) -> Self {
        Self::Destination {
            host: host.into(),
            source: Box::new(self),
        }
    }

    /// Returns true if the error comes from bad configuration rather than bad data
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        match self {
            Self::UnsupportedMergePlan(_)
            | Self::UnsupportedThresholdType(_)
            | Self::UnsupportedFormat(_)
            | Self::UnknownField(_)
            | Self::Config(_) => true,
            Self::Source { source, .. } | Self::Destination { source, .. } => {
                source.is_config_error()
            }
            _ => false,
        }
    }

    /// Returns true if the error comes from an unparseable source payload
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        match self {
            Self::InvalidSeverity(_)
            | Self::BooleanParse(_)
            | Self::Parse(_)
            | Self::Json(_)
            | Self::Csv(_) => true,
            Self::Source { source, .. } | Self::Destination { source, .. } => {
                source.is_parse_error()
            }
            _ => false,
        }
    }

    /// Returns the HTTP status code if this is an API error
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(401),
            Self::NotFound { .. } => Some(404),
            Self::Api { code, .. } => Some(*code),
            Self::Source { source, .. } | Self::Destination { source, .. } => {
                source.status_code()
            }
            _ => None,
        }
    }
}
