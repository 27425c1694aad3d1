#[derive(Debug)]
pub enum FetchError {
    Network(reqwest::Error),
    RateLimited {
        retry_after: Option<std::time::Duration>,
    },
    Status(u16),
    MalformedResponse(String),
}

/// Payload-free mirror of [`FetchError`], kept by the display side.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FetchErrorKind {
    Network,
    RateLimited,
    Status(u16),
    MalformedResponse,
}

impl FetchError {
    #[must_use]
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Network(_) => FetchErrorKind::Network,
            FetchError::RateLimited { .. } => FetchErrorKind::RateLimited,
            FetchError::Status(code) => FetchErrorKind::Status(*code),
            FetchError::MalformedResponse(_) => FetchErrorKind::MalformedResponse,
        }
    }

    #[must_use]
    pub fn retry_after(&self) -> Option<std::time::Duration> {
        match self {
            FetchError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Network(error) => write!(f, "Network error: {error}"),
            FetchError::RateLimited {
                retry_after: Some(delay),
            } => write!(f, "Rate limited, retry after {}s", delay.as_secs()),
            FetchError::RateLimited { retry_after: None } => write!(f, "Rate limited"),
            FetchError::Status(code) => write!(f, "Unexpected HTTP status {code}"),
            FetchError::MalformedResponse(reason) => write!(f, "Malformed response: {reason}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Network(error) => Some(error),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        FetchError::Network(error)
    }
}
