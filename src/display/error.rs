#[derive(Debug)]
pub enum RenderError {
    DeviceUnavailable { reason: String },
    Io(std::io::Error),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::DeviceUnavailable { reason } => {
                write!(f, "Display device unavailable: {reason}")
            }
            RenderError::Io(error) => write!(f, "Failed to write to display: {error}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Io(error) => Some(error),
            RenderError::DeviceUnavailable { .. } => None,
        }
    }
}

impl From<std::io::Error> for RenderError {
    fn from(error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::NotConnected => {
                RenderError::DeviceUnavailable {
                    reason: error.to_string(),
                }
            }
            _ => RenderError::Io(error),
        }
    }
}
