use derive_more::Display;

/// Failures reported by a frame host while wiring up a session
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum HostError {
    #[display(fmt = "window is not available")]
    WindowUnavailable,
    #[display(fmt = "document is not available")]
    DocumentUnavailable,
    #[display(fmt = "browser API error: {}", _0)]
    BrowserApi(String),
}

impl std::error::Error for HostError {}

/// Simplified error system for the meter
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum MeterError {
    #[display(fmt = "Invalid Config: {}", _0)]
    InvalidConfig(String),
    #[display(fmt = "Host Error: {}", _0)]
    Host(HostError),
}

impl std::error::Error for MeterError {}

impl From<HostError> for MeterError {
    fn from(err: HostError) -> Self {
        MeterError::Host(err)
    }
}

pub type MeterResult<T> = Result<T, MeterError>;
pub type HostResult<T> = Result<T, HostError>;
