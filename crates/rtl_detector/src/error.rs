use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// DOM hooks the detector writes to.
pub const HOOK_ROOT_ELEMENT: &str = "root element";
pub const HOOK_STYLESHEET_LINK: &str = "stylesheet link";
pub const HOOK_BODY: &str = "body";

/// Error type returned by the detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectionError {
    /// An expected element is absent from the page. Carries the hook name and
    /// a detail such as the element id that was looked up.
    MissingElement(&'static str, String),
    /// The host DOM rejected a call (a thrown JS exception, a poisoned lock).
    Host(String),
    /// The configuration is unusable.
    Config(String),
}

impl Display for DirectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::MissingElement(hook, detail) if detail.is_empty() => write!(f, "missing {hook}"),
            Self::MissingElement(hook, detail) => write!(f, "missing {hook} ({detail})"),
            Self::Host(message) => write!(f, "host DOM error: {message}"),
            Self::Config(message) => write!(f, "invalid configuration: {message}"),
        }
    }
}

impl Error for DirectionError {}
