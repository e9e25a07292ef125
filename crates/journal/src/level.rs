use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// A journal level label.
///
/// The common labels are provided as constants, but any label is accepted:
/// hosts may log at `AUDIT` or `NOTICE` without registering anything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Level(Cow<'static, str>);

/// How a level maps onto `tracing` verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub const DEBUG: Level = Level(Cow::Borrowed("DEBUG"));
    pub const INFO: Level = Level(Cow::Borrowed("INFO"));
    pub const SUCCESS: Level = Level(Cow::Borrowed("SUCCESS"));
    pub const WARNING: Level = Level(Cow::Borrowed("WARNING"));
    pub const ERROR: Level = Level(Cow::Borrowed("ERROR"));

    pub fn new(label: impl Into<String>) -> Self {
        Self(Cow::Owned(label.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Best-effort severity, used only for routing to log output.
    pub fn severity(&self) -> Severity {
        let label = self.0.to_ascii_uppercase();
        match label.as_str() {
            "ERROR" | "ERREUR" | "FATAL" | "CRITICAL" => Severity::Error,
            "WARNING" | "WARN" | "AVERTISSEMENT" => Severity::Warn,
            "DEBUG" => Severity::Debug,
            "TRACE" => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::INFO
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Level {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for Level {
    fn from(label: String) -> Self {
        Self::new(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_and_owned_labels_compare_equal() {
        assert_eq!(Level::from("INFO"), Level::INFO);
        assert_eq!(Level::default(), Level::INFO);
        assert_ne!(Level::from("info"), Level::INFO);
    }

    #[test]
    fn unknown_levels_are_accepted() {
        let level = Level::new("AUDIT");
        assert_eq!(level.as_str(), "AUDIT");
        assert_eq!(level.to_string(), "AUDIT");
        assert_eq!(level.severity(), Severity::Info);
    }

    #[test]
    fn severity_mapping() {
        assert_eq!(Level::ERROR.severity(), Severity::Error);
        assert_eq!(Level::from("erreur").severity(), Severity::Error);
        assert_eq!(Level::WARNING.severity(), Severity::Warn);
        assert_eq!(Level::from("AVERTISSEMENT").severity(), Severity::Warn);
        assert_eq!(Level::DEBUG.severity(), Severity::Debug);
        assert_eq!(Level::SUCCESS.severity(), Severity::Info);
    }
}
