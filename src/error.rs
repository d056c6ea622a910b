//! Error taxonomy for the dashboard engine.
//!
//! Every error here is recoverable: it is reported through the dashboard's
//! announcement channel and never leaves engine state half-modified.
//! Module failures are not represented here; modules return
//! [`anyhow::Error`] and the render pipeline turns those into inline blocks.

use std::path::PathBuf;

use thiserror::Error;

/// A rejected attribute read or write.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttributeError {
    #[error("Invalid attribute \"{0}\"")]
    Unknown(String),
    #[error("Invalid literal for \"{key}\": {reason}")]
    Malformed { key: String, reason: String },
    #[error("Cannot convert {value} to {expected} for \"{key}\"")]
    Coercion {
        key: String,
        value: String,
        expected: &'static str,
    },
    #[error("Invalid value for \"{key}\": {value}")]
    Rejected { key: String, value: String },
}

/// A rejected layout directive batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Cannot find module \"{0}\"")]
    UnknownModule(String),
    #[error("Module \"{0}\" already set")]
    DuplicateModule(String),
}

impl LayoutError {
    /// Name of the offending module.
    pub fn module(&self) -> &str {
        match self {
            Self::UnknownModule(name) | Self::DuplicateModule(name) => name,
        }
    }
}

/// A destination that could not be opened or written.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Cannot open \"{path}\": {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot write the dashboard to {target}: {source}")]
    Write {
        target: String,
        #[source]
        source: std::io::Error,
    },
}

/// A failed command invocation.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Undefined dashboard command: \"{0}\"")]
    Unknown(String),
    #[error("Wrong argument \"{0}\"")]
    WrongArgument(String),
    #[error("Wrong argument \"{0}\"; expecting \"on\" or \"off\"")]
    ExpectedOnOff(String),
    #[error("Is the target program running?")]
    NotRunning,
    #[error(transparent)]
    Attribute(#[from] AttributeError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Output(#[from] OutputError),
    #[error("{module}: {source:#}")]
    Action {
        module: String,
        #[source]
        source: anyhow::Error,
    },
}

/// A configuration file that could not be read or parsed.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read \"{path}\": {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot parse \"{path}\": {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Cannot walk \"{path}\": {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_error_names_module() {
        let err = LayoutError::UnknownModule("nope".into());
        assert_eq!(err.module(), "nope");
        assert_eq!(err.to_string(), "Cannot find module \"nope\"");
    }

    #[test]
    fn test_command_error_is_transparent() {
        let err = CommandError::from(AttributeError::Unknown("foo".into()));
        assert_eq!(err.to_string(), "Invalid attribute \"foo\"");
    }
}
