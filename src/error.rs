use crate::remote::Command;

/// Failure of a single remote call. The sync layer treats every variant as transient.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("{command} failed: {message}")]
    Call { command: Command, message: String },

    #[error("{command} returned an unexpected payload: {source}")]
    Decode {
        command: Command,
        #[source]
        source: serde_json::Error,
    },

    #[error("{command} is not available")]
    Unavailable { command: Command },
}

impl RemoteError {
    pub fn command(&self) -> Command {
        match self {
            RemoteError::Call { command, .. }
            | RemoteError::Decode { command, .. }
            | RemoteError::Unavailable { command } => *command,
        }
    }
}

/// The orientation points outside the catalogue snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("system index {index} is out of range for {len} systems")]
    SystemOutOfRange { index: usize, len: usize },

    #[error("game index {index} is out of range for {len} games in system {system}")]
    GameOutOfRange {
        system: usize,
        index: usize,
        len: usize,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not find the user's data directory")]
    NoDataDir,

    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
