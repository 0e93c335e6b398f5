use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to spawn process: {}", _0)]
    Spawn(std::io::Error),

    #[error("A process is already running for command `{}`", _0)]
    AlreadyRunning(String),

    #[error("No running process tracked for command `{}`", _0)]
    NotFound(String),

    #[error("No command with ID `{}` exists in the library", _0)]
    CommandNotFound(String),

    #[error("Error {} {} file at `{}`: {}", .action, .file_description, .path, .original)]
    Json {
        action: String,
        file_description: String,
        path: String,
        original: serde_json::Error,
    },

    #[error("No commands were found in the command library. Is `{}` empty?", .path)]
    EmptyCommandLibrary { path: String },

    #[error("IO error with {} file at path `{}`: {}", .file_description, .path, .original)]
    Io {
        file_description: String,
        path: String,
        original: std::io::Error,
    },

    #[error("STDIO error: {}", .0)]
    Stdio(std::io::Error),

    #[error("Found a non-unique command ID: `{}`", .0)]
    NonUniqueCommandId(String),

    #[error("Found a non-unique variable name on command {}: `{}`", .0, .1)]
    NonUniqueVariableName(String, String),

    #[error("Dropdown variable `{}` on command {} has no options", .1, .0)]
    EmptyDropdown(String, String),

    #[error("Invalid parameter `{}`: expected key=value", .0)]
    InvalidParameter(String),

    #[error("Invalid ID: ID may not be empty")]
    EmptyId,

    #[error("Invalid ID `{}`: ID may not contain spaces", .0)]
    IdWithSpace(String),

    #[error("Invalid ID `{}`: ID may not contain a colon (reserved for future use)", .0)]
    IdWithColon(String),

    #[error("Invalid ID `{}`: ID cannot be purely numeric", .0)]
    NumericId(String),
}

impl Error {
    pub fn empty_command_library(path: String) -> Self {
        Self::EmptyCommandLibrary { path }
    }

    pub fn json_error(
        action: String,
        file_description: String,
        path: String,
        original: serde_json::Error,
    ) -> Self {
        Self::Json {
            action,
            file_description,
            path,
            original,
        }
    }

    pub fn io_error(file_description: String, path: String, original: std::io::Error) -> Self {
        Self::Io {
            file_description,
            path,
            original,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(original: std::io::Error) -> Self {
        Self::Stdio(original)
    }
}
