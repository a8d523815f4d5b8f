//! Command-line usage errors

use thiserror::Error;

/// Problems with the arguments themselves, reported before any config or
/// network work.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("missing command")]
    MissingCommand,

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("{command}: missing argument <{name}>")]
    MissingArgument {
        command: &'static str,
        name: &'static str,
    },

    #[error("{command}: unexpected argument {arg}")]
    UnexpectedArgument { command: &'static str, arg: String },

    #[error("invalid {name}: {value}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("--config requires a path")]
    MissingConfigPath,
}

/// Result alias using the CLI usage Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages_are_descriptive() {
        assert_eq!(
            Error::MissingArgument {
                command: "exchange",
                name: "verifier"
            }
            .to_string(),
            "exchange: missing argument <verifier>"
        );
        assert_eq!(
            Error::InvalidNumber {
                name: "shop_id",
                value: "abc".into()
            }
            .to_string(),
            "invalid shop_id: abc"
        );
        assert_eq!(
            Error::UnknownCommand("frobnicate".into()).to_string(),
            "unknown command: frobnicate"
        );
    }
}
