use thiserror::Error;

/// Failures a command reports back to the invoking user. Anything else is
/// logged and answered with a generic message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("This command only works in a server!")]
    GuildOnly,
    #[error("The intro channel hasn't been set!")]
    IntroChannelUnset,
    #[error("Please give a message ID to delete!")]
    InvalidMessageId,
    #[error("That's not a valid message id!")]
    UnknownMessage,
}
