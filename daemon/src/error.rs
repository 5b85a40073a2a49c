use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Error using focus-last lib: {0}")]
    Lib(#[from] focus_last_core::error::Error),

    #[error("Error initializing logger: {0}")]
    Logger(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("Error connecting to the X server: {0}")]
    Connect(#[from] x11rb::errors::ConnectError),

    #[error("X connection error: {0}")]
    Connection(#[from] x11rb::errors::ConnectionError),

    #[error("X request failed: {0}")]
    Reply(#[from] x11rb::errors::ReplyError),
}
