use std::fmt;
use std::io;

use gelfchunk_client::ClientError;
use gelfchunk_frame::FrameError;
use gelfchunk_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Map an I/O error, unwrapping a client error carried through `io::Write`.
pub fn io_error(context: &str, err: io::Error) -> CliError {
    if err
        .get_ref()
        .is_some_and(|inner| inner.is::<ClientError>())
    {
        if let Some(Ok(client)) = err.into_inner().map(|inner| inner.downcast::<ClientError>()) {
            return client_error(context, *client);
        }
        return CliError::new(INTERNAL, format!("{context}: lost client error"));
    }
    let code = match err.kind() {
        io::ErrorKind::InvalidData => DATA_INVALID,
        io::ErrorKind::InvalidInput => USAGE,
        io::ErrorKind::BrokenPipe => INTERNAL,
        _ => FAILURE,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Resolve { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::InvalidCompressionLevel(_) => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        FrameError::MessageTooLarge { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

pub fn client_error(context: &str, err: ClientError) -> CliError {
    match err {
        ClientError::Frame(err) => frame_error(context, err),
        ClientError::Transport { .. } => {
            CliError::new(TRANSPORT_ERROR, format!("{context}: {err}"))
        }
        ClientError::MissingNewline => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}
