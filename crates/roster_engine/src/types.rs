use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;

pub type RequestId = u64;

/// A spreadsheet to send, exactly as the user staged it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateParams {
    pub upload: Upload,
    pub year: i32,
    pub month: u32,
    /// Newline separated names, possibly empty.
    pub staff_order: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SheetInfo {
    pub main: Option<String>,
    pub sub: Option<String>,
    pub identity: Option<String>,
}

/// Decoded `success=true` answer of the preview endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreviewReply {
    pub filename: Option<String>,
    pub staff_count: usize,
    pub staff_list: Vec<String>,
    /// Name -> identity label as sent by the server.
    pub identity_map: HashMap<String, String>,
    pub sheets: Option<SheetInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedRoster {
    pub filename: String,
    pub payload: Bytes,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    PreviewCompleted {
        request_id: RequestId,
        result: Result<PreviewReply, ClientError>,
    },
    GenerateCompleted {
        request_id: RequestId,
        result: Result<GeneratedRoster, ClientError>,
    },
}

/// Failure of one round-trip. `message` is what the user gets to see.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ClientError {
    pub kind: FailureKind,
    pub message: String,
}

impl ClientError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    /// The server understood the request and said no.
    Rejected,
    HttpStatus(u16),
    Timeout,
    Network,
    MalformedResponse,
    TooLarge { max_bytes: u64, actual: Option<u64> },
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Rejected => write!(f, "rejected by server"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::MalformedResponse => write!(f, "malformed response"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
        }
    }
}
