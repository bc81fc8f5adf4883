//! Roster engine: HTTP round-trips to the roster backend and download persistence.
mod client;
mod engine;
mod filename;
mod persist;
mod types;

pub use client::{ClientSettings, ReqwestRosterService, RosterService, GENERIC_GENERATE_FAILURE};
pub use engine::{EngineError, EngineHandle};
pub use filename::{
    default_roster_filename, filename_from_disposition, resolve_roster_filename, sanitize_filename,
};
pub use persist::{ensure_output_dir, save_roster, AtomicFileWriter, PersistError};
pub use types::{
    ClientError, EngineEvent, FailureKind, GenerateParams, GeneratedRoster, PreviewReply,
    RequestId, SheetInfo, Upload,
};
