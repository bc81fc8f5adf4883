//! Roster core: pure wizard state machine, staging store and view-model helpers.
mod effect;
mod msg;
mod period;
mod staging;
mod state;
mod update;
mod view_model;
mod wizard;

pub use effect::Effect;
pub use msg::Msg;
pub use period::{period_options, PeriodError, PeriodOption, TargetPeriod};
pub use staging::{
    validate_selection, FileStagingStore, IdentityClass, PreviewReport, PreviewResult,
    SelectionError, SheetNames, StagedFile, ALLOWED_EXTENSIONS, MAX_UPLOAD_BYTES,
};
pub use state::{AppState, GenerateRequest, GenerationOutcome, Notice, RequestToken};
pub use update::update;
pub use view_model::{present_staging, AppViewModel, ResultView, StaffTag, StagingView};
pub use wizard::{
    connector_states, step_indicators, transition, StepEvent, StepGuard, StepIndicator, WizardStep,
};
