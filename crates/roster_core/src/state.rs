use bytes::Bytes;

use crate::view_model::{present_staging, AppViewModel, ResultView};
use crate::wizard::{connector_states, step_indicators, StepGuard};
use crate::{FileStagingStore, StagedFile, TargetPeriod, WizardStep};

/// Identifies one submitted request; only the latest one per kind is honoured.
pub type RequestToken = u64;

/// Result of one generate attempt. Lives only until superseded or restarted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Success { payload: Bytes, filename: String },
    Failure { message: String },
}

/// Everything the generate endpoint needs. The file is resent in full every time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub file: StagedFile,
    pub period: TargetPeriod,
    /// Newline separated names; empty lets the generator choose.
    pub staff_order: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

/// Owned session state for one wizard run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    staging: FileStagingStore,
    step: WizardStep,
    initial_period: TargetPeriod,
    period: TargetPeriod,
    staff_order: String,
    last_token: RequestToken,
    pending_preview: Option<RequestToken>,
    pending_generate: Option<RequestToken>,
    outcome: Option<GenerationOutcome>,
    notice: Option<Notice>,
    dirty: bool,
}

impl AppState {
    /// Starts a session on the upload step with `initial_period` preselected.
    pub fn new(initial_period: TargetPeriod) -> Self {
        Self {
            staging: FileStagingStore::new(),
            step: WizardStep::Upload,
            initial_period,
            period: initial_period,
            staff_order: String::new(),
            last_token: 0,
            pending_preview: None,
            pending_generate: None,
            outcome: None,
            notice: None,
            dirty: false,
        }
    }

    pub fn view(&self) -> AppViewModel {
        let preview = self.staging.preview();
        let result = match (self.step, &self.outcome) {
            (WizardStep::Result, Some(GenerationOutcome::Success { payload, filename })) => {
                Some(ResultView::Success {
                    filename: filename.clone(),
                    byte_len: payload.len(),
                })
            }
            (WizardStep::Result, Some(GenerationOutcome::Failure { message })) => {
                Some(ResultView::Failure {
                    message: message.clone(),
                })
            }
            _ => None,
        };
        AppViewModel {
            step: self.step,
            steps: step_indicators(self.step),
            connectors: connector_states(self.step),
            staged_file: self.staging.staged().map(|f| f.display_name().to_string()),
            staged_bytes: self.staging.staged().map_or(0, StagedFile::len),
            preview_pending: self.pending_preview.is_some(),
            staging: present_staging(preview),
            server_filename: preview.and_then(|p| p.filename.clone()),
            sheets: preview.and_then(|p| p.sheets.clone()),
            year: self.period.year(),
            month: self.period.month(),
            staff_order: self.staff_order.clone(),
            next_enabled: self.step == WizardStep::Upload
                && self.staging.has_usable_preview()
                && self.pending_preview.is_none(),
            generate_enabled: self.step == WizardStep::Configure
                && self.staging.is_staged()
                && self.pending_generate.is_none(),
            generating: self.pending_generate.is_some(),
            result,
            notice: self.notice.clone(),
            dirty: self.dirty,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn staging(&self) -> &FileStagingStore {
        &self.staging
    }

    pub fn period(&self) -> TargetPeriod {
        self.period
    }

    pub fn staff_order(&self) -> &str {
        &self.staff_order
    }

    pub fn outcome(&self) -> Option<&GenerationOutcome> {
        self.outcome.as_ref()
    }

    pub fn pending_preview(&self) -> Option<RequestToken> {
        self.pending_preview
    }

    pub fn pending_generate(&self) -> Option<RequestToken> {
        self.pending_generate
    }

    /// Returns whether a re-render is due and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn guard(&self) -> StepGuard {
        StepGuard {
            staged: self.staging.is_staged(),
            preview_ready: self.staging.has_usable_preview(),
            preview_pending: self.pending_preview.is_some(),
            generating: self.pending_generate.is_some(),
            generation_failed: matches!(self.outcome, Some(GenerationOutcome::Failure { .. })),
        }
    }

    pub(crate) fn set_step(&mut self, step: WizardStep) {
        if self.step != step {
            self.step = step;
            self.dirty = true;
        }
    }

    pub(crate) fn staging_mut(&mut self) -> &mut FileStagingStore {
        &mut self.staging
    }

    pub(crate) fn set_period(&mut self, period: TargetPeriod) {
        if self.period != period {
            self.period = period;
            self.dirty = true;
        }
    }

    pub(crate) fn set_staff_order(&mut self, order: String) {
        if self.staff_order != order {
            self.staff_order = order;
            self.dirty = true;
        }
    }

    pub(crate) fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
        self.dirty = true;
    }

    pub(crate) fn clear_notice(&mut self) {
        if self.notice.take().is_some() {
            self.dirty = true;
        }
    }

    fn next_token(&mut self) -> RequestToken {
        self.last_token += 1;
        self.last_token
    }

    pub(crate) fn begin_preview(&mut self) -> RequestToken {
        let token = self.next_token();
        self.pending_preview = Some(token);
        self.dirty = true;
        token
    }

    /// Takes the pending preview if `token` is the latest one.
    pub(crate) fn finish_preview(&mut self, token: RequestToken) -> bool {
        if self.pending_preview == Some(token) {
            self.pending_preview = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn cancel_preview(&mut self) {
        self.pending_preview = None;
    }

    pub(crate) fn begin_generate(&mut self) -> RequestToken {
        let token = self.next_token();
        self.pending_generate = Some(token);
        self.dirty = true;
        token
    }

    /// Takes the pending generate if `token` is the latest one.
    pub(crate) fn finish_generate(&mut self, token: RequestToken) -> bool {
        if self.pending_generate == Some(token) {
            self.pending_generate = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn set_outcome(&mut self, outcome: GenerationOutcome) {
        // Replacing drops the previous payload.
        self.outcome = Some(outcome);
        self.dirty = true;
    }

    pub(crate) fn clear_outcome(&mut self) {
        if self.outcome.take().is_some() {
            self.dirty = true;
        }
    }

    /// Back to a fresh session. The token counter survives so late responses stay stale.
    pub(crate) fn reset(&mut self) {
        let last_token = self.last_token;
        *self = Self::new(self.initial_period);
        self.last_token = last_token;
        self.dirty = true;
    }
}
