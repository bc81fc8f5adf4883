/// The three wizard steps, in order. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum WizardStep {
    #[default]
    Upload = 1,
    Configure = 2,
    Result = 3,
}

impl WizardStep {
    pub const ALL: [WizardStep; 3] = [WizardStep::Upload, WizardStep::Configure, WizardStep::Result];

    /// 1-based position of the step.
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Upload => "Upload",
            WizardStep::Configure => "Configure",
            WizardStep::Result => "Result",
        }
    }
}

/// Visual state of a step marker or of the connector between two markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepIndicator {
    Completed,
    Active,
    Pending,
}

/// Marker state for every step, as a function of the active step only.
pub fn step_indicators(active: WizardStep) -> [StepIndicator; 3] {
    WizardStep::ALL.map(|step| match step.cmp(&active) {
        std::cmp::Ordering::Less => StepIndicator::Completed,
        std::cmp::Ordering::Equal => StepIndicator::Active,
        std::cmp::Ordering::Greater => StepIndicator::Pending,
    })
}

/// Connector `i` joins step `i + 1` and step `i + 2`; it is completed once its right-hand step is reached.
pub fn connector_states(active: WizardStep) -> [StepIndicator; 2] {
    [WizardStep::Configure, WizardStep::Result].map(|right| {
        if active >= right {
            StepIndicator::Completed
        } else {
            StepIndicator::Pending
        }
    })
}

/// Events that may move the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    /// Upload -> Configure.
    Advance,
    /// Configure -> Upload, refused while a generate is in flight so its
    /// result cannot land on a step that no longer shows it.
    /// Result -> Configure only after a failed attempt, to retry with the same file.
    Back,
    /// Configure -> Result, after a generate attempt finished either way.
    GenerationFinished,
    /// Configure -> Upload when a local precondition failed (no staged file).
    RequireUpload,
    /// Any step -> Upload.
    Restart,
}

/// Facts about the session the transition rules depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepGuard {
    pub staged: bool,
    pub preview_ready: bool,
    pub preview_pending: bool,
    pub generating: bool,
    /// The last generate attempt ended in `GenerationOutcome::Failure`.
    pub generation_failed: bool,
}

/// Pure step transition. Disallowed moves return the current step unchanged.
pub fn transition(current: WizardStep, event: StepEvent, guard: StepGuard) -> WizardStep {
    match (current, event) {
        (_, StepEvent::Restart) => WizardStep::Upload,
        (WizardStep::Upload, StepEvent::Advance)
            if guard.staged && guard.preview_ready && !guard.preview_pending =>
        {
            WizardStep::Configure
        }
        (WizardStep::Configure, StepEvent::Back) if !guard.generating => WizardStep::Upload,
        (WizardStep::Result, StepEvent::Back) if guard.generation_failed => WizardStep::Configure,
        (WizardStep::Configure, StepEvent::RequireUpload) => WizardStep::Upload,
        (WizardStep::Configure, StepEvent::GenerationFinished) => WizardStep::Result,
        (step, _) => step,
    }
}
