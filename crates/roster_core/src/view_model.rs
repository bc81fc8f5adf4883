use crate::{IdentityClass, Notice, PreviewReport, SheetNames, StepIndicator, WizardStep};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffTag {
    pub name: String,
    pub class: IdentityClass,
}

/// Rendered form of the staged preview: one tag per person plus counts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StagingView {
    pub tags: Vec<StaffTag>,
    pub total: usize,
    pub public_post: usize,
    pub contract: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultView {
    Success { filename: String, byte_len: usize },
    Failure { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub step: WizardStep,
    pub steps: [StepIndicator; 3],
    pub connectors: [StepIndicator; 2],
    pub staged_file: Option<String>,
    pub staged_bytes: usize,
    pub preview_pending: bool,
    pub staging: StagingView,
    pub server_filename: Option<String>,
    pub sheets: Option<SheetNames>,
    pub year: i32,
    pub month: u32,
    pub staff_order: String,
    pub next_enabled: bool,
    pub generate_enabled: bool,
    pub generating: bool,
    pub result: Option<ResultView>,
    pub notice: Option<Notice>,
    pub dirty: bool,
}

/// Tags follow the preview's staff order; no preview renders as empty with zero counts.
pub fn present_staging(preview: Option<&PreviewReport>) -> StagingView {
    let Some(report) = preview else {
        return StagingView::default();
    };
    let tags: Vec<StaffTag> = report
        .result
        .staff_list()
        .iter()
        .map(|name| StaffTag {
            name: name.clone(),
            class: report.result.classify(name),
        })
        .collect();
    let count = |class: IdentityClass| tags.iter().filter(|tag| tag.class == class).count();
    StagingView {
        public_post: count(IdentityClass::PublicPost),
        contract: count(IdentityClass::Contract),
        total: report.staff_count,
        tags,
    }
}
