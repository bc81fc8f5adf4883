use roster_logging::{roster_debug, roster_info};

use crate::wizard::{transition, StepEvent};
use crate::{
    validate_selection, AppState, Effect, GenerateRequest, GenerationOutcome, Msg, Notice,
    StagedFile, WizardStep,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FileSelected { name, bytes } => {
            if state.step() != WizardStep::Upload {
                return (state, Vec::new());
            }
            if let Err(err) = validate_selection(&name, bytes.len()) {
                roster_info!("Selection rejected: {}", err);
                state.set_notice(Notice::Error(err.to_string()));
                return (state, Vec::new());
            }
            let file = StagedFile::new(name.trim(), bytes);
            roster_info!(
                "Staged {} ({} bytes)",
                file.display_name(),
                file.len()
            );
            state.staging_mut().stage(file.clone());
            state.clear_notice();
            let token = state.begin_preview();
            vec![Effect::RequestPreview { token, file }]
        }
        Msg::FileRejected { reason } => {
            state.set_notice(Notice::Error(reason));
            Vec::new()
        }
        Msg::FileCleared => {
            if state.step() != WizardStep::Upload {
                return (state, Vec::new());
            }
            let had_pending = state.pending_preview().is_some();
            state.cancel_preview();
            if state.staging_mut().clear() || had_pending {
                state.clear_notice();
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::PreviewCompleted { token, result } => {
            if !state.finish_preview(token) {
                roster_debug!("Discarding stale preview response token={}", token);
                return (state, Vec::new());
            }
            match result {
                Ok(report) => {
                    roster_info!(
                        "Preview token={} listed {} staff",
                        token,
                        report.result.len()
                    );
                    state.staging_mut().set_preview(report);
                    state.clear_notice();
                }
                Err(message) => {
                    roster_info!("Preview token={} failed: {}", token, message);
                    state.staging_mut().clear();
                    state.set_notice(Notice::Error(message));
                }
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::NextClicked => {
            let next = transition(state.step(), StepEvent::Advance, state.guard());
            if next != state.step() {
                state.clear_notice();
                state.set_step(next);
            }
            Vec::new()
        }
        Msg::BackClicked => {
            let next = transition(state.step(), StepEvent::Back, state.guard());
            if next != state.step() {
                if state.step() == WizardStep::Result {
                    roster_info!("Returning to configure after a failed generate");
                    state.clear_outcome();
                }
                state.clear_notice();
                state.set_step(next);
            }
            Vec::new()
        }
        Msg::YearChanged(year) => {
            match state.period().with_year(year) {
                Ok(period) => state.set_period(period),
                Err(err) => state.set_notice(Notice::Error(err.to_string())),
            }
            Vec::new()
        }
        Msg::MonthChanged(month) => {
            match state.period().with_month(month) {
                Ok(period) => state.set_period(period),
                Err(err) => state.set_notice(Notice::Error(err.to_string())),
            }
            Vec::new()
        }
        Msg::StaffOrderChanged(order) => {
            state.set_staff_order(order);
            Vec::new()
        }
        Msg::AutoFillOrderClicked => {
            let filled = state
                .staging()
                .preview()
                .map(|report| report.result.staff_list().join("\n"));
            if let Some(order) = filled {
                state.set_staff_order(order);
            }
            Vec::new()
        }
        Msg::GenerateClicked => generate_clicked(&mut state),
        Msg::GenerateCompleted { token, outcome } => {
            if !state.finish_generate(token) {
                roster_debug!("Discarding stale generate response token={}", token);
                return (state, Vec::new());
            }
            match &outcome {
                GenerationOutcome::Success { payload, filename } => {
                    roster_info!(
                        "Generate token={} produced {} ({} bytes)",
                        token,
                        filename,
                        payload.len()
                    );
                }
                GenerationOutcome::Failure { message } => {
                    roster_info!("Generate token={} failed: {}", token, message);
                }
            }
            state.set_outcome(outcome);
            state.clear_notice();
            let next = transition(state.step(), StepEvent::GenerationFinished, state.guard());
            state.set_step(next);
            Vec::new()
        }
        Msg::DownloadClicked => match (state.step(), state.outcome()) {
            (WizardStep::Result, Some(GenerationOutcome::Success { payload, filename })) => {
                vec![Effect::SaveDownload {
                    filename: filename.clone(),
                    payload: payload.clone(),
                }]
            }
            _ => Vec::new(),
        },
        Msg::DownloadSaved { path } => {
            state.set_notice(Notice::Info(format!("Saved to {path}")));
            Vec::new()
        }
        Msg::DownloadFailed { message } => {
            state.set_notice(Notice::Error(message));
            Vec::new()
        }
        Msg::RestartClicked => {
            roster_info!("Restarting session from step {}", state.step().index());
            state.reset();
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}

fn generate_clicked(state: &mut AppState) -> Vec<Effect> {
    if state.pending_generate().is_some() {
        return Vec::new();
    }
    let Some(file) = state.staging().staged().cloned() else {
        // Blocked locally: no network call, back to the upload step.
        let next = transition(state.step(), StepEvent::RequireUpload, state.guard());
        state.set_step(next);
        state.set_notice(Notice::Error(
            "Upload a roster spreadsheet before generating".to_string(),
        ));
        return Vec::new();
    };
    if state.step() != WizardStep::Configure {
        return Vec::new();
    }
    let request = GenerateRequest {
        file,
        period: state.period(),
        staff_order: state.staff_order().to_string(),
    };
    state.clear_notice();
    let token = state.begin_generate();
    roster_info!(
        "Submitting generate token={} period={} bytes={}",
        token,
        request.period,
        request.file.len()
    );
    vec![Effect::RequestGenerate { token, request }]
}
