use std::fmt::Write;

use roster_core::{
    AppViewModel, IdentityClass, Notice, PeriodOption, ResultView, StagingView, StepIndicator,
    WizardStep,
};

use super::constants::*;

const TAGS_PER_LINE: usize = 6;

/// Full screen for the current view; only the active step's panel is drawn.
pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();
    out.push_str(&step_bar(view));
    out.push('\n');

    match view.step {
        WizardStep::Upload => render_upload(&mut out, view),
        WizardStep::Configure => render_configure(&mut out, view),
        WizardStep::Result => render_result(&mut out, view),
    }

    match &view.notice {
        Some(Notice::Error(text)) => {
            let _ = writeln!(out, "! {text}");
        }
        Some(Notice::Info(text)) => {
            let _ = writeln!(out, "* {text}");
        }
        None => {}
    }
    out
}

pub fn render_periods(options: &[PeriodOption]) -> String {
    let mut out = String::new();
    for chunk in options.chunks(12) {
        let labels: Vec<&str> = chunk.iter().map(|o| o.label.as_str()).collect();
        let _ = writeln!(out, "{}", labels.join("  "));
    }
    out
}

fn step_bar(view: &AppViewModel) -> String {
    let mut bar = String::new();
    for (i, step) in WizardStep::ALL.iter().enumerate() {
        if i > 0 {
            let connector = match view.connectors[i - 1] {
                StepIndicator::Completed => "==",
                StepIndicator::Active | StepIndicator::Pending => "--",
            };
            let _ = write!(bar, " {connector} ");
        }
        let marker = match view.steps[i] {
            StepIndicator::Completed => "[x]",
            StepIndicator::Active => "[>]",
            StepIndicator::Pending => "[ ]",
        };
        let _ = write!(bar, "{marker} {} {}", step.index(), step.title());
    }
    bar
}

fn render_upload(out: &mut String, view: &AppViewModel) {
    match &view.staged_file {
        Some(name) => {
            let _ = write!(out, "File: {name} ({} bytes)", view.staged_bytes);
            if view.preview_pending {
                out.push_str("  previewing...");
            }
            out.push('\n');
        }
        None => out.push_str("File: none (use `open <path>`)\n"),
    }
    if let Some(server_name) = &view.server_filename {
        if view.staged_file.as_deref() != Some(server_name.as_str()) {
            let _ = writeln!(out, "Server name: {server_name}");
        }
    }
    if let Some(sheets) = &view.sheets {
        let show = |name: &Option<String>| name.clone().unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "Sheets: main={} sub={} identity={}",
            show(&sheets.main),
            show(&sheets.sub),
            show(&sheets.identity)
        );
    }
    render_staff(out, &view.staging);
    let _ = writeln!(
        out,
        "Next: {}",
        if view.next_enabled { "available" } else { "blocked" }
    );
}

fn render_staff(out: &mut String, staging: &StagingView) {
    let _ = writeln!(
        out,
        "Staff: {} (公職 {} / 契約 {})",
        staging.total, staging.public_post, staging.contract
    );
    for row in staging.tags.chunks(TAGS_PER_LINE) {
        let tags: Vec<String> = row
            .iter()
            .map(|tag| format!("{}{}", tag_marker(tag.class), tag.name))
            .collect();
        let _ = writeln!(out, "  {}", tags.join(" "));
    }
}

fn tag_marker(class: IdentityClass) -> &'static str {
    match class {
        IdentityClass::PublicPost => TAG_PUBLIC_POST,
        IdentityClass::Contract => TAG_CONTRACT,
        IdentityClass::Unclassified => TAG_UNCLASSIFIED,
    }
}

fn render_configure(out: &mut String, view: &AppViewModel) {
    let _ = writeln!(out, "Target: {}年{}月", view.year, view.month);
    let names: Vec<&str> = view
        .staff_order
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if names.is_empty() {
        out.push_str("Staff order: (generator decides; `autofill` copies the preview)\n");
    } else {
        let _ = writeln!(out, "Staff order ({}):", names.len());
        for (i, name) in names.iter().enumerate() {
            let _ = writeln!(out, "  {:>3}. {name}", i + 1);
        }
    }
    let state = if view.generating {
        "in progress..."
    } else if view.generate_enabled {
        "ready"
    } else {
        "unavailable"
    };
    let _ = writeln!(out, "Generate: {state}");
}

fn render_result(out: &mut String, view: &AppViewModel) {
    match &view.result {
        Some(ResultView::Success { filename, byte_len }) => {
            let _ = writeln!(out, "Roster ready: {filename} ({byte_len} bytes)");
            out.push_str("Type `download` to save it, or `restart` to begin again.\n");
        }
        Some(ResultView::Failure { message }) => {
            let _ = writeln!(out, "Generation failed: {message}");
            out.push_str("Type `back` to change the settings and retry, or `restart` to begin again.\n");
        }
        None => out.push_str("No result.\n"),
    }
}
