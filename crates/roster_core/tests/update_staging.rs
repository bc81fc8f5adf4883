use std::sync::Once;

use bytes::Bytes;
use roster_core::{
    update, AppState, Effect, IdentityClass, Msg, Notice, PreviewReport, PreviewResult,
    RequestToken, TargetPeriod, WizardStep,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(roster_logging::initialize_for_tests);
}

fn new_state() -> AppState {
    AppState::new(TargetPeriod::new(2025, 1).unwrap())
}

fn select(state: AppState, name: &str, bytes: &'static [u8]) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::FileSelected {
            name: name.to_string(),
            bytes: Bytes::from_static(bytes),
        },
    )
}

fn preview_token(effects: &[Effect]) -> RequestToken {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::RequestPreview { token, .. } => Some(*token),
            _ => None,
        })
        .expect("preview effect")
}

fn report(names: &[&str]) -> PreviewReport {
    PreviewReport {
        filename: Some("roster.xlsx".to_string()),
        staff_count: names.len(),
        result: PreviewResult::new(
            names.iter().map(|n| n.to_string()),
            names
                .iter()
                .map(|n| (n.to_string(), IdentityClass::PublicPost)),
        ),
        sheets: None,
    }
}

#[test]
fn selecting_a_file_stages_it_and_requests_preview() {
    init_logging();
    let (mut state, effects) = select(new_state(), "roster.xlsx", b"PK\x03\x04data");

    assert_eq!(effects.len(), 1);
    match &effects[0] {
        Effect::RequestPreview { file, .. } => {
            assert_eq!(file.display_name(), "roster.xlsx");
            assert_eq!(file.bytes().as_ref(), b"PK\x03\x04data");
        }
        other => panic!("unexpected effect {other:?}"),
    }
    let view = state.view();
    assert_eq!(view.staged_file.as_deref(), Some("roster.xlsx"));
    assert!(view.preview_pending);
    assert!(!view.next_enabled);
    assert!(state.consume_dirty());
}

#[test]
fn successful_preview_fills_staging_view() {
    init_logging();
    let (state, effects) = select(new_state(), "roster.xlsx", b"data");
    let token = preview_token(&effects);
    let (state, effects) = update(
        state,
        Msg::PreviewCompleted {
            token,
            result: Ok(report(&["王小明", "李小華"])),
        },
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert!(!view.preview_pending);
    assert!(view.next_enabled);
    assert_eq!(view.staging.total, 2);
    assert_eq!(view.staging.tags[0].name, "王小明");
    assert_eq!(view.server_filename.as_deref(), Some("roster.xlsx"));
}

#[test]
fn second_selection_supersedes_first_preview() {
    init_logging();
    let (state, first) = select(new_state(), "first.xlsx", b"one");
    let first_token = preview_token(&first);
    let (state, second) = select(state, "second.xlsx", b"two");
    let second_token = preview_token(&second);
    assert!(second_token > first_token);

    // The late answer for the first file must not be applied.
    let (mut state, _) = update(
        state,
        Msg::PreviewCompleted {
            token: first_token,
            result: Ok(report(&["舊名單"])),
        },
    );
    assert!(!state.consume_dirty());
    assert!(state.staging().preview().is_none());
    assert!(state.view().preview_pending);

    let (state, _) = update(
        state,
        Msg::PreviewCompleted {
            token: second_token,
            result: Ok(report(&["新名單"])),
        },
    );
    let view = state.view();
    assert_eq!(view.staged_file.as_deref(), Some("second.xlsx"));
    assert_eq!(view.staging.tags[0].name, "新名單");
}

#[test]
fn staging_again_invalidates_existing_preview() {
    init_logging();
    let (state, effects) = select(new_state(), "first.xlsx", b"one");
    let (state, _) = update(
        state,
        Msg::PreviewCompleted {
            token: preview_token(&effects),
            result: Ok(report(&["甲"])),
        },
    );
    assert!(state.view().next_enabled);

    let (state, _) = select(state, "second.xlsx", b"two");
    assert!(state.staging().preview().is_none());
    assert_eq!(state.view().staging.total, 0);
    assert!(!state.view().next_enabled);
}

#[test]
fn failed_preview_releases_the_file() {
    init_logging();
    let (state, effects) = select(new_state(), "roster.xlsx", b"data");
    let (state, _) = update(
        state,
        Msg::PreviewCompleted {
            token: preview_token(&effects),
            result: Err("檔案處理錯誤: bad sheet".to_string()),
        },
    );

    assert!(!state.staging().is_staged());
    let view = state.view();
    assert_eq!(view.staged_file, None);
    assert_eq!(
        view.notice,
        Some(Notice::Error("檔案處理錯誤: bad sheet".to_string()))
    );
}

#[test]
fn invalid_selection_keeps_current_staging() {
    init_logging();
    let (state, effects) = select(new_state(), "roster.xlsx", b"data");
    let before = state.staging().clone();

    let (state, rejected) = select(state, "notes.txt", b"text");
    assert!(rejected.is_empty());
    assert_eq!(state.staging(), &before);
    assert!(matches!(state.view().notice, Some(Notice::Error(_))));
    assert_eq!(state.pending_preview(), Some(preview_token(&effects)));

    let (state, rejected) = select(state, "empty.xlsx", b"");
    assert!(rejected.is_empty());
    assert_eq!(state.staging(), &before);
}

#[test]
fn clearing_drops_file_and_ignores_inflight_preview() {
    init_logging();
    let (state, effects) = select(new_state(), "roster.xlsx", b"data");
    let (state, _) = update(state, Msg::FileCleared);
    assert!(!state.staging().is_staged());
    assert!(!state.view().preview_pending);

    let (state, _) = update(
        state,
        Msg::PreviewCompleted {
            token: preview_token(&effects),
            result: Ok(report(&["甲"])),
        },
    );
    assert!(state.staging().preview().is_none());
    assert!(!state.staging().is_staged());
}

#[test]
fn clearing_twice_is_a_noop() {
    init_logging();
    let (state, _) = select(new_state(), "roster.xlsx", b"data");
    let (mut state, _) = update(state, Msg::FileCleared);
    state.consume_dirty();

    let snapshot = state.clone();
    let (mut again, effects) = update(state, Msg::FileCleared);
    assert!(effects.is_empty());
    assert!(!again.consume_dirty());
    assert_eq!(again, snapshot);
}

#[test]
fn file_selection_is_ignored_outside_upload_step() {
    init_logging();
    let (state, effects) = select(new_state(), "roster.xlsx", b"data");
    let (state, _) = update(
        state,
        Msg::PreviewCompleted {
            token: preview_token(&effects),
            result: Ok(report(&["甲"])),
        },
    );
    let (state, _) = update(state, Msg::NextClicked);
    assert_eq!(state.step(), WizardStep::Configure);

    let (state, effects) = select(state, "other.xlsx", b"other");
    assert!(effects.is_empty());
    assert_eq!(
        state.staging().staged().unwrap().display_name(),
        "roster.xlsx"
    );
}
