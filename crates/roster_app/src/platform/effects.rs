use std::path::PathBuf;

use roster_core::{
    Effect, GenerateRequest, GenerationOutcome, IdentityClass, Msg, PreviewReport, PreviewResult,
    SheetNames, StagedFile,
};
use roster_engine::{
    save_roster, EngineEvent, EngineHandle, GenerateParams, GeneratedRoster, PreviewReply, Upload,
};
use roster_logging::{roster_error, roster_info, roster_warn};

/// Executes effects: network round-trips go to the engine, downloads are written here.
pub struct EffectRunner {
    engine: EngineHandle,
    output_dir: PathBuf,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, output_dir: PathBuf) -> Self {
        Self { engine, output_dir }
    }

    /// Runs the effects and returns messages that are already known (immediate failures, saves).
    pub fn run(&self, effects: Vec<Effect>) -> Vec<Msg> {
        let mut follow_ups = Vec::new();
        for effect in effects {
            match effect {
                Effect::RequestPreview { token, file } => {
                    roster_info!(
                        "RequestPreview token={} file={} bytes={}",
                        token,
                        file.display_name(),
                        file.len()
                    );
                    if let Err(err) = self.engine.submit_preview(token, to_upload(&file)) {
                        roster_error!("Preview submit failed: {}", err);
                        follow_ups.push(Msg::PreviewCompleted {
                            token,
                            result: Err(err.to_string()),
                        });
                    }
                }
                Effect::RequestGenerate { token, request } => {
                    roster_info!(
                        "RequestGenerate token={} period={} bytes={}",
                        token,
                        request.period,
                        request.file.len()
                    );
                    if let Err(err) = self.engine.submit_generate(token, to_params(request)) {
                        roster_error!("Generate submit failed: {}", err);
                        follow_ups.push(Msg::GenerateCompleted {
                            token,
                            outcome: GenerationOutcome::Failure {
                                message: err.to_string(),
                            },
                        });
                    }
                }
                Effect::SaveDownload { filename, payload } => {
                    let msg = match save_roster(&self.output_dir, &filename, &payload) {
                        Ok(path) => Msg::DownloadSaved {
                            path: path.display().to_string(),
                        },
                        Err(err) => {
                            roster_warn!("Saving {} failed: {}", filename, err);
                            Msg::DownloadFailed {
                                message: format!("could not save {filename}: {err}"),
                            }
                        }
                    };
                    follow_ups.push(msg);
                }
            }
        }
        follow_ups
    }

    /// Next finished round-trip, if any, translated into a message.
    pub fn poll(&self) -> Option<Msg> {
        self.engine.try_recv().map(map_event)
    }
}

pub fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::PreviewCompleted { request_id, result } => Msg::PreviewCompleted {
            token: request_id,
            result: result.map(to_report).map_err(|err| err.message),
        },
        EngineEvent::GenerateCompleted { request_id, result } => Msg::GenerateCompleted {
            token: request_id,
            outcome: to_outcome(result.map_err(|err| err.message)),
        },
    }
}

fn to_upload(file: &StagedFile) -> Upload {
    Upload {
        file_name: file.display_name().to_string(),
        bytes: file.bytes().clone(),
    }
}

fn to_params(request: GenerateRequest) -> GenerateParams {
    GenerateParams {
        upload: to_upload(&request.file),
        year: request.period.year(),
        month: request.period.month(),
        staff_order: request.staff_order,
    }
}

fn to_report(reply: PreviewReply) -> PreviewReport {
    let identity = reply
        .identity_map
        .into_iter()
        .map(|(name, label)| {
            let class = IdentityClass::from_label(&label);
            (name, class)
        });
    PreviewReport {
        filename: reply.filename,
        staff_count: reply.staff_count,
        result: PreviewResult::new(reply.staff_list, identity),
        sheets: reply.sheets.map(|s| SheetNames {
            main: s.main,
            sub: s.sub,
            identity: s.identity,
        }),
    }
}

fn to_outcome(result: Result<GeneratedRoster, String>) -> GenerationOutcome {
    match result {
        Ok(roster) => GenerationOutcome::Success {
            payload: roster.payload,
            filename: roster.filename,
        },
        Err(message) => GenerationOutcome::Failure { message },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use bytes::Bytes;
    use roster_engine::{ClientError, SheetInfo};

    use super::*;

    #[test]
    fn preview_reply_maps_to_report() {
        let reply = PreviewReply {
            filename: Some("roster.xlsx".to_string()),
            staff_count: 2,
            staff_list: vec!["王小明".to_string(), "李小華".to_string()],
            identity_map: HashMap::from([
                ("王小明".to_string(), "公職".to_string()),
                ("李小華".to_string(), "其他".to_string()),
            ]),
            sheets: Some(SheetInfo {
                main: Some("主值".to_string()),
                sub: None,
                identity: Some("身分".to_string()),
            }),
        };
        let msg = map_event(EngineEvent::PreviewCompleted {
            request_id: 4,
            result: Ok(reply),
        });
        let Msg::PreviewCompleted { token, result } = msg else {
            panic!("unexpected message {msg:?}");
        };
        assert_eq!(token, 4);
        let report = result.unwrap();
        assert_eq!(report.result.classify("王小明"), IdentityClass::PublicPost);
        assert_eq!(report.result.classify("李小華"), IdentityClass::Unclassified);
        assert_eq!(report.sheets.unwrap().main.as_deref(), Some("主值"));
    }

    #[test]
    fn generate_error_maps_to_failure_outcome() {
        let err = client_error("產生排班失敗: bad");
        let msg = map_event(EngineEvent::GenerateCompleted {
            request_id: 9,
            result: Err(err),
        });
        assert_eq!(
            msg,
            Msg::GenerateCompleted {
                token: 9,
                outcome: GenerationOutcome::Failure {
                    message: "產生排班失敗: bad".to_string()
                },
            }
        );
    }

    #[test]
    fn generated_roster_maps_to_success_outcome() {
        let msg = map_event(EngineEvent::GenerateCompleted {
            request_id: 2,
            result: Ok(GeneratedRoster {
                filename: "BOR_202501_排班表.xlsx".to_string(),
                payload: Bytes::from_static(b"xlsx"),
                content_type: None,
            }),
        });
        assert_eq!(
            msg,
            Msg::GenerateCompleted {
                token: 2,
                outcome: GenerationOutcome::Success {
                    payload: Bytes::from_static(b"xlsx"),
                    filename: "BOR_202501_排班表.xlsx".to_string(),
                },
            }
        );
    }

    fn client_error(message: &str) -> ClientError {
        ClientError {
            kind: roster_engine::FailureKind::HttpStatus(400),
            message: message.to_string(),
        }
    }
}
