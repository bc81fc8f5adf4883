use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use roster_engine::{
    ClientError, EngineEvent, EngineHandle, GenerateParams, GeneratedRoster, PreviewReply,
    RosterService, Upload,
};

#[derive(Default)]
struct RecordingService {
    uploads: Mutex<Vec<Bytes>>,
}

#[async_trait::async_trait]
impl RosterService for RecordingService {
    async fn preview(&self, upload: &Upload) -> Result<PreviewReply, ClientError> {
        self.uploads.lock().unwrap().push(upload.bytes.clone());
        Ok(PreviewReply {
            filename: Some(upload.file_name.clone()),
            staff_count: 1,
            staff_list: vec!["甲".to_string()],
            ..PreviewReply::default()
        })
    }

    async fn generate(&self, params: &GenerateParams) -> Result<GeneratedRoster, ClientError> {
        self.uploads.lock().unwrap().push(params.upload.bytes.clone());
        Ok(GeneratedRoster {
            filename: format!("BOR_{}{:02}.xlsx", params.year, params.month),
            payload: Bytes::from_static(b"out"),
            content_type: None,
        })
    }
}

fn upload() -> Upload {
    Upload {
        file_name: "roster.xlsx".to_string(),
        bytes: Bytes::from_static(b"workbook"),
    }
}

#[test]
fn engine_reports_completions_with_request_ids() {
    let service = Arc::new(RecordingService::default());
    let engine = EngineHandle::with_service(service.clone()).expect("engine");

    engine.submit_preview(7, upload()).expect("submit preview");
    match engine.recv_timeout(Duration::from_secs(5)) {
        Some(EngineEvent::PreviewCompleted { request_id, result }) => {
            assert_eq!(request_id, 7);
            assert_eq!(result.unwrap().filename.as_deref(), Some("roster.xlsx"));
        }
        other => panic!("unexpected event {other:?}"),
    }

    engine
        .submit_generate(
            8,
            GenerateParams {
                upload: upload(),
                year: 2025,
                month: 4,
                staff_order: String::new(),
            },
        )
        .expect("submit generate");
    match engine.recv_timeout(Duration::from_secs(5)) {
        Some(EngineEvent::GenerateCompleted { request_id, result }) => {
            assert_eq!(request_id, 8);
            assert_eq!(result.unwrap().filename, "BOR_202504.xlsx");
        }
        other => panic!("unexpected event {other:?}"),
    }

    let uploads = service.uploads.lock().unwrap();
    assert_eq!(uploads.len(), 2);
    assert!(uploads.iter().all(|bytes| bytes.as_ref() == b"workbook"));
}

#[test]
fn try_recv_is_empty_when_idle() {
    let engine = EngineHandle::with_service(Arc::new(RecordingService::default())).expect("engine");
    assert!(engine.try_recv().is_none());
}
