use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use roster_logging::{roster_debug, roster_info};
use serde::Deserialize;

use crate::filename::resolve_roster_filename;
use crate::{
    ClientError, FailureKind, GenerateParams, GeneratedRoster, PreviewReply, SheetInfo, Upload,
};

const PREVIEW_PATH: &str = "api/preview";
const GENERATE_PATH: &str = "api/generate";
const FILE_FIELD: &str = "file";

/// Shown when the generate endpoint fails without a readable reason.
pub const GENERIC_GENERATE_FAILURE: &str = "產生排班失敗";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_response_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            max_response_bytes: 64 * 1024 * 1024,
        }
    }
}

/// The two round-trips of the roster backend.
#[async_trait::async_trait]
pub trait RosterService: Send + Sync {
    async fn preview(&self, upload: &Upload) -> Result<PreviewReply, ClientError>;

    async fn generate(&self, params: &GenerateParams) -> Result<GeneratedRoster, ClientError>;
}

#[derive(Debug, Deserialize)]
struct PreviewWire {
    success: bool,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    staff_count: Option<usize>,
    #[serde(default)]
    staff_list: Option<Vec<String>>,
    #[serde(default)]
    identity_map: Option<HashMap<String, String>>,
    #[serde(default)]
    sheets: Option<SheetWire>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SheetWire {
    #[serde(default)]
    main: Option<String>,
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    identity: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorWire {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReqwestRosterService {
    settings: ClientSettings,
    base_url: reqwest::Url,
    client: reqwest::Client,
}

impl ReqwestRosterService {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let mut base_url = reqwest::Url::parse(&settings.base_url)
            .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ClientError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            base_url,
            client,
        })
    }

    fn endpoint(&self, path: &str) -> Result<reqwest::Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    /// Reads the body while enforcing `max_response_bytes`.
    async fn read_body(&self, response: reqwest::Response) -> Result<Bytes, ClientError> {
        let max_bytes = self.settings.max_response_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(ClientError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = body.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(ClientError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(Bytes::from(body))
    }
}

#[async_trait::async_trait]
impl RosterService for ReqwestRosterService {
    async fn preview(&self, upload: &Upload) -> Result<PreviewReply, ClientError> {
        let url = self.endpoint(PREVIEW_PATH)?;
        roster_debug!(
            "POST {} file={} bytes={}",
            url,
            upload.file_name,
            upload.bytes.len()
        );
        let form = Form::new().part(FILE_FIELD, file_part(upload));
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let body = self.read_body(response).await?;
        let wire: PreviewWire = match serde_json::from_slice(&body) {
            Ok(wire) => wire,
            Err(_) if !status.is_success() => {
                return Err(ClientError::new(
                    FailureKind::HttpStatus(status.as_u16()),
                    status.to_string(),
                ));
            }
            Err(err) => {
                return Err(ClientError::new(
                    FailureKind::MalformedResponse,
                    format!("invalid preview response: {err}"),
                ));
            }
        };

        if !wire.success {
            let message = wire
                .error
                .unwrap_or_else(|| format!("preview rejected ({status})"));
            return Err(ClientError::new(FailureKind::Rejected, message));
        }
        if !status.is_success() {
            return Err(ClientError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let staff_list = wire.staff_list.unwrap_or_default();
        let reply = PreviewReply {
            filename: wire.filename,
            staff_count: wire.staff_count.unwrap_or(staff_list.len()),
            staff_list,
            identity_map: wire.identity_map.unwrap_or_default(),
            sheets: wire.sheets.map(|s| SheetInfo {
                main: s.main,
                sub: s.sub,
                identity: s.identity,
            }),
        };
        roster_info!(
            "Preview of {} returned {} staff",
            upload.file_name,
            reply.staff_count
        );
        Ok(reply)
    }

    async fn generate(&self, params: &GenerateParams) -> Result<GeneratedRoster, ClientError> {
        let url = self.endpoint(GENERATE_PATH)?;
        roster_debug!(
            "POST {} file={} bytes={} period={}-{:02} order_lines={}",
            url,
            params.upload.file_name,
            params.upload.bytes.len(),
            params.year,
            params.month,
            params.staff_order.lines().count()
        );
        let form = Form::new()
            .part(FILE_FIELD, file_part(&params.upload))
            .text("year", params.year.to_string())
            .text("month", params.month.to_string())
            .text("staff_order", params.staff_order.clone());
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let content_type = header_string(&response, CONTENT_TYPE);
        let disposition = header_string(&response, CONTENT_DISPOSITION);
        let body = self.read_body(response).await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorWire>(&body)
                .ok()
                .and_then(|wire| wire.error)
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| GENERIC_GENERATE_FAILURE.to_string());
            return Err(ClientError::new(
                FailureKind::HttpStatus(status.as_u16()),
                message,
            ));
        }

        // The backend also reports some failures as a 200 JSON body.
        if content_type.as_deref().is_some_and(is_json) {
            if let Ok(wire) = serde_json::from_slice::<ErrorWire>(&body) {
                if wire.success == Some(false) || wire.error.is_some() {
                    let message = wire
                        .error
                        .unwrap_or_else(|| GENERIC_GENERATE_FAILURE.to_string());
                    return Err(ClientError::new(FailureKind::Rejected, message));
                }
            }
        }

        let filename = resolve_roster_filename(disposition.as_deref(), params.year, params.month);
        roster_info!("Generated {} ({} bytes)", filename, body.len());
        Ok(GeneratedRoster {
            filename,
            payload: body,
            content_type,
        })
    }
}

fn file_part(upload: &Upload) -> Part {
    Part::bytes(upload.bytes.to_vec()).file_name(upload.file_name.clone())
}

fn header_string(
    response: &reqwest::Response,
    name: reqwest::header::HeaderName,
) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

fn is_json(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ClientError::new(FailureKind::MalformedResponse, err.to_string());
    }
    ClientError::new(FailureKind::Network, err.to_string())
}
