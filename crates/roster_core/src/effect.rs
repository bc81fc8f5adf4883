use bytes::Bytes;

/// Work the platform performs on behalf of `update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    RequestPreview {
        token: crate::RequestToken,
        file: crate::StagedFile,
    },
    RequestGenerate {
        token: crate::RequestToken,
        request: crate::GenerateRequest,
    },
    SaveDownload { filename: String, payload: Bytes },
}
