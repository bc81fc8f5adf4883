use bytes::Bytes;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked or dropped a spreadsheet.
    FileSelected { name: String, bytes: Bytes },
    /// The platform could not read the chosen file.
    FileRejected { reason: String },
    /// User removed the staged file.
    FileCleared,
    /// Preview round-trip finished; `Err` carries the message to show.
    PreviewCompleted {
        token: crate::RequestToken,
        result: Result<crate::PreviewReport, String>,
    },
    /// User clicked Next on the upload step.
    NextClicked,
    /// User clicked Back (configure step, or result step after a failure).
    BackClicked,
    YearChanged(i32),
    MonthChanged(u32),
    /// User edited the staff ordering text (newline separated names).
    StaffOrderChanged(String),
    /// Fill the ordering from the previewed staff list.
    AutoFillOrderClicked,
    GenerateClicked,
    /// Generate round-trip finished, successfully or not.
    GenerateCompleted {
        token: crate::RequestToken,
        outcome: crate::GenerationOutcome,
    },
    /// User asked to save the generated roster.
    DownloadClicked,
    /// The platform wrote the roster to disk.
    DownloadSaved { path: String },
    /// The platform failed to write the roster.
    DownloadFailed { message: String },
    /// Full reset back to the upload step.
    RestartClicked,
    /// Idle poll of the platform loop; changes nothing.
    Tick,
}
