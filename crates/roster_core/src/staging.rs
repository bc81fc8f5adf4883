use std::collections::{HashMap, HashSet};

use bytes::Bytes;

/// Upper bound accepted by the roster backend for a single upload.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Spreadsheet extensions the roster backend accepts (compared case-insensitively).
pub const ALLOWED_EXTENSIONS: &[&str] = &["xlsx", "xls", "xlsm"];

/// The single spreadsheet the user has selected, held only in memory.
///
/// `Bytes` is reference counted, so handing the file to a preview or generate
/// request shares the exact same buffer instead of re-reading it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    display_name: String,
    bytes: Bytes,
}

impl StagedFile {
    pub fn new(display_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            display_name: display_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("no file selected")]
    MissingName,
    #[error("unsupported file type for {name}; choose an .xlsx, .xls or .xlsm file")]
    UnsupportedExtension { name: String },
    #[error("{name} is empty")]
    Empty { name: String },
    #[error("{name} is too large ({len} bytes, limit {max} bytes)")]
    TooLarge { name: String, len: usize, max: usize },
}

/// Local checks applied before a selection is staged; mirrors what the backend would reject.
pub fn validate_selection(name: &str, len: usize) -> Result<(), SelectionError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(SelectionError::MissingName);
    }
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty());
    let allowed = extension.is_some_and(|ext| {
        ALLOWED_EXTENSIONS
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
    });
    if !allowed {
        return Err(SelectionError::UnsupportedExtension {
            name: name.to_string(),
        });
    }
    if len == 0 {
        return Err(SelectionError::Empty {
            name: name.to_string(),
        });
    }
    if len > MAX_UPLOAD_BYTES {
        return Err(SelectionError::TooLarge {
            name: name.to_string(),
            len,
            max: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}

/// Staff classification used for display styling only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IdentityClass {
    /// 公職
    PublicPost,
    /// 契約
    Contract,
    #[default]
    Unclassified,
}

impl IdentityClass {
    /// Maps the backend's identity label onto a class; unknown labels are unclassified.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "公職" => IdentityClass::PublicPost,
            "契約" => IdentityClass::Contract,
            _ => IdentityClass::Unclassified,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IdentityClass::PublicPost => "公職",
            IdentityClass::Contract => "契約",
            IdentityClass::Unclassified => "",
        }
    }
}

/// Worksheet names the backend detected in the uploaded workbook.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SheetNames {
    pub main: Option<String>,
    pub sub: Option<String>,
    pub identity: Option<String>,
}

/// Staff list and classification derived from one successful preview.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreviewResult {
    staff_list: Vec<String>,
    identity_map: HashMap<String, IdentityClass>,
}

impl PreviewResult {
    /// Builds a result; repeated names keep only their first appearance.
    pub fn new(
        staff_list: impl IntoIterator<Item = String>,
        identity_map: impl IntoIterator<Item = (String, IdentityClass)>,
    ) -> Self {
        let mut seen = HashSet::new();
        let staff_list = staff_list
            .into_iter()
            .filter(|name| seen.insert(name.clone()))
            .collect();
        Self {
            staff_list,
            identity_map: identity_map.into_iter().collect(),
        }
    }

    pub fn staff_list(&self) -> &[String] {
        &self.staff_list
    }

    pub fn classify(&self, name: &str) -> IdentityClass {
        self.identity_map.get(name).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.staff_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staff_list.is_empty()
    }
}

/// Everything a successful preview round-trip reports back.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreviewReport {
    /// Canonical filename as echoed by the server.
    pub filename: Option<String>,
    /// Server-reported staff count.
    pub staff_count: usize,
    pub result: PreviewResult,
    pub sheets: Option<SheetNames>,
}

/// In-memory holder for the staged file and the preview derived from it.
///
/// Staging a new file or clearing always invalidates the preview.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileStagingStore {
    staged: Option<StagedFile>,
    preview: Option<PreviewReport>,
}

impl FileStagingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any staged file and drops the preview belonging to it.
    pub fn stage(&mut self, file: StagedFile) {
        self.staged = Some(file);
        self.preview = None;
    }

    /// Releases the staged file and preview. Returns whether anything was held.
    pub fn clear(&mut self) -> bool {
        let had_state = self.staged.is_some() || self.preview.is_some();
        self.staged = None;
        self.preview = None;
        had_state
    }

    pub fn is_staged(&self) -> bool {
        self.staged.is_some()
    }

    pub fn staged(&self) -> Option<&StagedFile> {
        self.staged.as_ref()
    }

    pub fn preview(&self) -> Option<&PreviewReport> {
        self.preview.as_ref()
    }

    /// Attaches a preview to the staged file. Ignored when nothing is staged.
    pub fn set_preview(&mut self, report: PreviewReport) -> bool {
        if self.staged.is_none() {
            return false;
        }
        self.preview = Some(report);
        true
    }

    /// True when a file is staged and its preview lists at least one person.
    pub fn has_usable_preview(&self) -> bool {
        self.is_staged()
            && self
                .preview
                .as_ref()
                .is_some_and(|report| !report.result.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> PreviewReport {
        PreviewReport {
            filename: Some("roster.xlsx".to_string()),
            staff_count: 1,
            result: PreviewResult::new(
                vec!["王小明".to_string()],
                vec![("王小明".to_string(), IdentityClass::PublicPost)],
            ),
            sheets: None,
        }
    }

    #[test]
    fn staging_new_file_drops_preview() {
        let mut store = FileStagingStore::new();
        store.stage(StagedFile::new("a.xlsx", b"first".to_vec()));
        assert!(store.set_preview(sample_report()));
        assert!(store.has_usable_preview());

        store.stage(StagedFile::new("b.xlsx", b"second".to_vec()));
        assert!(store.preview().is_none());
        assert_eq!(store.staged().unwrap().display_name(), "b.xlsx");
    }

    #[test]
    fn clear_is_idempotent() {
        let mut store = FileStagingStore::new();
        store.stage(StagedFile::new("a.xlsx", b"x".to_vec()));
        assert!(store.clear());
        let snapshot = store.clone();
        assert!(!store.clear());
        assert_eq!(store, snapshot);
        assert!(!store.is_staged());
    }

    #[test]
    fn preview_without_file_is_ignored() {
        let mut store = FileStagingStore::new();
        assert!(!store.set_preview(sample_report()));
        assert!(store.preview().is_none());
    }

    #[test]
    fn staff_list_keeps_first_appearance() {
        let result = PreviewResult::new(
            vec!["乙".to_string(), "甲".to_string(), "乙".to_string()],
            Vec::new(),
        );
        assert_eq!(result.staff_list(), ["乙".to_string(), "甲".to_string()]);
        assert_eq!(result.classify("甲"), IdentityClass::Unclassified);
    }

    #[test]
    fn selection_checks_extension_and_size() {
        assert!(validate_selection("排班.XLSX", 10).is_ok());
        assert!(validate_selection("roster.xlsm", 10).is_ok());
        assert_eq!(
            validate_selection("notes.txt", 10),
            Err(SelectionError::UnsupportedExtension {
                name: "notes.txt".to_string()
            })
        );
        assert!(matches!(
            validate_selection("xlsx", 10),
            Err(SelectionError::UnsupportedExtension { .. })
        ));
        assert_eq!(validate_selection("  ", 10), Err(SelectionError::MissingName));
        assert!(matches!(
            validate_selection("a.xls", 0),
            Err(SelectionError::Empty { .. })
        ));
        assert!(matches!(
            validate_selection("a.xls", MAX_UPLOAD_BYTES + 1),
            Err(SelectionError::TooLarge { .. })
        ));
    }

    #[test]
    fn identity_labels_map_to_classes() {
        assert_eq!(IdentityClass::from_label("公職"), IdentityClass::PublicPost);
        assert_eq!(IdentityClass::from_label(" 契約 "), IdentityClass::Contract);
        assert_eq!(IdentityClass::from_label("兼任"), IdentityClass::Unclassified);
    }
}
