const MAX_FILENAME_CHARS: usize = 120;
const FALLBACK_FILENAME: &str = "roster.xlsx";

/// Name the backend uses when it has nothing better: `BOR_{year}{month:02}_排班表.xlsx`.
pub fn default_roster_filename(year: i32, month: u32) -> String {
    format!("BOR_{year}{month:02}_排班表.xlsx")
}

/// Filename announced by a `Content-Disposition` header.
///
/// Prefers the RFC 5987 `filename*=UTF-8''…` form, then a quoted `filename="…"`,
/// then a bare `filename=token`.
pub fn filename_from_disposition(header: &str) -> Option<String> {
    let params: Vec<(String, &str)> = split_params(header)
        .into_iter()
        .filter_map(|part| {
            let (key, value) = part.split_once('=')?;
            Some((key.trim().to_ascii_lowercase(), value.trim()))
        })
        .collect();

    let extended = params
        .iter()
        .filter(|(key, _)| key == "filename*")
        .find_map(|(_, value)| decode_extended_value(value));
    if extended.is_some() {
        return extended;
    }

    params
        .iter()
        .filter(|(key, _)| key == "filename")
        .find_map(|(_, value)| {
            let name = match value.strip_prefix('"') {
                Some(rest) => rest.strip_suffix('"')?.replace("\\\"", "\""),
                None => value.to_string(),
            };
            Some(name).filter(|n| !n.is_empty())
        })
}

/// Header filename when present and parseable, otherwise the default for the period.
pub fn resolve_roster_filename(disposition: Option<&str>, year: i32, month: u32) -> String {
    disposition
        .and_then(filename_from_disposition)
        .unwrap_or_else(|| default_roster_filename(year, month))
}

/// Splits on `;` outside quoted strings, so `filename="a;b.xlsx"` stays whole.
fn split_params(header: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in header.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                parts.push(&header[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&header[start..]);
    parts
}

fn decode_extended_value(value: &str) -> Option<String> {
    let value = value.trim_matches('"');
    let (charset, rest) = value.split_once('\'')?;
    // Language tag sits between the two quotes and is ignored.
    let (_language, encoded) = rest.split_once('\'')?;
    if !charset.eq_ignore_ascii_case("utf-8") {
        return None;
    }
    urlencoding::decode(encoded)
        .ok()
        .map(|decoded| decoded.into_owned())
        .filter(|decoded| !decoded.is_empty())
}

/// File-system safe version of a server-suggested name.
pub fn sanitize_filename(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]);

    // Collapse multiple underscores
    let mut compacted = String::with_capacity(cleaned.len());
    let mut prev_underscore = false;
    for c in cleaned.chars() {
        if c == '_' {
            if !prev_underscore {
                compacted.push(c);
            }
            prev_underscore = true;
        } else {
            compacted.push(c);
            prev_underscore = false;
        }
    }

    if compacted.is_empty() {
        return FALLBACK_FILENAME.to_string();
    }
    let mut final_name: String = compacted.chars().take(MAX_FILENAME_CHARS).collect();
    let stem = final_name.split('.').next().unwrap_or_default();
    if is_reserved_windows_name(stem) {
        final_name.insert(stem.len(), '_');
    }
    final_name
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extended_filename_is_percent_decoded() {
        let header = "attachment; filename*=UTF-8''BOR_202501_%E6%8E%92%E7%8F%AD%E8%A1%A8.xlsx";
        assert_eq!(
            filename_from_disposition(header).as_deref(),
            Some("BOR_202501_排班表.xlsx")
        );
    }

    #[test]
    fn extended_form_wins_over_plain_form() {
        let header = "attachment; filename=BOR_202501_.xlsx; filename*=utf-8''BOR_202501_%E6%8E%92%E7%8F%AD%E8%A1%A8.xlsx";
        assert_eq!(
            filename_from_disposition(header).as_deref(),
            Some("BOR_202501_排班表.xlsx")
        );
    }

    #[test]
    fn semicolons_inside_quotes_are_part_of_the_name() {
        let header = "attachment; filename=\"BOR;202503.xlsx\"; size=10";
        assert_eq!(
            filename_from_disposition(header).as_deref(),
            Some("BOR;202503.xlsx")
        );
        assert_eq!(
            resolve_roster_filename(Some(header), 2025, 3),
            "BOR;202503.xlsx"
        );
        let escaped = r#"attachment; filename="a \"q;\" b.xlsx""#;
        assert_eq!(
            filename_from_disposition(escaped).as_deref(),
            Some("a \"q;\" b.xlsx")
        );
    }

    #[test]
    fn quoted_and_bare_fallbacks() {
        assert_eq!(
            filename_from_disposition("attachment; filename=\"roster 2025.xlsx\"").as_deref(),
            Some("roster 2025.xlsx")
        );
        assert_eq!(
            filename_from_disposition("attachment; FILENAME=roster.xlsx").as_deref(),
            Some("roster.xlsx")
        );
    }

    #[test]
    fn unusable_headers_yield_none() {
        assert_eq!(filename_from_disposition("attachment"), None);
        assert_eq!(filename_from_disposition("attachment; filename=\"\""), None);
        assert_eq!(
            filename_from_disposition("attachment; filename*=ISO-8859-1''caf%E9.xlsx"),
            None
        );
    }

    #[test]
    fn default_name_pads_month() {
        assert_eq!(default_roster_filename(2025, 3), "BOR_202503_排班表.xlsx");
        assert_eq!(resolve_roster_filename(None, 2025, 3), "BOR_202503_排班表.xlsx");
        assert_eq!(
            resolve_roster_filename(Some("inline"), 2025, 12),
            "BOR_202512_排班表.xlsx"
        );
    }

    #[test]
    fn sanitize_strips_path_components() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_filename("BOR_202501_排班表.xlsx"), "BOR_202501_排班表.xlsx");
        assert_eq!(sanitize_filename("..."), "roster.xlsx");
        assert_eq!(sanitize_filename("CON.xlsx"), "CON_.xlsx");
    }
}
