use std::path::PathBuf;

use roster_core::Msg;

/// One line of user input, decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Forward straight into `update`.
    Dispatch(Msg),
    /// Read a file from disk, then stage it.
    Open(PathBuf),
    Periods,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "open" | "drop" => match unquote(rest) {
            "" => Command::Invalid("usage: open <path>".to_string()),
            path => Command::Open(PathBuf::from(path)),
        },
        "clear" => Command::Dispatch(Msg::FileCleared),
        "next" => Command::Dispatch(Msg::NextClicked),
        "back" => Command::Dispatch(Msg::BackClicked),
        "year" => match rest.parse::<i32>() {
            Ok(year) => Command::Dispatch(Msg::YearChanged(year)),
            Err(_) => Command::Invalid(format!("not a year: {rest:?}")),
        },
        "month" => match rest.parse::<u32>() {
            Ok(month) => Command::Dispatch(Msg::MonthChanged(month)),
            Err(_) => Command::Invalid(format!("not a month: {rest:?}")),
        },
        "order" => Command::Dispatch(Msg::StaffOrderChanged(parse_order(rest))),
        "order-clear" => Command::Dispatch(Msg::StaffOrderChanged(String::new())),
        "autofill" => Command::Dispatch(Msg::AutoFillOrderClicked),
        "generate" => Command::Dispatch(Msg::GenerateClicked),
        "download" | "save" => Command::Dispatch(Msg::DownloadClicked),
        "restart" => Command::Dispatch(Msg::RestartClicked),
        "periods" => Command::Periods,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => Command::Invalid(format!("unknown command {other:?}; type `help`")),
    }
}

/// `a|b|c` becomes one name per line; blank entries are dropped.
fn parse_order(raw: &str) -> String {
    raw.split('|')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn unquote(raw: &str) -> &str {
    let raw = raw.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = raw
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    raw
}
