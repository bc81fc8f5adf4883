use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use chrono::Datelike;
use clap::Parser;
use log::LevelFilter;
use roster_core::{period_options, update, AppState, Msg, TargetPeriod, MAX_UPLOAD_BYTES};
use roster_engine::{ensure_output_dir, EngineHandle};
use roster_logging::{roster_debug, roster_info, roster_warn};

use super::config::{self, Cli, LOG_FILE};
use super::effects::EffectRunner;
use super::logging;
use super::ui::constants::{HELP, PROMPT};
use super::ui::input::{parse_command, Command};
use super::ui::render::{render, render_periods};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub fn run_app() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::load(&cli).context("loading configuration")?;
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::initialize(config.log_destination, level, Path::new(LOG_FILE));
    roster_info!(
        "roster_app starting; server={} output_dir={}",
        config.server_url,
        config.output_dir.display()
    );

    if let Err(err) = ensure_output_dir(&config.output_dir) {
        roster_warn!(
            "Output directory {} is not usable yet: {}",
            config.output_dir.display(),
            err
        );
    }
    let engine =
        EngineHandle::new(config.client_settings()).context("starting the network engine")?;

    let today = chrono::Local::now().date_naive();
    let initial_period = TargetPeriod::new(today.year(), today.month())
        .context("deriving the initial target period")?;

    let mut app = App {
        state: AppState::new(initial_period),
        runner: EffectRunner::new(engine, config.output_dir.clone()),
        current_year: today.year(),
    };

    let commands = spawn_stdin_reader();
    print!("{}", render(&app.state.view()));
    prompt();

    loop {
        let mut redrawn = false;
        while let Some(msg) = app.runner.poll() {
            redrawn |= app.dispatch(msg);
        }
        if redrawn {
            prompt();
        }

        match commands.recv_timeout(POLL_INTERVAL) {
            Ok(line) => {
                if !app.handle_line(&line) {
                    break;
                }
                prompt();
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    roster_info!("roster_app exiting");
    Ok(())
}

struct App {
    state: AppState,
    runner: EffectRunner,
    current_year: i32,
}

impl App {
    /// Returns `false` when the user asked to quit.
    fn handle_line(&mut self, line: &str) -> bool {
        match parse_command(line) {
            Command::Dispatch(msg) => {
                self.dispatch(msg);
            }
            Command::Open(path) => {
                let msg = read_selection(&path);
                self.dispatch(msg);
            }
            Command::Periods => {
                print!("{}", render_periods(&period_options(self.current_year)));
            }
            Command::Help => println!("{HELP}"),
            Command::Invalid(message) => println!("{message}"),
            Command::Empty => {}
            Command::Quit => return false,
        }
        true
    }

    /// Runs one message through `update`, its effects and their follow-ups.
    /// Returns whether anything was redrawn.
    fn dispatch(&mut self, msg: Msg) -> bool {
        let mut queue = vec![msg];
        let mut redrawn = false;
        while !queue.is_empty() {
            let msg = queue.remove(0);
            roster_debug!("dispatch {:?}", MsgLabel(&msg));
            let (mut next, effects) = update(self.state.clone(), msg);
            queue.extend(self.runner.run(effects));
            if next.consume_dirty() {
                print!("{}", render(&next.view()));
                redrawn = true;
            }
            self.state = next;
        }
        redrawn
    }
}

/// Short form of a message for the log; the staged bytes are never printed.
struct MsgLabel<'a>(&'a Msg);

impl std::fmt::Debug for MsgLabel<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Msg::FileSelected { name, bytes } => {
                write!(f, "FileSelected({name}, {} bytes)", bytes.len())
            }
            Msg::PreviewCompleted { token, result } => {
                write!(f, "PreviewCompleted(token={token}, ok={})", result.is_ok())
            }
            Msg::GenerateCompleted { token, .. } => write!(f, "GenerateCompleted(token={token})"),
            other => write!(f, "{other:?}"),
        }
    }
}

fn read_selection(path: &Path) -> Msg {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    match fs::metadata(path) {
        Ok(meta) if !meta.is_file() => {
            return Msg::FileRejected {
                reason: format!("{} is not a file", path.display()),
            };
        }
        Ok(meta) if meta.len() > MAX_UPLOAD_BYTES as u64 => {
            return Msg::FileRejected {
                reason: format!(
                    "{name} is {} bytes; the limit is {MAX_UPLOAD_BYTES} bytes",
                    meta.len()
                ),
            };
        }
        Ok(_) => {}
        Err(err) => {
            return Msg::FileRejected {
                reason: format!("cannot open {}: {err}", path.display()),
            };
        }
    }
    match fs::read(path) {
        Ok(bytes) => Msg::FileSelected {
            name,
            bytes: bytes.into(),
        },
        Err(err) => Msg::FileRejected {
            reason: format!("cannot read {}: {err}", path.display()),
        },
    }
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn prompt() {
    print!("{PROMPT}");
    let _ = io::stdout().flush();
}
