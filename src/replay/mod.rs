//! Scripted editor session for exercising the completion controller
//! without an editor.

mod editor;
mod fakes;
mod host;
mod script;

use std::io::Read;
use std::path::PathBuf;

use thiserror::Error;
use whisperline::kernel::services::adapters::{
    ensure_settings_file, load_settings, load_settings_from, SettingsError,
};
use whisperline::kernel::services::AuthError;

use host::ReplayHost;
use script::{parse_script, ScriptError};

pub const USAGE: &str = "usage: whisperline <script.jsonl | -> [--settings <path>]";

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("usage: whisperline <script.jsonl | -> [--settings <path>]")]
    Usage,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("script {0}")]
    Script(#[from] ScriptError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

struct Args {
    script: String,
    settings: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<Args, ReplayError> {
    let mut script = None;
    let mut settings = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--settings" => {
                settings = Some(PathBuf::from(iter.next().ok_or(ReplayError::Usage)?));
            }
            "-h" | "--help" => return Err(ReplayError::Usage),
            _ if script.is_none() => script = Some(arg.clone()),
            _ => return Err(ReplayError::Usage),
        }
    }
    Ok(Args {
        script: script.ok_or(ReplayError::Usage)?,
        settings,
    })
}

pub fn run(args: &[String]) -> Result<(), ReplayError> {
    let args = parse_args(args)?;

    let settings = match &args.settings {
        Some(path) => load_settings_from(path)?,
        None => {
            if let Err(e) = ensure_settings_file() {
                tracing::warn!(error = %e, "settings file unavailable");
            }
            load_settings()
        }
    };

    let input = if args.script == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(&args.script)?
    };
    let steps = parse_script(&input)?;
    tracing::info!(steps = steps.len(), script = %args.script, "replay started");

    let stdout = std::io::stdout();
    let mut host = ReplayHost::new(settings, stdout.lock())?;
    host.run(steps)
}
