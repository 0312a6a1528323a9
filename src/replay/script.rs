//! Replay scripts: one JSON object per line, keyed by `op`. Blank lines and
//! lines starting with `#` are skipped.

use serde::Deserialize;
use thiserror::Error;
use whisperline::kernel::services::ports::Suggestion;

#[derive(Debug, Error)]
#[error("line {line}: {source}")]
pub struct ScriptError {
    pub line: usize,
    #[source]
    pub source: serde_json::Error,
}

fn one() -> usize {
    1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Sign in: Builder ID unless a start URL is given.
    Connect {
        #[serde(default)]
        start_url: Option<String>,
        #[serde(default)]
        region: Option<String>,
    },
    Disconnect,
    Expire,
    Reauthenticate,
    Open {
        uri: String,
        language: String,
        #[serde(default)]
        text: String,
        #[serde(default)]
        cursor: Option<usize>,
    },
    Type {
        text: String,
    },
    Backspace {
        #[serde(default = "one")]
        count: usize,
    },
    Wait {
        ms: u64,
    },
    MoveCursor {
        offset: usize,
        #[serde(default)]
        mouse: bool,
    },
    Next,
    Previous,
    Accept,
    Reject,
    Invoke,
    Blur,
    Focus,
    Close,
    /// Queues the reply for the next completion request.
    Respond {
        suggestions: Vec<Suggestion>,
    },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "connect",
            Self::Disconnect => "disconnect",
            Self::Expire => "expire",
            Self::Reauthenticate => "reauthenticate",
            Self::Open { .. } => "open",
            Self::Type { .. } => "type",
            Self::Backspace { .. } => "backspace",
            Self::Wait { .. } => "wait",
            Self::MoveCursor { .. } => "move_cursor",
            Self::Next => "next",
            Self::Previous => "previous",
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::Invoke => "invoke",
            Self::Blur => "blur",
            Self::Focus => "focus",
            Self::Close => "close",
            Self::Respond { .. } => "respond",
        }
    }
}

pub fn parse_script(input: &str) -> Result<Vec<Step>, ScriptError> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|source| ScriptError {
                line: idx + 1,
                source,
            })
        })
        .collect()
}
