//! Operator commands read from stdin.
//!
//! One command per line:
//!
//! - `schedule <kind> <seconds> [json-array]`
//! - `cancel <kind>`
//! - `status`
//! - `quit`

use std::sync::Arc;

use hudtick_core::runner::PulseControl;
use hudtick_core::shared::SharedScheduler;
use hudtick_types::{CommandArgs, CommandKind, ParseKindError};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// Errors from parsing an operator line.
#[derive(Debug, thiserror::Error)]
pub enum OperatorError {
    /// The line was empty.
    #[error("empty command")]
    Empty,

    /// The verb is not recognized.
    #[error("unknown command: {verb}")]
    UnknownVerb {
        /// The rejected verb.
        verb: String,
    },

    /// A required argument is missing.
    #[error("{verb}: missing {what}")]
    Missing {
        /// The command verb.
        verb: &'static str,
        /// What was missing.
        what: &'static str,
    },

    /// The command kind is unknown.
    #[error(transparent)]
    Kind(#[from] ParseKindError),

    /// The delay is not an integer.
    #[error("invalid delay: {source}")]
    Delay {
        /// The underlying parse error.
        #[from]
        source: std::num::ParseIntError,
    },

    /// The argument list is not a JSON array.
    #[error("invalid arguments: {source}")]
    Args {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}

/// A parsed operator command.
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorCommand {
    /// Queue a command.
    Schedule {
        /// What to run.
        kind: CommandKind,
        /// Delay in seconds (validated by the scheduler).
        delay_seconds: i64,
        /// Optional arguments.
        args: Option<CommandArgs>,
    },
    /// Cancel all pending commands of a kind.
    Cancel {
        /// Kind to cancel.
        kind: CommandKind,
    },
    /// Log pending work.
    Status,
    /// Stop the engine.
    Quit,
}

impl OperatorCommand {
    /// Parse one operator line.
    ///
    /// # Errors
    ///
    /// Returns [`OperatorError`] describing why the line is not a command.
    pub fn parse(line: &str) -> Result<Self, OperatorError> {
        let line = line.trim();
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        match verb {
            "" => Err(OperatorError::Empty),
            "schedule" => {
                let mut parts = rest.splitn(3, char::is_whitespace);
                let kind: CommandKind = parts
                    .next()
                    .filter(|s| !s.is_empty())
                    .ok_or(OperatorError::Missing {
                        verb: "schedule",
                        what: "kind",
                    })?
                    .parse()?;
                let delay_seconds: i64 = parts
                    .next()
                    .ok_or(OperatorError::Missing {
                        verb: "schedule",
                        what: "seconds",
                    })?
                    .parse()?;
                let args = parts
                    .next()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(serde_json::from_str::<CommandArgs>)
                    .transpose()?;
                Ok(Self::Schedule {
                    kind,
                    delay_seconds,
                    args,
                })
            }
            "cancel" => {
                if rest.is_empty() {
                    return Err(OperatorError::Missing {
                        verb: "cancel",
                        what: "kind",
                    });
                }
                Ok(Self::Cancel { kind: rest.parse()? })
            }
            "status" => Ok(Self::Status),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(OperatorError::UnknownVerb {
                verb: other.to_owned(),
            }),
        }
    }
}

/// Apply a command. Returns `false` once the engine should stop.
pub fn apply(command: OperatorCommand, scheduler: &SharedScheduler, control: &PulseControl) -> bool {
    match command {
        OperatorCommand::Schedule {
            kind,
            delay_seconds,
            args,
        } => match scheduler.schedule(kind, delay_seconds, args) {
            Ok(tick) => info!(%kind, tick, "Operator scheduled command"),
            Err(e) => warn!(%kind, error = %e, "Operator schedule rejected"),
        },
        OperatorCommand::Cancel { kind } => match scheduler.cancel_kind(kind) {
            Ok(report) => info!(
                %kind,
                primary_removed = report.primary_removed,
                dependent_removed = report.dependent_removed,
                "Operator cancel"
            ),
            Err(e) => warn!(%kind, error = %e, "Operator cancel failed"),
        },
        OperatorCommand::Status => {
            let status = scheduler.with(|s| (s.current_tick(), s.len(), s.pending_ticks().next()));
            match status {
                Ok((tick, pending, next)) => info!(tick, pending, next_due = ?next, "Scheduler status"),
                Err(e) => warn!(error = %e, "Status unavailable"),
            }
        }
        OperatorCommand::Quit => {
            control.request_stop();
            return false;
        }
    }
    true
}

/// Read operator commands from stdin until EOF or `quit`.
pub async fn read_stdin(scheduler: SharedScheduler, control: Arc<PulseControl>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match OperatorCommand::parse(&line) {
                Ok(command) => {
                    if !apply(command, &scheduler, &control) {
                        break;
                    }
                }
                Err(OperatorError::Empty) => {}
                Err(e) => warn!(error = %e, line = %line, "Ignoring operator line"),
            },
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Operator input closed");
                break;
            }
        }
    }
}
