//! The blocking wait: poll, decide, sleep or print, until done or failed.

use super::{Action, PollSession, POLL_INTERVAL};
use crate::api::{ApiError, EventSource, STATUS_OK};
use crate::core::report;
use crate::core::types::Verbosity;
use std::io::Write;
use std::time::Duration;
use thiserror::Error;

/// Exit code of a finished wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome(pub i32);

/// Why a wait stopped before `succeeded`.
#[derive(Debug, Error)]
pub enum PollError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("cannot write status output: {0}")]
    Output(#[from] std::io::Error),
}

impl PollError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Api(e) => e.exit_code(),
            Self::Output(_) => 1,
        }
    }
}

/// Drives a [`PollSession`] against an event source.
pub struct Poller<'a, S: EventSource + ?Sized> {
    source: &'a S,
    interval: Duration,
}

impl<'a, S: EventSource + ?Sized> Poller<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            interval: POLL_INTERVAL,
        }
    }

    /// Override the sleep between unchanged polls.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Wait until the device reaches `succeeded`.
    ///
    /// Polls forever while the newest event body stays unchanged. Any query
    /// failure ends the wait immediately; nothing is retried.
    pub async fn await_completion<W: Write>(
        &self,
        device_id: &str,
        mode: Verbosity,
        out: &mut W,
    ) -> Result<ExitOutcome, PollError> {
        let mut session = PollSession::new(mode);
        if mode == Verbosity::Normal {
            writeln!(out)?;
        }

        let mut polls: u64 = 0;
        loop {
            polls += 1;
            let events = match self.source.device_events(device_id).await {
                Ok(events) => events,
                Err(e) => {
                    session.fail();
                    tracing::warn!(device_id, polls, error = %e, "event query failed");
                    return Err(e.into());
                }
            };

            let Some(latest) = events.first() else {
                session.fail();
                return Err(ApiError::Malformed("device has no events".to_string()).into());
            };

            let action = session.observe(latest);
            tracing::debug!(
                device_id,
                polls,
                state = %latest.state,
                phase = ?session.phase(),
                "polled device events"
            );

            match action {
                Action::Sleep => tokio::time::sleep(self.interval).await,
                Action::Report(line) => {
                    tracing::info!(device_id, state = %latest.state, "deployment state changed");
                    if let Some(line) = line {
                        writeln!(out, "{}", line)?;
                        out.flush()?;
                    }
                }
                Action::Finish { line, code } => {
                    if let Some(line) = line {
                        writeln!(out, "{}", line)?;
                    }
                    if mode == Verbosity::Normal {
                        writeln!(out)?;
                    }
                    out.flush()?;
                    tracing::info!(device_id, polls, code, "deployment ready");
                    return Ok(ExitOutcome(code));
                }
                Action::Fail(reason) => {
                    return Err(ApiError::Malformed(reason).into());
                }
            }
        }
    }
}

/// Report a failed wait the way the mode allows and return its exit code.
///
/// HTTP failures print the status text on `out`; other failures print a
/// diagnostic on stderr. Silent mode prints nothing.
pub fn report_failure<W: Write>(err: &PollError, mode: Verbosity, out: &mut W) -> ExitOutcome {
    if mode != Verbosity::Silent {
        match err {
            PollError::Api(ApiError::Remote { status }) => {
                let _ = writeln!(out, "{}", report::status_text(*status, STATUS_OK));
                let _ = out.flush();
            }
            other => eprintln!("{}", other),
        }
    }
    ExitOutcome(err.exit_code())
}
