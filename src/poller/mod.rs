//! Deployment status poller.
//!
//! Each poll reads the newest event of a device and hands `(state, body)` to
//! [`decide`], which is pure: it never sleeps, prints, or exits. The session
//! loop in [`session`] performs whatever the returned [`Action`] asks for.
//!
//! A body identical to the previous one is "nothing new" and costs one sleep
//! interval. A new body is reported at most once. Only `succeeded` ends the
//! wait successfully.

pub mod address;
pub mod session;

use crate::api::STATUS_OK;
use crate::core::types::{Event, Verbosity};
use std::time::Duration;

/// The only state that ends a wait successfully.
pub const TERMINAL_STATE: &str = "succeeded";

/// The state reported while the installer is running.
pub const RUNNING_STATE: &str = "running";

/// Sleep between polls that returned nothing new.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Printed in normal mode for states before `running`.
pub const PROVISIONING_MESSAGE: &str = "Provisioning the system - please wait.";

/// Where a poll session stands after its latest observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing new since the last poll.
    Waiting,
    /// A new body arrived; the deployment is not done.
    Changed,
    /// The deployment reached `succeeded`.
    Done,
    /// A query or the response failed.
    Failed,
}

/// What the session loop should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Sleep one interval, then poll again.
    Sleep,
    /// Print the line (if any), then poll again immediately.
    Report(Option<String>),
    /// Print the line (if any), then stop with this exit code.
    Finish { line: Option<String>, code: i32 },
    /// Stop: the terminal event lacked what this mode must print.
    Fail(String),
}

impl Action {
    pub fn phase(&self) -> Phase {
        match self {
            Self::Sleep => Phase::Waiting,
            Self::Report(_) => Phase::Changed,
            Self::Finish { .. } => Phase::Done,
            Self::Fail(_) => Phase::Failed,
        }
    }
}

/// Result of one decision: the action plus the body to remember.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub action: Action,
    pub last_body: String,
}

/// Decide what to do with the newest event.
///
/// `last_body` is `None` before the first observation, so the first event is
/// always new.
pub fn decide(state: &str, body: &str, last_body: Option<&str>, mode: Verbosity) -> Decision {
    let changed = last_body != Some(body);
    let terminal = state == TERMINAL_STATE;

    let action = match (mode, changed, terminal) {
        (_, false, false) => Action::Sleep,

        (Verbosity::Normal, true, false) => Action::Report(Some(status_line(state, body))),
        (Verbosity::Normal, true, true) => Action::Finish {
            line: Some(status_line(state, body)),
            code: i32::from(STATUS_OK),
        },
        // Already reported this body under its previous state.
        (Verbosity::Normal, false, true) => Action::Finish {
            line: None,
            code: i32::from(STATUS_OK),
        },

        (Verbosity::IpOnly | Verbosity::Silent, true, false) => Action::Report(None),
        // ip-only prints exactly once, on the first terminal observation.
        (Verbosity::IpOnly, _, true) => match address::extract_ipv4(body) {
            Some(ip) => Action::Finish {
                line: Some(ip.to_string()),
                code: 0,
            },
            None => Action::Fail(format!("no IPv4 address in final event: {:?}", body)),
        },
        (Verbosity::Silent, _, true) => Action::Finish { line: None, code: 0 },
    };

    Decision {
        action,
        last_body: body.to_string(),
    }
}

/// Normal-mode line for a state change.
fn status_line(state: &str, body: &str) -> String {
    if state == RUNNING_STATE || state == TERMINAL_STATE {
        format!("{}: {}", title_case(state), body)
    } else {
        PROVISIONING_MESSAGE.to_string()
    }
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// Poll state carried across iterations. Owned by one session loop.
#[derive(Debug, Clone)]
pub struct PollSession {
    mode: Verbosity,
    last_body: Option<String>,
    current_state: Option<String>,
    phase: Phase,
}

impl PollSession {
    pub fn new(mode: Verbosity) -> Self {
        Self {
            mode,
            last_body: None,
            current_state: None,
            phase: Phase::Waiting,
        }
    }

    /// Feed the newest event and get the next action.
    pub fn observe(&mut self, event: &Event) -> Action {
        let decision = decide(
            &event.state,
            &event.body,
            self.last_body.as_deref(),
            self.mode,
        );
        self.last_body = Some(decision.last_body);
        self.current_state = Some(event.state.clone());
        self.phase = decision.action.phase();
        decision.action
    }

    /// Record a failed query.
    pub fn fail(&mut self) {
        self.phase = Phase::Failed;
    }

    pub fn mode(&self) -> Verbosity {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_state(&self) -> Option<&str> {
        self.current_state.as_deref()
    }

    pub fn last_body(&self) -> Option<&str> {
        self.last_body.as_deref()
    }
}
