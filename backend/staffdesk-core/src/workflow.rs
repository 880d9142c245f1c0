// src/workflow.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::dates;
use crate::error::{Result, StaffdeskError};

/// Status of a permission or vacation request as carried on the wire
/// (`0` Pending, `1` Approved, `2` Rejected). Any other code is kept as
/// `Unknown` so it can still be displayed and sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Unknown(i32),
}

impl RequestStatus {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => RequestStatus::Pending,
            1 => RequestStatus::Approved,
            2 => RequestStatus::Rejected,
            other => RequestStatus::Unknown(other),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            RequestStatus::Pending => 0,
            RequestStatus::Approved => 1,
            RequestStatus::Rejected => 2,
            RequestStatus::Unknown(code) => *code,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Approved => "Approved",
            RequestStatus::Rejected => "Rejected",
            RequestStatus::Unknown(_) => "Unknown",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Approved | RequestStatus::Rejected)
    }
}

impl From<i32> for RequestStatus {
    fn from(code: i32) -> Self {
        RequestStatus::from_code(code)
    }
}

impl From<RequestStatus> for i32 {
    fn from(status: RequestStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Maps a raw status code to its display text.
pub fn map_status(code: i32) -> &'static str {
    RequestStatus::from_code(code).label()
}

/// An approver's verdict on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn target_status(&self) -> RequestStatus {
        match self {
            Decision::Approve => RequestStatus::Approved,
            Decision::Reject => RequestStatus::Rejected,
        }
    }

    pub fn code(&self) -> i32 {
        self.target_status().code()
    }

    /// Past-tense verb used in confirmation notices ("approved", "rejected").
    pub fn past_tense(&self) -> String {
        self.target_status().label().to_lowercase()
    }
}

const PENDING_ACTIONS: [Decision; 2] = [Decision::Approve, Decision::Reject];

/// Applies a decision to the current status. Only `Pending` may move, and
/// only into one of the two terminal states.
pub fn transition(current: RequestStatus, decision: Decision) -> Result<RequestStatus> {
    match current {
        RequestStatus::Pending => Ok(decision.target_status()),
        from => Err(StaffdeskError::InvalidTransition {
            from,
            to: decision.target_status(),
        }),
    }
}

/// Decisions an approver may be offered for a row in the given status.
pub fn available_actions(status: RequestStatus) -> &'static [Decision] {
    match status {
        RequestStatus::Pending => &PENDING_ACTIONS,
        _ => &[],
    }
}

// End-before-begin is left to the server to judge
pub fn warn_if_inverted(begin: DateTime<Utc>, end: DateTime<Utc>) {
    if dates::is_inverted(begin, end) {
        warn!(
            "Requested range ends before it begins ({} > {}); sending as entered",
            dates::to_wire(&begin),
            dates::to_wire(&end)
        );
    }
}

/// Transient, dismissible feedback shown after an action. Mirrors the
/// snackbar pair of the views: one success slot, one error slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notifications {
    success: Option<String>,
    error: Option<String>,
}

impl Notifications {
    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_success(&mut self, message: impl Into<String>) {
        self.success = Some(message.into());
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn dismiss(&mut self) {
        self.success = None;
        self.error = None;
    }

    pub fn is_empty(&self) -> bool {
        self.success.is_none() && self.error.is_none()
    }
}
