//! Approve/reject actions submitted by a reviewer.
//!
//! The one business rule: a rejection must carry a non-blank reason.
//! Approvals need no justification and any reason supplied is ignored.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::approval::ApprovalStatus;

/// Reviewer decision on a pending approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalAction {
    Approve,
    Reject,
}

impl ApprovalAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "approve" => Some(Self::Approve),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }

    /// Terminal status the backend should move the approval to.
    pub fn resulting_status(&self) -> ApprovalStatus {
        match self {
            Self::Approve => ApprovalStatus::Approved,
            Self::Reject => ApprovalStatus::Rejected,
        }
    }

    pub const ALL: &'static [&'static str] = &["approve", "reject"];
}

impl std::fmt::Display for ApprovalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check whether an action may be submitted.
///
/// `approve` always passes. `reject` passes only with a reason that is
/// non-empty after trimming.
pub fn validate_action(action: ApprovalAction, reason: Option<&str>) -> bool {
    match action {
        ApprovalAction::Approve => true,
        ApprovalAction::Reject => reason.is_some_and(|r| !r.trim().is_empty()),
    }
}

/// An action as posted by the review UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_rejection_reason"))]
pub struct ApprovalActionRequest {
    pub action: ApprovalAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

fn validate_rejection_reason(request: &ApprovalActionRequest) -> Result<(), ValidationError> {
    if validate_action(request.action, request.reason.as_deref()) {
        return Ok(());
    }
    let mut err = ValidationError::new("reason_required");
    err.message = Some("A rejection must include a reason".into());
    Err(err)
}

impl ApprovalActionRequest {
    pub fn approve() -> Self {
        Self {
            action: ApprovalAction::Approve,
            reason: None,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            action: ApprovalAction::Reject,
            reason: Some(reason.into()),
        }
    }

    /// Boolean verdict of [`Validate::validate`]; failures are logged at
    /// debug level.
    pub fn is_valid(&self) -> bool {
        match self.validate() {
            Ok(()) => true,
            Err(errors) => {
                tracing::debug!(action = %self.action, %errors, "Rejected approval action");
                false
            }
        }
    }
}
