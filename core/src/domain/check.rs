//! Self-check result models.

use serde::{Deserialize, Serialize};

/// Outcome of a single subsystem check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    #[default]
    Ok,
    Fail,
}

/// One entry of a self-check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub subsystem_name: String,
    #[serde(default)]
    pub check_description: String,
    pub status: CheckStatus,
    #[serde(default)]
    pub friendly_message_to_user: String,
}

impl CheckResult {
    /// Creates a passing result.
    pub fn ok(subsystem: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            subsystem_name: subsystem.into(),
            check_description: description.into(),
            status: CheckStatus::Ok,
            friendly_message_to_user: String::new(),
        }
    }

    /// Creates a failing result with an operator-facing message.
    pub fn fail(
        subsystem: impl Into<String>,
        description: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            subsystem_name: subsystem.into(),
            check_description: description.into(),
            status: CheckStatus::Fail,
            friendly_message_to_user: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == CheckStatus::Ok
    }
}

/// Returns the first non-OK entry in received order.
///
/// An empty sequence has no failure.
pub fn first_failure(results: &[CheckResult]) -> Option<&CheckResult> {
    results.iter().find(|r| !r.is_ok())
}

/// Wire body of a self-check response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelfCheckResponse {
    #[serde(default)]
    pub results: Vec<CheckResult>,
}
