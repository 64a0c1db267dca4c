// digichecks-core/src/domain/check/verdict.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckResult {
    Pass,
    Fail,
}

impl CheckResult {
    pub fn from_conformance(conforms: bool) -> Self {
        if conforms { Self::Pass } else { Self::Fail }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "Pass",
            Self::Fail => "Fail",
        }
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of running one check. A `Fail` is a normal result, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub check_id: String,
    pub check_name: String,
    #[serde(rename = "check_result")]
    pub result: CheckResult,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

impl Verdict {
    pub fn new(
        check_id: impl Into<String>,
        check_name: impl Into<String>,
        conforms: bool,
        description: impl Into<String>,
    ) -> Self {
        Self {
            check_id: check_id.into(),
            check_name: check_name.into(),
            result: CheckResult::from_conformance(conforms),
            description: description.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn passed(&self) -> bool {
        self.result == CheckResult::Pass
    }
}
