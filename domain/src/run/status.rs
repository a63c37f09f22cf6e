//! Run state machine
//!
//! ```text
//! created ─▶ stage1_done ─▶ stage2_done ─▶ stage3_done
//!    │            │   ▲          │   ▲
//!    ▼            ▼   │          ▼   │
//! stage1_error  stage2_error   stage3_error
//! ```
//!
//! Error states end one attempt, not the run: a later stage may be
//! triggered again as long as its inputs exist. Nothing advances on its
//! own; every transition is the result of an externally triggered stage.

use super::stage::Stage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    Created,
    Stage1Done,
    Stage1Error,
    Stage2Done,
    Stage2Error,
    Stage3Done,
    Stage3Error,
}

impl RunStatus {
    /// Status after `stage` finished, successfully or not
    pub fn after(stage: Stage, succeeded: bool) -> Self {
        match (stage, succeeded) {
            (Stage::Answer, true) => RunStatus::Stage1Done,
            (Stage::Answer, false) => RunStatus::Stage1Error,
            (Stage::Review, true) => RunStatus::Stage2Done,
            (Stage::Review, false) => RunStatus::Stage2Error,
            (Stage::Synthesis, true) => RunStatus::Stage3Done,
            (Stage::Synthesis, false) => RunStatus::Stage3Error,
        }
    }

    /// The stage whose outcome this status records, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            RunStatus::Created => None,
            RunStatus::Stage1Done | RunStatus::Stage1Error => Some(Stage::Answer),
            RunStatus::Stage2Done | RunStatus::Stage2Error => Some(Stage::Review),
            RunStatus::Stage3Done | RunStatus::Stage3Error => Some(Stage::Synthesis),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            RunStatus::Stage1Error | RunStatus::Stage2Error | RunStatus::Stage3Error
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Created => "created",
            RunStatus::Stage1Done => "stage1_done",
            RunStatus::Stage1Error => "stage1_error",
            RunStatus::Stage2Done => "stage2_done",
            RunStatus::Stage2Error => "stage2_error",
            RunStatus::Stage3Done => "stage3_done",
            RunStatus::Stage3Error => "stage3_error",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_after_roundtrips_through_stage() {
        for stage in [Stage::Answer, Stage::Review, Stage::Synthesis] {
            for succeeded in [true, false] {
                let status = RunStatus::after(stage, succeeded);
                assert_eq!(status.stage(), Some(stage));
                assert_eq!(status.is_error(), !succeeded);
            }
        }
        assert_eq!(RunStatus::Created.stage(), None);
    }

    #[test]
    fn test_serializes_snake_case() {
        let json = serde_json::to_string(&RunStatus::Stage2Error).unwrap();
        assert_eq!(json, "\"stage2_error\"");
        assert_eq!(RunStatus::Stage2Error.to_string(), "stage2_error");
    }
}
