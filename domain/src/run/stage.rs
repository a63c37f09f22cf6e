use serde::{Deserialize, Serialize};

/// Stage of a council run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Stage 1 - every member answers the query
    Answer,
    /// Stage 2 - members rank each other's anonymized answers
    Review,
    /// Stage 3 - the chairman synthesizes a final answer
    Synthesis,
}

impl Stage {
    pub fn as_str(&self) -> &str {
        match self {
            Stage::Answer => "stage1",
            Stage::Review => "stage2",
            Stage::Synthesis => "stage3",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Stage::Answer => "Answers",
            Stage::Review => "Peer Review",
            Stage::Synthesis => "Synthesis",
        }
    }

    /// 1-based position in the pipeline
    pub fn number(&self) -> u8 {
        match self {
            Stage::Answer => 1,
            Stage::Review => 2,
            Stage::Synthesis => 3,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
