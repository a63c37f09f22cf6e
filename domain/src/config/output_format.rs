//! Output format value object

use serde::{Deserialize, Serialize};

/// How a finished run is printed by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Every stage: answers, reviews, ranking and synthesis
    Full,
    /// Only the chairman's final answer (default)
    #[default]
    Final,
    /// The run view as JSON
    Json,
}
