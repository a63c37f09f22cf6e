//! Council run domain
//!
//! A run is created by stage 1 and mutated only by whole-state replacement
//! at the end of each later stage.

pub mod stage;
pub mod state;
pub mod status;

pub use stage::Stage;
pub use state::{
    AnswerOutcome, AnswerRecord, RequestState, ReviewOutcome, ReviewRecord, RunSummary,
    Stage1State, Stage2State, Stage3State, SynthesisOutcome, SynthesisRecord,
};
pub use status::RunStatus;
