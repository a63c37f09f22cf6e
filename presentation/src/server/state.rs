//! Shared handler state

use council_application::{CheckHealthUseCase, RunCouncilUseCase};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub council: Arc<RunCouncilUseCase>,
    pub health: Arc<CheckHealthUseCase>,
}

impl AppState {
    pub fn new(council: Arc<RunCouncilUseCase>, health: Arc<CheckHealthUseCase>) -> Self {
        Self { council, health }
    }
}
