//! HTTP API of the orchestrator
//!
//! ```text
//! GET    /health        live probe of every backend + heartbeat snapshot
//! GET    /heartbeat     heartbeat snapshot only
//! POST   /stage1        {query, options?}
//! POST   /stage2        {request_id, options?}
//! POST   /stage3        {request_id, options?}
//! GET    /runs?limit=N  recent runs
//! GET    /runs/{id}     full run view (durable fallback)
//! DELETE /runs/{id}
//! GET    /request/{id}  full run view (memory only)
//! ```

mod error;
mod handlers;
mod router;
mod state;

pub use error::{ApiError, ErrorBody};
pub use router::{ServerSettings, build_router};
pub use state::AppState;
