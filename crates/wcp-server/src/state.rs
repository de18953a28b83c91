//! Shared server state (`§4.4`, `§4.5`). Wires the Kernel, Session Store,
//! LLM Router, and (optionally) a running Agent Scheduler behind cheap
//! `Arc` clones, mirroring the teacher's `gateway::state::AppState` shape.

use std::sync::Arc;

use wcp_domain::config::Config;
use wcp_kernel::Kernel;
use wcp_providers::LlmRouter;
use wcp_scheduler::CycleEngine;
use wcp_sessions::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub kernel: Arc<Kernel>,
    pub sessions: Arc<SessionStore>,
    pub scheduler: Arc<CycleEngine>,
    pub router: Arc<LlmRouter>,
}
