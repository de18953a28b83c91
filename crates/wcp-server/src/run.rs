//! Server bootstrap (`§4.8` ambient stack, `§9` "global mutable state":
//! the persistence pool and LLM tier handles are process-wide, initialized
//! once at startup and torn down on shutdown — never re-initialized
//! in-line).

use std::sync::Arc;

use wcp_domain::config::{Config, McpTransportKind};
use wcp_kernel::Kernel;
use wcp_providers::{GenerationOptions, LlmRouter, OpenAiCompatBackend};
use wcp_scheduler::CycleEngine;
use wcp_sessions::SessionStore;

use crate::state::AppState;

/// Starts the WCP server: connects persistence, builds the Kernel/Session
/// Store/LLM Router, spawns the Agent Scheduler loop and the session GC
/// sweep, then serves the configured transport until the process is
/// signaled to stop.
pub async fn run_server(config: Arc<Config>) -> anyhow::Result<()> {
    tracing::info!("world control protocol server starting");

    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            wcp_domain::config::ConfigSeverity::Error => tracing::error!("{issue}"),
            wcp_domain::config::ConfigSeverity::Warning => tracing::warn!("{issue}"),
        }
    }
    if issues
        .iter()
        .any(|i| i.severity == wcp_domain::config::ConfigSeverity::Error)
    {
        anyhow::bail!("configuration has fatal errors, refusing to start");
    }

    let pool = wcp_persistence::connect(&config.database).await?;
    let kernel = Arc::new(Kernel::new(pool.clone()));
    let sessions = Arc::new(SessionStore::new(pool.clone(), config.session.ttl_hours));
    wcp_sessions::spawn_gc(sessions.clone(), config.session.gc_interval_secs);

    let router = Arc::new(build_router(&config));
    let scheduler = Arc::new(CycleEngine::new(kernel.clone(), router.clone(), config.scheduler.world_id));
    let (_scheduler_handle, _scheduler_stop) =
        wcp_scheduler::spawn_loop(scheduler.clone(), config.scheduler.cycle_interval_ms);

    let state = AppState {
        config: config.clone(),
        kernel,
        sessions,
        scheduler,
        router,
    };

    match config.mcp.transport {
        McpTransportKind::Stdio => crate::transport::stdio::serve(state).await?,
        McpTransportKind::Websocket => serve_websocket(state, config.mcp.port).await?,
    }

    Ok(())
}

async fn serve_websocket(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = crate::api::router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "wcp websocket transport listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(config: &Config) -> LlmRouter {
    let minor = config.llm.minor.clone();
    let story = config.llm.story.clone();
    let minor_factory: wcp_providers::BackendFactory = Arc::new(move || {
        Arc::new(OpenAiCompatBackend::new(minor.base_url.clone(), minor.model.clone()))
            as Arc<dyn wcp_providers::LlmBackend>
    });
    let story_factory: wcp_providers::BackendFactory = Arc::new(move || {
        Arc::new(OpenAiCompatBackend::new(story.base_url.clone(), story.model.clone()))
            as Arc<dyn wcp_providers::LlmBackend>
    });
    let defaults = GenerationOptions {
        temperature: config.llm.default_temperature,
        top_p: 1.0,
        max_tokens: config.llm.default_max_tokens,
        stop_strings: config.llm.default_stop_strings.clone(),
    };
    LlmRouter::new(minor_factory, story_factory, defaults)
}
