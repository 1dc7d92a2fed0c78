use std::sync::Arc;

use concierge::agent::{Agent, ConversationEngine};
use concierge::channels::{ChannelManager, CliChannel, chat_routes};
use concierge::config::AgentConfig;
use concierge::llm::{ModelConfig, create_model};
use concierge::store::{LibSqlStore, ThreadStore};
use concierge::tools::ToolRegistry;
use concierge::tools::builtin::{PushTool, SearchTool, WriteFileTool};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AgentConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export OPENAI_API_KEY=sk-...");
        std::process::exit(1);
    });

    eprintln!("🤵 {} v{}", config.name, env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.model);
    eprintln!("   Database: {}", config.db_path.display());
    eprintln!("   Thread: {}", config.cli_thread);

    // ── Model ───────────────────────────────────────────────────────────
    let llm = create_model(&ModelConfig {
        api_key: config.api_key.clone(),
        model: config.model.clone(),
        base_url: config.base_url.clone(),
    });

    // ── Store ───────────────────────────────────────────────────────────
    let store: Arc<dyn ThreadStore> = Arc::new(
        LibSqlStore::new_local(&config.db_path)
            .await
            .unwrap_or_else(|e| {
                eprintln!(
                    "Error: Failed to open database at {}: {}",
                    config.db_path.display(),
                    e
                );
                std::process::exit(1);
            }),
    );

    // ── Tools ───────────────────────────────────────────────────────────
    let mut tools = ToolRegistry::new();
    if let Some(key) = config.serper_api_key.clone() {
        tools.register(Arc::new(SearchTool::new(key)))?;
        eprintln!("   Search: enabled (Serper)");
    } else {
        eprintln!("   Search: disabled (set SERPER_API_KEY to enable)");
    }
    if let (Some(token), Some(user)) =
        (config.pushover_token.clone(), config.pushover_user.clone())
    {
        tools.register(Arc::new(PushTool::new(token, user)))?;
        eprintln!("   Push: enabled (Pushover)");
    } else {
        eprintln!("   Push: disabled (set PUSHOVER_TOKEN and PUSHOVER_USER to enable)");
    }
    if let Some(dir) = config.files_dir.clone() {
        eprintln!("   Files: enabled ({})", dir.display());
        tools.register(Arc::new(WriteFileTool::new(dir)))?;
    } else {
        eprintln!("   Files: disabled (set CONCIERGE_FILES_DIR to enable)");
    }
    if tools.is_empty() {
        eprintln!("   Tools: none registered, replies will be text-only");
    } else {
        eprintln!("   Tools: {} registered", tools.count());
    }

    // ── Engine ──────────────────────────────────────────────────────────
    let engine = Arc::new(ConversationEngine::new(
        llm,
        Arc::new(tools),
        store,
        config.engine.clone(),
    ));

    // ── HTTP frontend (optional) ────────────────────────────────────────
    if let Some(port) = config.http_port {
        let app = chat_routes(Arc::clone(&engine));
        eprintln!("   Chat API: http://0.0.0.0:{port}/api/chat");
        tokio::spawn(async move {
            let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
                .await
                .expect("Failed to bind chat API port");
            tracing::info!(port, "Chat API server started");
            axum::serve(listener, app).await.ok();
        });
    }

    // ── CLI frontend ────────────────────────────────────────────────────
    eprintln!("   Type a message and press Enter. exit to quit.\n");
    let mut channels = ChannelManager::new();
    channels.add(Box::new(CliChannel::new(&config.cli_thread)));

    let agent = Agent::new(engine, channels);
    agent.run().await?;

    Ok(())
}
