//! `gamewise ask` — single-question or interactive mode.

use std::sync::Arc;
use gamewise_agent::{AgentLoop, LoopPolicy, PromptTemplate};
use gamewise_config::{AppConfig, RetrievalMode};
use gamewise_core::catalog::Retriever;
use gamewise_core::event::{DomainEvent, EventBus};
use gamewise_core::provider::Provider;
use gamewise_retrieval::{EmbeddingRetriever, GameCatalog, KeywordRetriever};
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(
    message: Option<String>,
    max_loops: Option<u32>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let router = gamewise_providers::router::build_from_config(&config);
    let provider = router.default().ok_or("No default provider configured")?;

    let event_bus = Arc::new(EventBus::default());
    if verbose {
        spawn_progress_printer(&event_bus);
    }

    let agent = build_agent(&config, provider, event_bus).await?;
    let max_loops = max_loops.unwrap_or(agent.policy().max_loops);

    if let Some(question) = message {
        // Single question mode
        let answer = agent.ask_with_budget(&question, max_loops).await?;
        println!("{answer}");
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  Gamewise — ask James about video games");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", model_for(&config));
    println!("  Catalog:   {}", config.retrieval.catalog_path.display());
    println!();
    println!("  Type your question and press Enter.");
    println!("  Type 'exit' or 'quit' to leave.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("  You > ");
        use std::io::Write;
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question, "exit" | "quit") {
            break;
        }

        // Each question is answered independently; nothing carries over.
        match agent.ask_with_budget(question, max_loops).await {
            Ok(answer) => {
                println!();
                for line in answer.lines() {
                    println!("  James > {line}");
                }
                println!();
            }
            Err(e) => {
                eprintln!("  [Error] {e}");
                println!();
            }
        }
    }

    println!();
    println!("  Goodbye!");
    println!();

    Ok(())
}

/// The model configured for the default provider.
pub fn model_for(config: &AppConfig) -> String {
    config
        .providers
        .get(&config.default_provider)
        .and_then(|p| p.default_model.clone())
        .unwrap_or_else(|| config.default_model.clone())
}

/// Assemble the agent loop from configuration.
pub async fn build_agent(
    config: &AppConfig,
    provider: Arc<dyn Provider>,
    event_bus: Arc<EventBus>,
) -> Result<AgentLoop, Box<dyn std::error::Error>> {
    let retriever = build_retriever(config, provider.clone()).await?;
    let tools = Arc::new(gamewise_tools::default_registry(&config.tools));

    let mut agent = AgentLoop::new(provider, model_for(config), retriever, tools, event_bus)
        .with_temperature(config.default_temperature)
        .with_max_tokens(config.default_max_tokens)
        .with_policy(LoopPolicy::from(&config.agent));

    if let Some(path) = &config.agent.prompt_template {
        agent = agent.with_prompt_template(PromptTemplate::from_file(path)?);
    }

    Ok(agent)
}

/// Load the catalog, pointing at `onboard` when it is missing.
pub fn load_catalog(config: &AppConfig) -> Result<GameCatalog, Box<dyn std::error::Error>> {
    let path = &config.retrieval.catalog_path;
    if !path.exists() {
        return Err(format!(
            "No game catalog at {} — run `gamewise onboard` first",
            path.display()
        )
        .into());
    }
    Ok(GameCatalog::load(path)?)
}

pub async fn build_retriever(
    config: &AppConfig,
    provider: Arc<dyn Provider>,
) -> Result<Arc<dyn Retriever>, Box<dyn std::error::Error>> {
    let catalog = load_catalog(config)?;
    let top_k = config.retrieval.top_k;

    let retriever: Arc<dyn Retriever> = match config.retrieval.mode {
        RetrievalMode::Keyword => Arc::new(KeywordRetriever::new(catalog, top_k)),
        RetrievalMode::Embedding => Arc::new(
            EmbeddingRetriever::build(provider, &config.retrieval.embedding_model, &catalog, top_k)
                .await?,
        ),
    };
    Ok(retriever)
}

/// Print loop progress to stderr as events arrive.
fn spawn_progress_printer(event_bus: &EventBus) {
    let mut rx = event_bus.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            match event.as_ref() {
                DomainEvent::ModelResponded {
                    iteration,
                    response_preview,
                    ..
                } => eprintln!("\n[Loop {iteration}] Model response:\n{response_preview}\n"),
                DomainEvent::ToolExecuted {
                    tool_name,
                    arguments,
                    success,
                    duration_ms,
                    ..
                } => eprintln!(
                    "[Calling tool: {tool_name} with args: {arguments}] ({}, {duration_ms}ms)",
                    if *success { "ok" } else { "failed" }
                ),
                DomainEvent::ParseFailed { failures, .. } => {
                    eprintln!("[Parsing error #{failures}]")
                }
                DomainEvent::AnswerProduced {
                    iterations,
                    termination,
                    ..
                } => eprintln!("[Answered after {iterations} call(s): {termination}]"),
            }
        }
    });
}
