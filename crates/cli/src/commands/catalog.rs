//! `gamewise catalog` — Inspect the game catalog and retrieval.

use gamewise_agent::format_games_context;
use gamewise_config::AppConfig;

use super::ask::{build_retriever, load_catalog};

pub async fn run(query: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let Some(query) = query else {
        let catalog = load_catalog(&config)?;
        println!(
            "{} games in {}\n",
            catalog.len(),
            config.retrieval.catalog_path.display()
        );
        println!("{}", format_games_context(catalog.documents()));
        return Ok(());
    };

    let router = gamewise_providers::router::build_from_config(&config);
    let provider = router.default().ok_or("No default provider configured")?;
    let retriever = build_retriever(&config, provider).await?;

    let games = retriever.retrieve(&query).await?;
    println!(
        "Top {} games for {query:?} ({} retrieval):\n",
        config.retrieval.top_k,
        retriever.name()
    );
    println!("{}", format_games_context(&games));

    Ok(())
}
