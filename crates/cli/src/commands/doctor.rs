//! `gamewise doctor` — Diagnose configuration, catalog and provider.

use gamewise_config::{AppConfig, RetrievalMode};
use gamewise_retrieval::GameCatalog;

use super::ask::model_for;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("Gamewise Doctor — System Diagnostics");
    println!("====================================\n");

    let mut issues = 0;

    // Check config
    let config_path = AppConfig::config_dir().join("config.toml");
    if !config_path.exists() {
        println!("  ⚠️  No config file — using defaults (run `gamewise onboard`)");
        issues += 1;
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config file invalid: {e}");
            println!("\n  ⚠️  Fix the config before running further checks.");
            return Ok(());
        }
    };

    // Check catalog
    let catalog_path = &config.retrieval.catalog_path;
    match GameCatalog::load(catalog_path) {
        Ok(catalog) if catalog.is_empty() => {
            println!("  ⚠️  Game catalog is empty: {}", catalog_path.display());
            issues += 1;
        }
        Ok(catalog) => println!("  ✅ Game catalog: {} games", catalog.len()),
        Err(e) => {
            println!("  ❌ {e} — run `gamewise onboard`");
            issues += 1;
        }
    }

    // Check prompt template
    if let Some(path) = &config.agent.prompt_template {
        match gamewise_agent::PromptTemplate::from_file(path) {
            Ok(_) => println!("  ✅ Prompt template: {}", path.display()),
            Err(e) => {
                println!("  ❌ {e}");
                issues += 1;
            }
        }
    }

    // Check provider
    let router = gamewise_providers::router::build_from_config(&config);
    match router.default() {
        Some(provider) => match provider.health_check().await {
            Ok(true) => println!(
                "  ✅ Provider '{}' reachable (model: {})",
                provider.name(),
                model_for(&config)
            ),
            Ok(false) => {
                println!("  ⚠️  Provider '{}' responded but reports unhealthy", provider.name());
                issues += 1;
            }
            Err(e) => {
                println!("  ❌ Provider '{}' unreachable: {e}", provider.name());
                issues += 1;
            }
        },
        None => {
            println!("  ❌ No default provider configured");
            issues += 1;
        }
    }

    if config.retrieval.mode == RetrievalMode::Embedding {
        println!(
            "  ℹ️  Embedding retrieval with model '{}'",
            config.retrieval.embedding_model
        );
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
