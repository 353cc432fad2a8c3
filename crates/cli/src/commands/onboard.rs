//! `gamewise onboard` — First-time setup.

use gamewise_config::AppConfig;
use gamewise_retrieval::GameCatalog;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("Gamewise — First-Time Setup");
    println!("===========================\n");

    // Create directories
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    // Create config file
    if config_path.exists() {
        println!("⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
    }

    // Seed the catalog where the (possibly edited) config expects it
    let config = AppConfig::load_from(&config_path)?;
    let catalog_path = &config.retrieval.catalog_path;
    if catalog_path.exists() {
        println!("  Game catalog exists: {}", catalog_path.display());
    } else {
        let catalog = GameCatalog::sample();
        catalog.save(catalog_path)?;
        println!(
            "✅ Created sample catalog with {} games at: {}",
            catalog.len(),
            catalog_path.display()
        );
    }

    println!("\n📝 Next steps:");
    println!("   1. Start Ollama and pull a model: ollama pull {}", config.default_model);
    println!("      (or set default_provider and api_key in {})", config_path.display());
    println!("   2. Add your own games to {}", catalog_path.display());
    println!("   3. Run: gamewise ask\n");

    Ok(())
}
