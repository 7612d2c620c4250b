use clap::Parser;
use product_catalog::utils::{logger, validation::Validate};
use product_catalog::{build_catalog, CatalogCommand, CatalogError, CliConfig, TomlConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match TomlConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    logger::init_logger(
        logger::LogFormat::from_config(config.log_format()),
        config.log_level(),
        cli.verbose,
    );

    tracing::info!("Starting catalog '{}'", config.catalog.name);
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    match run(&config, cli.command).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ Catalog command failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());

            let exit_code = e.severity().exit_code();

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
            Ok(())
        }
    }
}

async fn run(config: &TomlConfig, command: CatalogCommand) -> Result<String, CatalogError> {
    let catalog = Arc::new(build_catalog(config)?);

    let output = match command {
        CatalogCommand::Category { name, blocking: false } => {
            let products = catalog.get_products_for_category(&name).await?;
            serde_json::to_string_pretty(&products)?
        }
        CatalogCommand::Category { name, blocking: true } => {
            let products = spawn_blocking_lookup(move || {
                catalog.get_products_for_category_blocking(&name)
            })
            .await?;
            serde_json::to_string_pretty(&products)?
        }
        CatalogCommand::Product { id, blocking } => {
            let product = if blocking {
                spawn_blocking_lookup(move || catalog.get_product_by_id_blocking(id)).await?
            } else {
                catalog.get_product_by_id(id).await?
            };
            match product {
                Some(product) => serde_json::to_string_pretty(&product)?,
                None => {
                    tracing::warn!("Product {} not found", id);
                    "null".to_string()
                }
            }
        }
        add @ CatalogCommand::Add { .. } => {
            let (product, invalidate_cache) = add
                .to_new_product()
                .ok_or_else(|| CatalogError::ValidationError {
                    message: "add command without product fields".to_string(),
                })?;
            product.validate()?;
            let added = catalog.add_new_product(product, invalidate_cache).await?;
            tracing::info!("✅ Added product {}", added.id);
            serde_json::to_string_pretty(&added)?
        }
    };

    Ok(output)
}

/// 同步查詢放到 blocking 執行緒，避免卡住 runtime
async fn spawn_blocking_lookup<T, F>(lookup: F) -> Result<T, CatalogError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, CatalogError> + Send + 'static,
{
    tokio::task::spawn_blocking(lookup)
        .await
        .map_err(|e| CatalogError::storage(format!("blocking lookup panicked: {}", e)))?
}
