use crate::core::ProductModel;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "catalog")]
#[command(about = "Product catalog lookup with inventory and promotion enrichment")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "catalog.toml")]
    pub config: String,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: CatalogCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CatalogCommand {
    /// List products in a category
    Category {
        name: String,

        /// Use the blocking lookup (no enrichment calls)
        #[arg(long)]
        blocking: bool,
    },

    /// Look up a single product
    Product {
        id: i32,

        #[arg(long)]
        blocking: bool,
    },

    /// Add a new product
    Add {
        #[arg(long)]
        category: String,

        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, default_value = "")]
        img_url: String,

        #[arg(long)]
        price: f64,

        #[arg(long)]
        invalidate_cache: bool,
    },
}

impl CatalogCommand {
    /// 將 add 參數轉為待新增的商品模型
    pub fn to_new_product(&self) -> Option<(ProductModel, bool)> {
        match self {
            CatalogCommand::Add {
                category,
                name,
                description,
                img_url,
                price,
                invalidate_cache,
            } => Some((
                ProductModel {
                    category: category.clone(),
                    name: name.clone(),
                    description: description.clone(),
                    img_url: img_url.clone(),
                    price: *price,
                    ..Default::default()
                },
                *invalidate_cache,
            )),
            _ => None,
        }
    }
}
