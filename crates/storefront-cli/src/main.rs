mod catalog;
mod render;

use clap::{Args, CommandFactory, Parser, Subcommand};
use storefront_client::{OrderBy, ProductFilters, ProductQuery, SortOrder};
use tracing_subscriber::EnvFilter;

use crate::catalog::Catalog;

#[derive(Debug, Parser)]
#[command(name = "storefront-cli")]
#[command(about = "Browse the storefront catalog from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the category tree
    Categories,
    /// List one page of products
    Products(ProductArgs),
    /// Show a single product by slug or id
    Product { slug: String },
    /// List all brands
    Brands,
    /// Show a brand and a page of its products
    Brand {
        slug: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show a category and a page of its products
    Category {
        slug: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
}

#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
struct ProductArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,
    /// Defaults to `STOREFRONT_DEFAULT_PER_PAGE`
    #[arg(long)]
    per_page: Option<u32>,
    /// Category id
    #[arg(long)]
    category: Option<i64>,
    #[arg(long)]
    search: Option<String>,
    /// date, id, include, title, slug, price, popularity, rating or menu_order
    #[arg(long)]
    order_by: Option<OrderBy>,
    /// asc or desc
    #[arg(long)]
    order: Option<SortOrder>,
    #[arg(long)]
    on_sale: bool,
    #[arg(long)]
    featured: bool,
    /// Brand id
    #[arg(long)]
    brand: Option<i64>,
    /// Comma-separated product ids
    #[arg(long, value_delimiter = ',')]
    include: Vec<i64>,
}

impl ProductArgs {
    fn into_query(self, default_per_page: u32) -> ProductQuery {
        ProductQuery::new(self.page, self.per_page.unwrap_or(default_per_page)).with_filters(
            ProductFilters {
                category: self.category,
                search: self.search,
                order_by: self.order_by,
                order: self.order,
                on_sale: self.on_sale.then_some(true),
                featured: self.featured.then_some(true),
                include_ids: self.include,
                brand: self.brand,
            },
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = storefront_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let catalog = Catalog::from_config(&config)?;
    let output = run(&catalog, command).await?;
    print!("{output}");
    Ok(())
}

async fn run(catalog: &Catalog, command: Commands) -> anyhow::Result<String> {
    match command {
        Commands::Categories => catalog.categories().await,
        Commands::Products(args) => {
            catalog
                .products(args.into_query(catalog.default_per_page()))
                .await
        }
        Commands::Product { slug } => catalog.product(&slug).await,
        Commands::Brands => catalog.brands().await,
        Commands::Brand { slug, page } => catalog.brand(&slug, page).await,
        Commands::Category { slug, page } => catalog.category(&slug, page).await,
    }
}
