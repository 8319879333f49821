use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use vitrine::config::{Config, DEFAULT_PAGE_LIMIT};
use vitrine::store::SortOption;
use vitrine::Storefront;

#[derive(Parser, Debug)]
#[command(name = "vitrine")]
#[command(about = "Headless client for a remote product catalog")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/vitrine/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Full-text search (server-side; takes priority over --category)
  #[arg(short, long)]
  search: Option<String>,

  /// Category filter
  #[arg(short = 'C', long)]
  category: Option<String>,

  /// Client-side sort: name, price-asc or price-desc
  #[arg(long, default_value = "name")]
  sort: String,

  /// Page size
  #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
  limit: u32,

  /// Page offset
  #[arg(long, default_value_t = 0)]
  skip: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();
  let config = Config::load(args.config.as_deref())?;
  let sort = parse_sort(&args.sort)?;

  let storefront = Storefront::from_config(&config)?.with_page_limit(args.limit);
  if let Some(search) = args.search {
    storefront.ui().set_search(search);
  }
  storefront.ui().set_category(args.category);
  storefront.ui().set_sort(sort);

  let mut handle = storefront.products_page(args.skip);
  let snapshot = handle.settled().await;

  if let Some(err) = snapshot.error() {
    return Err(eyre!("failed to load products: {}", err));
  }
  let page = snapshot
    .data
    .ok_or_else(|| eyre!("no payload for {}", handle.key().description()))?;

  let views = storefront.visible_products(&page);
  if views.is_empty() {
    println!("No products found.");
    return Ok(());
  }

  for view in &views {
    let marker = if view.is_favorite { "*" } else { " " };
    println!(
      "{:>6} {} {:<48} {:>9.2}  {}",
      view.product.id, marker, view.product.title, view.product.price, view.product.category
    );
  }
  println!(
    "\n{} of {} products ({})",
    views.len(),
    page.total,
    handle.key().description()
  );

  Ok(())
}

fn parse_sort(value: &str) -> Result<SortOption> {
  match value {
    "name" => Ok(SortOption::NameAsc),
    "price-asc" => Ok(SortOption::PriceAsc),
    "price-desc" => Ok(SortOption::PriceDesc),
    other => Err(eyre!(
      "unknown sort '{}', expected name, price-asc or price-desc",
      other
    )),
  }
}
