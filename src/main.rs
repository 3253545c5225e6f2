use anyhow::{bail, Result};
use clap::Parser;
use itertools::Itertools;
use tracing::info;
use tracing_subscriber::EnvFilter;

use nearby::{Address, Category, Nominatim, Overpass, SearchParams, SearchResult, Searcher};

#[derive(Debug, Parser)]
#[command(about = "Find the nearest amenities around an address")]
struct Cli {
    /// Free-text origin address
    #[arg(long, conflicts_with_all = ["street", "number", "zip", "city"])]
    address: Option<String>,

    /// Structured origin: street name
    #[arg(long)]
    street: Option<String>,
    /// Structured origin: house number
    #[arg(long)]
    number: Option<String>,
    /// Structured origin: ZIP code
    #[arg(long)]
    zip: Option<String>,
    /// Structured origin: city
    #[arg(long)]
    city: Option<String>,

    /// Comparison address; its straight-line distance from the origin is reported
    #[arg(long)]
    compare: Option<String>,

    /// Search radius in meters
    #[arg(long, default_value_t = 3000, value_parser = clap::value_parser!(u32).range(500..=20000))]
    radius: u32,

    /// Category to search for (repeatable)
    #[arg(long = "category", value_enum, default_values_t = [Category::Supermarket])]
    categories: Vec<Category>,

    /// Emit the full result as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn origin_address(cli: &Cli) -> Result<Address> {
    if let Some(text) = &cli.address {
        return Ok(Address::Free(text.clone()));
    }

    match (&cli.street, &cli.number, &cli.zip, &cli.city) {
        (Some(street), Some(number), Some(zip), Some(city)) => Ok(Address::Structured {
            street: street.clone(),
            number: number.clone(),
            zip: zip.clone(),
            city: city.clone(),
        }),
        _ => bail!("pass --address, or all of --street --number --zip --city"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let params = SearchParams {
        origin: origin_address(&cli)?,
        comparison: cli.compare.clone().map(Address::Free),
        radius_m: f64::from(cli.radius),
        // repeated --category flags collapse to one query each
        categories: cli.categories.iter().copied().unique().collect(),
    };
    info!(
        categories = %params.categories.iter().join(", "),
        radius = cli.radius,
        "searching"
    );

    let searcher = Searcher::new(Nominatim::new(), Overpass::new());
    let result = searcher.search(&params)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_result(&result);
    Ok(())
}

fn print_result(result: &SearchResult) {
    println!("origin: {}", result.origin.display_name);

    for per_category in &result.categories {
        println!();
        println!("{}:", per_category.category);
        if per_category.nearest.is_empty() {
            println!("  (nothing found within the search radius)");
        }
        for ranked in &per_category.nearest {
            println!("  {} — {:.1} meters away", ranked.poi.name, ranked.distance_m);
        }
    }

    if let Some(comparison) = &result.comparison {
        println!();
        println!(
            "{} is {:.1} meters away (straight line)",
            comparison.location.display_name, comparison.distance_m
        );
    }

    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }
}
