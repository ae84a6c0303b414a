use std::{fs, path::PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing::{debug, info};

use price_estimator::{
    config::AppConfig,
    domain::{
        parsing::parse_price, recent_sales, search, Catalogs, ComparableRecord, ComparableView,
        DatasetSnapshot, DatasetStore, EstimateQuery, QueryInput, SearchFilter,
    },
    estimate,
    infra::{load_catalogs, load_dataset},
    ui::{render_catalog, render_estimate, render_records},
    util::persistence::{load_settings, save_settings, settings_file},
};

#[derive(Debug, Parser)]
#[command(
    name = "price-estimator",
    version,
    about = "Estimate residential property prices from comparable sales"
)]
pub struct Cli {
    /// Comparable-sales file (.csv or .json)
    #[arg(long, global = true)]
    pub dataset: Option<PathBuf>,
    /// JSON file replacing the built-in quality and feature catalogs
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Price a property against comparable sales
    Estimate(EstimateArgs),
    /// Most recent sales in a suburb
    Recent {
        #[arg(long)]
        suburb: String,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Filter the dataset like the listings search
    Search(SearchArgs),
    /// List quality sections, levels and features
    Catalog {
        #[arg(long)]
        json: bool,
    },
    /// Show or change persisted settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    Show,
    SetDataset { path: PathBuf },
}

#[derive(Debug, Args)]
pub struct EstimateArgs {
    /// Read the query from a JSON file instead of flags
    #[arg(long, conflicts_with_all = ["suburb", "bedrooms", "bathrooms", "parking", "land", "age"])]
    pub query: Option<PathBuf>,
    #[arg(long)]
    pub suburb: Option<String>,
    #[arg(long)]
    pub bedrooms: Option<String>,
    #[arg(long)]
    pub bathrooms: Option<String>,
    #[arg(long)]
    pub parking: Option<String>,
    /// Land size, e.g. "702 m2"
    #[arg(long)]
    pub land: Option<String>,
    /// Building age in years
    #[arg(long)]
    pub age: Option<String>,
    /// Section rating as section=level, repeatable
    #[arg(long = "quality", value_parser = parse_rating)]
    pub quality: Vec<(String, String)>,
    /// Feature identifier, repeatable
    #[arg(long = "feature")]
    pub features: Vec<String>,
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    #[arg(long)]
    pub suburb: Option<String>,
    #[arg(long)]
    pub min_bedrooms: Option<u32>,
    #[arg(long)]
    pub min_bathrooms: Option<u32>,
    #[arg(long)]
    pub min_parking: Option<u32>,
    /// Lower price bound, e.g. "600k"
    #[arg(long)]
    pub price_min: Option<String>,
    /// Upper price bound, e.g. "1.2m"
    #[arg(long)]
    pub price_max: Option<String>,
    /// Property type substring, e.g. "house"
    #[arg(long = "type")]
    pub property_type: Option<String>,
    /// Selling office, matched exactly
    #[arg(long)]
    pub office: Option<String>,
    #[arg(long)]
    pub json: bool,
}

fn parse_rating(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((section, level)) if !section.trim().is_empty() && !level.trim().is_empty() => {
            Ok((section.trim().to_string(), level.trim().to_string()))
        }
        _ => Err(format!("expected section=level, got {raw:?}")),
    }
}

pub fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command {
        Command::Estimate(args) => run_estimate(args, &config),
        Command::Recent {
            suburb,
            limit,
            json,
        } => {
            let store = open_store(&config)?;
            let snapshot = store.current();
            let limit = limit.unwrap_or(config.recent_limit);
            let sales = recent_sales(&snapshot, &suburb, limit);
            if sales.is_empty() {
                debug!(known = ?snapshot.suburbs(), "no sales recorded for {suburb}");
            }
            print_records(&format!("Recent sales in {suburb}"), &sales, json)
        }
        Command::Search(args) => {
            let store = open_store(&config)?;
            let snapshot = store.current();
            let filter = SearchFilter {
                suburb: args.suburb,
                min_bedrooms: args.min_bedrooms,
                min_bathrooms: args.min_bathrooms,
                min_parking: args.min_parking,
                price_min: args.price_min.as_deref().and_then(parse_price),
                price_max: args.price_max.as_deref().and_then(parse_price),
                property_type: args.property_type,
                office: args.office,
            };
            debug!(?filter, "searching dataset");
            let found = search(&snapshot, &filter);
            print_records("Search results", &found, args.json)
        }
        Command::Catalog { json } => {
            let catalogs = open_catalogs(&config)?;
            if json {
                let body = json!({
                    "sections": catalogs.sections(),
                    "quality_levels": catalogs.levels(),
                    "features": catalogs.features(),
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                print!("{}", render_catalog(&catalogs));
            }
            Ok(())
        }
        Command::Config { action } => run_config(action, &config),
    }
}

fn run_estimate(args: EstimateArgs, config: &AppConfig) -> anyhow::Result<()> {
    let input = match &args.query {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read query file {}", path.display()))?;
            serde_json::from_str::<QueryInput>(&content)
                .with_context(|| format!("failed to parse query file {}", path.display()))?
        }
        None => QueryInput {
            suburb: args.suburb,
            bedrooms: args.bedrooms,
            bathrooms: args.bathrooms,
            parking: args.parking,
            land_size: args.land,
            building_age: args.age,
            quality: args.quality.into_iter().collect(),
            features: args.features,
        },
    };
    let query = EstimateQuery::from_input(input, config.require_suburb)?;

    let store = open_store(config)?;
    let catalogs = open_catalogs(config)?;
    let snapshot = store.current();
    let result = estimate(&query, &snapshot, &catalogs);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_estimate(&query.suburb, &result));
    }
    Ok(())
}

fn run_config(action: ConfigAction, config: &AppConfig) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let location = settings_file()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "unavailable".to_string());
            let body = json!({
                "settings_file": location,
                "dataset_path": config.dataset_path,
                "catalog_path": config.catalog_path,
                "require_suburb": config.require_suburb,
                "recent_limit": config.recent_limit,
                "log_level": config.log_level,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(())
        }
        ConfigAction::SetDataset { path } => {
            let path = fs::canonicalize(&path)
                .with_context(|| format!("dataset {} does not exist", path.display()))?;
            // Validate before persisting.
            load_dataset(&path)?;
            let mut settings = load_settings();
            settings.dataset_path = Some(path.clone());
            let saved_to = save_settings(&settings)?;
            info!(dataset = %path.display(), settings = %saved_to.display(), "saved dataset path");
            println!("Dataset set to {}", path.display());
            Ok(())
        }
    }
}

fn open_store(config: &AppConfig) -> anyhow::Result<DatasetStore> {
    let Some(path) = &config.dataset_path else {
        bail!("no dataset configured; pass --dataset or run `price-estimator config set-dataset <path>`");
    };
    let snapshot: DatasetSnapshot = load_dataset(path)
        .with_context(|| format!("failed to load dataset {}", path.display()))?;
    Ok(DatasetStore::new(snapshot))
}

fn open_catalogs(config: &AppConfig) -> anyhow::Result<Catalogs> {
    match &config.catalog_path {
        Some(path) => load_catalogs(path)
            .with_context(|| format!("failed to load catalog file {}", path.display())),
        None => Ok(Catalogs::default()),
    }
}

fn print_records(title: &str, records: &[&ComparableRecord], json: bool) -> anyhow::Result<()> {
    if json {
        let views: Vec<ComparableView> = records.iter().map(|record| record.to_view()).collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
    } else {
        print!("{}", render_records(title, records));
    }
    Ok(())
}
