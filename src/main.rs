mod cli;

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

use flixdeck::catalog::{MediaType, Title};
use flixdeck::{catalog_from_config, Catalog, Config, Row};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "flixdeck=trace,flixdeck_fetch=trace,flixdeck_core=debug".to_string()
        } else {
            "flixdeck=info,flixdeck_fetch=warn,flixdeck_core=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let json = cli.json;
    match cli.command {
        Commands::Rows { rows } => {
            let catalog = load_catalog(cli.config.as_deref())?;
            let rows = if rows.is_empty() { Row::ALL.to_vec() } else { rows };
            block_on(show_rows(&catalog, &rows, json))
        }
        Commands::Trailer { id, tv } => {
            let catalog = load_catalog(cli.config.as_deref())?;
            let media_type = if tv { MediaType::Tv } else { MediaType::Movie };
            block_on(show_trailer(&catalog, media_type, id, json))
        }
        Commands::Search { query } => {
            let catalog = load_catalog(cli.config.as_deref())?;
            block_on(show_search(&catalog, &query, json))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("flixdeck {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn block_on<F: std::future::Future<Output = Result<()>>>(fut: F) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(fut)
}

fn load_catalog(config_path: Option<&Path>) -> Result<Catalog> {
    let config = Config::load_or_default(config_path);
    Ok(catalog_from_config(&config)?)
}

async fn show_rows(catalog: &Catalog, rows: &[Row], json: bool) -> Result<()> {
    let fetched = catalog.rows(rows).await;

    if json {
        let out: Vec<_> = fetched
            .iter()
            .map(|(row, titles)| {
                serde_json::json!({
                    "row": row.slug(),
                    "title": row.title(),
                    "results": titles,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for (row, titles) in &fetched {
        println!("== {} ==", row.title());
        if titles.is_empty() {
            println!("  (nothing to show)");
        }
        for title in titles {
            println!("  {}", describe(title));
        }
        println!();
    }
    Ok(())
}

async fn show_trailer(catalog: &Catalog, media_type: MediaType, id: u64, json: bool) -> Result<()> {
    let details = catalog.details(media_type, id).await?;
    let trailer = details.trailer();

    if json {
        let out = serde_json::json!({
            "id": details.id,
            "title": details.display_title(),
            "genres": details.genres,
            "trailer": trailer,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if !details.genres.is_empty() {
        println!("Genres: {}", details.genre_names());
    }
    match trailer {
        Some(video) => {
            let name = video.name.as_deref().unwrap_or("Trailer");
            match video.youtube_url() {
                Some(url) => println!("{name}: {url}"),
                None => println!("{name}: {} ({})", video.key, video.site.as_deref().unwrap_or("unknown site")),
            }
        }
        None => println!("Trailer not available"),
    }
    Ok(())
}

async fn show_search(catalog: &Catalog, query: &str, json: bool) -> Result<()> {
    let results = catalog.search(query).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results found.");
    }
    for title in &results {
        println!("{}", describe(title));
    }
    Ok(())
}

fn describe(title: &Title) -> String {
    let kind = match title.resolved_media_type() {
        MediaType::Tv => "tv",
        MediaType::Movie => "movie",
        MediaType::Person => "person",
        MediaType::Other => "other",
    };
    match title.year() {
        Some(year) => format!("{} ({year}) [{kind} {}]", title.display_title(), title.id),
        None => format!("{} [{kind} {}]", title.display_title(), title.id),
    }
}

fn validate_config(config_path: Option<&Path>) -> Result<()> {
    let config = match config_path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
            Config::from_json(&contents)?
        }
        None => Config::default(),
    }
    .with_env();

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("Configuration is valid");
    } else {
        println!("Configuration has {} warning(s):", warnings.len());
        for warning in &warnings {
            println!("  - {warning}");
        }
    }
    Ok(())
}
