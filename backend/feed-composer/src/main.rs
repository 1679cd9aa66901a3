/// Compose a festival feed layout from a JSON array of event records
///
/// Usage:
/// ```bash
/// cargo run --bin feed-composer -- [OPTIONS] [FILE]
/// ```
///
/// Reads the records from FILE (or stdin) and prints
/// `{ "placements": [...], "stats": {...} }` to stdout.
use anyhow::{Context, Result};
use chrono::Utc;
use feed_composer::config::LogFormat;
use feed_composer::services::estimate_columns;
use feed_composer::{CategoryFilter, CompositionRequest, Config, SortStrategy, TypeFilter};
use serde_json::Value;
use std::io::Read;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Default)]
struct CliArgs {
    type_selector: Option<String>,
    category_selector: Option<String>,
    sort_selector: Option<String>,
    columns: Option<u32>,
    viewport_width: Option<u32>,
    input: Option<String>,
    help: bool,
}

fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.log_format);

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_args(&argv)?;
    if args.help {
        print_help();
        return Ok(());
    }

    let payload = read_payload(args.input.as_deref())?;

    let columns = resolve_columns(&args, &config);

    let sort = args
        .sort_selector
        .as_deref()
        .map(|s| SortStrategy::parse_or(s, config.default_sort))
        .unwrap_or(config.default_sort);

    let request = CompositionRequest::new(columns, Utc::now())
        .with_type_filter(TypeFilter::from_selector(
            args.type_selector.as_deref().unwrap_or("all"),
        ))
        .with_category_filter(CategoryFilter::parse_lenient(
            args.category_selector.as_deref().unwrap_or("all"),
        ))
        .with_sort(sort);

    info!(columns = columns, sort = %sort, "Composing feed");

    let composition = config.composer().compose_value(&payload, &request);

    let rendered =
        serde_json::to_string_pretty(&composition).context("Failed to serialize composition")?;
    println!("{}", rendered);

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

/// `None` or `-` reads stdin. Unparsable JSON is an error; a parsed
/// non-array payload is left to the pipeline, which treats it as empty.
fn read_payload(path: Option<&str>) -> Result<Value> {
    let raw = match path {
        None | Some("-") => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            buffer
        }
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file {}", path))?,
    };

    if raw.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&raw).context("Input is not valid JSON")
}

/// Explicit `--columns` wins over `--width`, which wins over the configured default
fn resolve_columns(args: &CliArgs, config: &Config) -> u32 {
    match (args.columns, args.viewport_width) {
        (Some(columns), _) => columns,
        (None, Some(width)) => estimate_columns(width, config.min_column_width, config.column_gap),
        (None, None) => config.default_columns,
    }
}

/// Parse the arguments after the program name
fn parse_args(argv: &[String]) -> Result<CliArgs> {
    let mut args = CliArgs::default();

    let mut i = 0;
    while i < argv.len() {
        match argv[i].as_str() {
            "--type" => {
                args.type_selector = Some(option_value(&argv, i)?.to_string());
                i += 2;
            }
            "--category" => {
                args.category_selector = Some(option_value(&argv, i)?.to_string());
                i += 2;
            }
            "--sort" => {
                args.sort_selector = Some(option_value(&argv, i)?.to_string());
                i += 2;
            }
            "--columns" => {
                args.columns = Some(
                    option_value(&argv, i)?
                        .parse()
                        .context("Invalid column count")?,
                );
                i += 2;
            }
            "--width" => {
                args.viewport_width = Some(
                    option_value(&argv, i)?
                        .parse()
                        .context("Invalid viewport width")?,
                );
                i += 2;
            }
            "--help" | "-h" => {
                args.help = true;
                i += 1;
            }
            other if other.starts_with("--") => {
                anyhow::bail!("Unknown argument: {}", other);
            }
            path => {
                if args.input.is_some() {
                    anyhow::bail!("Only one input file may be given");
                }
                args.input = Some(path.to_string());
                i += 1;
            }
        }
    }

    Ok(args)
}

fn option_value(argv: &[String], i: usize) -> Result<&str> {
    argv.get(i + 1)
        .map(String::as_str)
        .with_context(|| format!("{} requires a value", argv[i]))
}

fn print_help() {
    println!("Festival feed composer");
    println!();
    println!("Usage: feed-composer [OPTIONS] [FILE]");
    println!();
    println!("Options:");
    println!("  --type <TYPE>          Event type filter (default: all)");
    println!("  --category <CATEGORY>  party | talk | workshop | showroom | networking | other | all");
    println!("  --sort <STRATEGY>      chronological | trending | most-rsvps | most-buzz | category");
    println!("  --columns <N>          Grid column count");
    println!("  --width <PX>           Viewport width, used to estimate columns when --columns is absent");
    println!("  -h, --help             Show this help");
    println!();
    println!("Environment: FEED_* variables (see Config), RUST_LOG for log level");
}
