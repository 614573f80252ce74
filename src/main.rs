use std::fmt::Display;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use cocoon_range::{MemoryStore, QueryConfig, RangeQuery, Record, Result, SortOrder};

/// Query the reference store for every record in a timestamp range
#[derive(Parser)]
#[command(name = "cocoon-range", version)]
struct Cli {
    /// Start of the range, 1 to 14 digits of YYYYMMDDhhmmss
    start: Option<String>,

    /// End of the range, 1 to 14 digits of YYYYMMDDhhmmss
    end: Option<String>,

    /// Path to a JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Issue lookups concurrently
    #[arg(long)]
    parallel: bool,

    /// Result order: ascending (asc) or descending (desc)
    #[arg(long, value_name = "ORDER")]
    sort: Option<SortOrder>,

    /// Print the plan and counts as JSON instead of samples
    #[arg(long)]
    json: bool,

    /// Enable debug logging (honours RUST_LOG)
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn init_tracing(cli: &Cli) {
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into())
    } else {
        tracing_subscriber::EnvFilter::new("off")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            if let Some(hint) = err.suggestion() {
                eprintln!("hint: {}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match cli.config.as_deref() {
        Some(path) => QueryConfig::from_json_file(path)?,
        None => QueryConfig::default(),
    };
    if cli.parallel {
        config = config.with_parallel_lookups(true);
    }
    if let Some(order) = cli.sort {
        config = config.with_sort_order(order);
    }

    let query = RangeQuery::new(config)?;
    let start = cli.start.unwrap_or_else(|| query.config().default_start.clone());
    let end = cli.end.unwrap_or_else(|| query.config().default_end.clone());

    let store = MemoryStore::reference();
    let plan = query.plan(&start, &end)?;
    let outcome = query.execute(&plan, &store);

    if cli.json {
        let report = serde_json::json!({
            "plan": plan,
            "call_count": outcome.call_count,
            "record_count": outcome.len(),
            "metrics": query.metrics().snapshot(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let sample = query.config().sample_size;

    println!("Date range: {} - {}", start, end);
    println!(
        "Total # of calls made: {}. Found {} documents.",
        outcome.call_count,
        outcome.len()
    );

    println!("\nDocuments:");
    print_sample(&outcome.records, sample, |record: &Record| format!("DocumentDate: {}", record.key()));

    println!("\nPrefixes:");
    print_sample(&plan.prefixes, sample, |prefix: &String| prefix.clone());

    Ok(())
}

/// Print the first and last `sample` items, numbered from 1
fn print_sample<T, D: Display>(items: &[T], sample: usize, render: impl Fn(&T) -> D) {
    let total = items.len();

    for (index, item) in items.iter().enumerate() {
        let position = index + 1;

        if position <= sample || position + sample > total {
            println!("\t{}\t{}", position, render(item));
        }

        if position == sample && total > 2 * sample {
            println!("\t...\t...");
        }
    }
}
