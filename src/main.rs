//! Snowline CLI: incremental JSON-Lines file connector.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use snowline::{
    Config, PRIMARY_KEYS, REPLICATION_KEY, RecordBuilder, RecordSchema, RecordStream, State,
    init_tracing,
};

#[derive(Parser, Debug)]
#[command(version)]
struct CliArgs {
    /// Path to the YAML configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Path to a state file holding the starting watermark
    #[arg(short, long)]
    state: Option<PathBuf>,

    /// Print the derived record schema and exit
    #[arg(long)]
    discover: bool,
}

fn main() -> ExitCode {
    init_tracing();

    let args = CliArgs::parse();

    let config = match Config::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };

    if args.discover {
        // Discover mode needs only the config: the schema is derived from the
        // extraction rules, and no files are listed or read.
        if let Err(e) = RecordBuilder::from_config(&config.variables_to_extract) {
            eprintln!("Invalid extraction rules: {e}");
            return ExitCode::FAILURE;
        }
        let schema = RecordSchema::derive(&config.variables_to_extract);
        let catalog = serde_json::json!({
            "stream": config.entity,
            "key_properties": PRIMARY_KEYS,
            "replication_key": REPLICATION_KEY,
            "is_sorted": true,
            "schema": schema.to_json(),
        });
        println!("{catalog}");
        return ExitCode::SUCCESS;
    }

    let watermark = match &args.state {
        Some(path) => match State::from_file(path) {
            Ok(state) => state.starting_timestamp(&config.entity),
            Err(e) => {
                eprintln!("Failed to load state: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    let stream = match RecordStream::new(&config, watermark) {
        Ok(stream) => stream,
        Err(e) => {
            eprintln!("Failed to start sync: {e}");
            return ExitCode::FAILURE;
        }
    };

    let name = stream.name().to_string();
    info!(stream = %name, "Starting sync");

    let mut emitted = 0usize;
    for result in stream {
        match result {
            Ok(record) => {
                println!("{}", record.to_json());
                emitted += 1;
            }
            Err(e) => {
                eprintln!("Sync failed: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    info!(stream = %name, records = emitted, "Sync complete");
    ExitCode::SUCCESS
}
