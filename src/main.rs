use std::path::PathBuf;
use std::process::ExitCode;

use chrono::TimeDelta;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tokenkit::config::Configuration;
use tokenkit::{KeyPair, PayloadOptions, SymmetricKey, generate_id, telemetry};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file.
    #[arg(long, short, default_value = "config.yaml")]
    config: PathBuf,
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Generate key material for the configuration file.
    Keygen {
        /// Generate an Ed25519 key pair instead of a symmetric key.
        #[arg(long)]
        public: bool,
    },
    /// Issue a new token.
    Issue {
        /// Token identifier. A random UUID is used if omitted.
        #[arg(long)]
        id: Option<String>,
        /// Metadata entry, as `key=value`. Repeatable.
        #[arg(long = "meta", short, value_parser = parse_meta)]
        meta: Vec<(String, String)>,
        /// Validity in seconds.
        #[arg(long, short, default_value_t = 900, allow_negative_numbers = true)]
        duration: i64,
    },
    /// Verify a token and print its payload.
    Verify { token: String },
}

fn parse_meta(entry: &str) -> Result<(String, String), String> {
    entry
        .split_once('=')
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .ok_or_else(|| format!("invalid KEY=value: no `=` found in `{entry}`"))
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = || -> Result<_, Box<dyn std::error::Error>> {
        let config = Configuration::default().path(&args.config).read();
        let Some(token) = config.token else {
            return Err("missing `token` entry on configuration file".into());
        };
        Ok(token.build_service()?)
    };

    match args.cmd.clone() {
        Commands::Keygen { public: false } => {
            println!("symmetric_key: \"{}\"", SymmetricKey::generate().to_hex().as_str());
        },
        Commands::Keygen { public: true } => {
            let pair = KeyPair::generate();
            println!("public_key: \"{}\"", hex::encode(pair.public_bytes()));
            println!("private_key: \"{}\"", hex::encode(pair.private_bytes().as_slice()));
        },
        Commands::Issue { id, meta, duration } => {
            let service = config()?;
            let duration = TimeDelta::try_seconds(duration).ok_or("duration out of range")?;

            let mut options = PayloadOptions::new()
                .id(id.unwrap_or_else(generate_id))
                .duration(duration);
            for (key, value) in meta {
                options.set_metadata(key, Value::String(value));
            }

            println!("{}", service.create_token(options)?);
        },
        Commands::Verify { token } => {
            let payload = config()?.verify_token(token.trim())?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
        },
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    telemetry::setup_tracing(None);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        },
    }
}
