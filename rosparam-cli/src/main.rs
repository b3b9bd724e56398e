use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rosparam_handler::{Builder, ParameterValue, Registry, ZenohRegistry, yaml};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use zenoh::Wait;

#[derive(Parser)]
#[command(name = "rosparam")]
#[command(about = "Inspect and edit a zenoh-hosted parameter registry")]
struct Cli {
    /// Zenoh endpoint to connect to, e.g. tcp/127.0.0.1:7447
    #[arg(long)]
    connect: Option<String>,

    /// Zenoh configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Key expression prefix the registry lives under
    #[arg(long, default_value = "rosparam")]
    prefix: String,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the value of a parameter
    Get { key: String },
    /// Set a parameter; the value is parsed as JSON, or taken as a string
    Set { key: String, value: String },
    /// Exit with status 1 if the parameter is not set
    Has { key: String },
    /// Delete a parameter and everything below it
    Delete { key: String },
    /// List the keys below a namespace
    List {
        #[arg(default_value = "/")]
        namespace: String,
    },
    /// Load a YAML parameter file below a namespace
    Load {
        file: PathBuf,
        #[arg(default_value = "/")]
        namespace: String,
    },
    /// Print a namespace as JSON
    Dump {
        #[arg(default_value = "/")]
        namespace: String,
    },
}

fn init_logger(debug: bool) {
    let filter = if debug {
        EnvFilter::new("rosparam_handler=debug,zenoh=info")
    } else {
        EnvFilter::new("rosparam_handler=info,zenoh=warn")
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

fn parse_value(raw: &str) -> ParameterValue {
    serde_json::from_str(raw).unwrap_or_else(|_| ParameterValue::String(raw.to_owned()))
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    init_logger(cli.debug);

    let mut config = match &cli.config {
        Some(path) => zenoh::Config::from_file(path)?,
        None => zenoh::Config::default(),
    };
    if let Some(endpoint) = &cli.connect {
        config.insert_json5("connect/endpoints", &format!("[\"{}\"]", endpoint))?;
    }
    let session = zenoh::open(config).wait()?;
    tracing::debug!(prefix = %cli.prefix, "Connected to Zenoh");

    let registry = ZenohRegistry::builder()
        .with_session(session)
        .with_key_prefix(cli.prefix.as_str())
        .build()?;

    match cli.command {
        Command::Get { key } => match registry.get(&key)? {
            Some(value) => println!("{}", value),
            None => {
                eprintln!("Parameter {} is not set", key);
                std::process::exit(1);
            }
        },
        Command::Set { key, value } => {
            registry.set(&key, parse_value(&value))?;
        }
        Command::Has { key } => {
            if !registry.has(&key)? {
                std::process::exit(1);
            }
        }
        Command::Delete { key } => {
            if !registry.delete(&key)? {
                tracing::warn!("Parameter {} was not set", key);
            }
        }
        Command::List { namespace } => {
            for key in registry.keys(&namespace)? {
                println!("{}", key);
            }
        }
        Command::Load { file, namespace } => {
            let count = yaml::load_file(&registry, &file, &namespace)?;
            tracing::info!("Loaded {} parameters into {}", count, namespace);
        }
        Command::Dump { namespace } => {
            let value = registry
                .get(&namespace)?
                .unwrap_or_else(|| ParameterValue::Map(Default::default()));
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(())
}
