mod catalog;

use anyhow::bail;
use catalog::{Kind, Sample};
use clap::{Parser, Subcommand};
use quill_export::Format;
use quill_tools::EntityInspector;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "quill-cli", about = "CLI tool for quill entities")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the sample schemas
    Info,
    /// Run a sample entity through its lifecycle and show the result
    Demo {
        #[arg(value_enum)]
        entity: Kind,
    },
    /// Export a sample entity as json, csv or xml
    Export {
        #[arg(value_enum)]
        entity: Kind,
        #[arg(short, long, default_value = "json")]
        format: String,
        /// Include the version history (json, xml)
        #[arg(long)]
        history: bool,
    },
    /// Export a sample entity's journal as text, json or csv
    Journal {
        #[arg(value_enum)]
        entity: Kind,
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Print the version history of a sample entity
    History {
        #[arg(value_enum)]
        entity: Kind,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            println!("quill-cli v{}", env!("CARGO_PKG_VERSION"));
            for kind in Kind::ALL {
                let schema = kind.schema()?;
                let names: Vec<&str> = schema.attribute_names().collect();
                println!("{:<9} {}: {}", kind, schema.type_name(), names.join(", "));
            }
        }
        Commands::Demo { entity } => {
            let sample = Sample::scenario(entity)?;
            match sample.tracked() {
                Some(tracked) => {
                    println!("{}", EntityInspector::summary(tracked));
                    println!("{}", tracked.to_json(true));
                    print!("{}", EntityInspector::history_report(tracked.history()));
                }
                None => {
                    for (name, value) in EntityInspector::attributes(sample.entity()) {
                        println!("{name}: {value}");
                    }
                }
            }
            print!("{}", sample.export_journal("text")?);
        }
        Commands::Export {
            entity,
            format,
            history,
        } => {
            let format: Format = format.parse()?;
            let sample = Sample::scenario(entity)?;
            println!("{}", sample.export(format, history)?.trim_end());
        }
        Commands::Journal { entity, format } => {
            let sample = Sample::scenario(entity)?;
            println!("{}", sample.export_journal(&format)?.trim_end());
        }
        Commands::History { entity } => {
            let sample = Sample::scenario(entity)?;
            let Some(series) = sample.history() else {
                bail!("{entity} entities keep no history");
            };
            print!("{}", EntityInspector::history_report(series));
        }
    }

    Ok(())
}
