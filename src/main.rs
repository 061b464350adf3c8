use clap::Parser;

use pipetask::config::ClassRef;
use pipetask::connections::ConnectionKind;
use pipetask::declarations::{self, Catalog};
use pipetask::logging;
use pipetask::pipeline::{is_pipeline_ordered, order_pipeline};

/// Pipetask - inspect task config classes derived from their connections
#[derive(Parser)]
#[command(name = "pipetask")]
#[command(author = "Keith Bugeja <keith.bugeja@um.edu.mt>")]
#[command(version = "0.1.0")]
#[command(about = "Pipetask: connection-driven configuration for pipeline tasks")]
#[command(long_about = "
Reads connections classes, config classes and tasks from a TOML
declarations file. Every config class deriving from PipelineTaskConfig
gets a nested `connections` config with one overridable name per
connection of its connections class.")]
struct Cli {
    /// Declarations file path
    #[arg(short, long, default_value = "./config/declarations.toml")]
    declarations: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// List declared classes
    #[arg(short = 'L', long)]
    list: bool,

    /// Print the schema of a declared config class as JSON
    #[arg(short = 'D', long, value_name = "CLASS")]
    describe: Option<String>,

    /// Print the tasks in data dependency order
    #[arg(short, long)]
    order: bool,
}

fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialise logging
    logging::init_logging(&cli.log_level);

    if let Err(e) = run(&cli) {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    // Load and validate the declarations file
    let declarations = declarations::load_declarations(&cli.declarations)?;

    if let Err(e) = declarations::validate_declarations(&declarations) {
        anyhow::bail!("Declarations error: {e}");
    }
    tracing::info!("Declarations loaded and validated successfully.");

    // Declare every class, synthesizing connections configs
    let catalog = Catalog::from_declarations(&declarations)?;

    if cli.list {
        println!("Declared classes:");
        for (name, class) in catalog.classes() {
            match class {
                ClassRef::Config(config) => match config.connections_class() {
                    Some(spec) => println!("  - {name} (config, connections: {})", spec.name()),
                    None => println!("  - {name} (config)"),
                },
                ClassRef::Connections(spec) => {
                    match spec.base() {
                        Some(base) => println!("  - {name} (connections, extends {})", base.name()),
                        None => println!("  - {name} (connections)"),
                    }
                    for kind in ConnectionKind::ALL {
                        let fields = spec.connections_of(kind);
                        if !fields.is_empty() {
                            println!("      {kind}: {}", fields.join(", "));
                        }
                    }
                }
            }
        }
    }

    if let Some(name) = &cli.describe {
        let class = catalog.config_class(name)?;
        println!("{}", serde_json::to_string_pretty(&class.describe())?);
    }

    if cli.order {
        // Order tasks so that every producer runs before its consumers
        let pipeline = catalog.pipeline()?;
        if !is_pipeline_ordered(&pipeline)? {
            tracing::info!("Declared task order does not satisfy data dependencies, reordering");
        }

        for (idx, task) in order_pipeline(pipeline)?.iter().enumerate() {
            let connections = task.connections()?;
            println!(
                "{idx}: {} [{}] inputs={:?} outputs={:?}",
                task.display_name(),
                task.task_name,
                connections.inputs(),
                connections.outputs()
            );
        }
    }

    Ok(())
}
