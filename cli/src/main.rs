use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use dtogen::{load_schema, GeneratorConfig, Variant};
use dtogen_compiler::error::DtoGenError;
use dtogen_compiler::expand::{expand, LayerKind};
use dtogen_compiler::loader::{resolve_type, DeclaredNames};
use dtogen_compiler::parser::parse_type_expr;

#[derive(Parser)]
#[command(name = "dtogen")]
#[command(about = "Validate DTO schemas and generate their client and server implementations", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and verify a schema descriptor without generating code
    Check {
        /// Input schema descriptor (JSON)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Generate the Rust implementation of one variant
    Gen {
        /// Input schema descriptor (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// `client` or `server`
        #[arg(long, default_value = "client")]
        variant: Variant,

        /// Output `.rs` file (if omitted, prints to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON table of interfaces implemented outside the generated module
        #[arg(long)]
        overrides: Option<PathBuf>,

        /// Wrap the output in `pub mod <MODULE>` (defaults to the schema package)
        #[arg(short, long)]
        module: Option<String>,

        /// Header comment replacing the default one
        #[arg(long)]
        header: Option<String>,
    },

    /// Print the container layers of a type expression such as `Map<List<int>>`
    Expand {
        /// The type expression
        #[arg(short = 't', long = "type")]
        type_expr: String,

        /// Schema whose enums and interfaces the expression may name
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

fn main() -> Result<(), DtoGenError> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check { input } => {
            let schema = load_schema(&input)?;
            println!(
                "{} is valid: {} interfaces, {} enums",
                input.display(),
                schema.interfaces.len(),
                schema.enums.len()
            );
            Ok(())
        }

        Commands::Gen { input, variant, output, overrides, module, header } => {
            let mut config = GeneratorConfig::new();
            if let Some(path) = overrides {
                config.load_overrides(path)?;
            }
            if let Some(name) = module {
                config.set_module_name(name);
            }
            if let Some(text) = header {
                config.set_header(text);
            }

            let generated = dtogen::compile_file(&input, variant, &config)?;
            if let Some(out_path) = output {
                generated.write_to_file(&out_path)?;
                println!(
                    "Generated {} {} implementations into {}",
                    generated.implementations.len(),
                    variant,
                    out_path.display()
                );
            } else {
                print!("{}", generated.source);
            }
            Ok(())
        }

        Commands::Expand { type_expr, input } => {
            let names = match input {
                Some(path) => DeclaredNames::of_schema(&load_schema(path)?),
                None => DeclaredNames::default(),
            };
            let expr = parse_type_expr(&type_expr)?;
            let ty = resolve_type(&expr, &names, 0).map_err(|err| err.at("<command line>", &type_expr))?;

            let expansion = expand(&ty);
            for (depth, layer) in expansion.layers().iter().enumerate() {
                let kind = match expansion.kind(depth) {
                    LayerKind::List => "list",
                    LayerKind::Map => "map",
                    LayerKind::Terminal => "terminal",
                };
                println!("{}: {} ({})", depth, layer, kind);
            }
            Ok(())
        }
    }
}
