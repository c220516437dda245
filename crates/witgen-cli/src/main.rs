//! witgen CLI - JSON Schema to WIT generator
//!
//! Commands:
//! - `witgen <INPUT>` - Generate a WIT document from a JSON Schema file (`-` for stdin)
//! - `witgen methods <INPUT>` - Print the protocol methods found in a schema

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use witgen::{GenerateError, RecursionPolicy};

mod generate;
mod logging;
mod methods;

#[derive(Parser)]
#[command(name = "witgen")]
#[command(author, version, about = "Generate WIT interfaces from JSON Schema", long_about = None)]
#[command(subcommand_negates_reqs = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    generate: GenerateArgs,

    /// Log debug output to stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the protocol methods found in a schema
    Methods {
        /// Path to the JSON Schema document (`-` reads stdin)
        input: String,
    },
}

/// Arguments of the default generate command
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Path to the JSON Schema document (`-` reads stdin)
    #[arg(required = true)]
    pub input: Option<String>,

    /// Write the WIT document here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Package declaration, e.g. mcp:protocol@0.1.0
    #[arg(short, long)]
    pub package: Option<String>,

    /// TOML file with generator options; flags override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Do not emit doc comments
    #[arg(long)]
    pub no_docs: bool,

    /// Maximum doc comment width
    #[arg(long)]
    pub doc_width: Option<usize>,

    /// How recursive types are handled (json-string or reject)
    #[arg(long)]
    pub recursion: Option<RecursionPolicy>,

    /// Reuse inline types with identical bodies
    #[arg(long)]
    pub dedupe_inline_types: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let result = match cli.command {
        Some(Commands::Methods { input }) => methods::run(&input),
        None => generate::run(&cli.generate),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = err
                .downcast_ref::<GenerateError>()
                .map_or(1, GenerateError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}
