use std::io::{self, Read};

use clap::{Parser as ClapParser, Subcommand};
use mpath::{
    Config, Engine,
    cli::{self, CheckOptions, CheckResult, CliError, ValidateOptions},
    output::set_quote_decimals,
};

#[derive(ClapParser)]
#[command(name = "mpath")]
#[command(about = "mpath - typed path queries over JSON-like data, with schema validation")]
#[command(version)]
struct Cli {
    /// Serialize decimal numbers as JSON strings
    #[arg(long, global = true)]
    quote_decimals: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a query against JSON input
    Eval {
        /// The mpath query to execute
        query: String,

        /// JSON input bound to `@` (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// JSON document bound to `$` (defaults to the input)
        #[arg(short, long)]
        root: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Validate a query against a schema and print typeahead metadata
    Validate {
        /// The mpath query to validate
        query: String,

        /// Schema document, inline JSON or a file path
        #[arg(short, long)]
        schema: String,

        /// Schema key the query feeds
        #[arg(short, long)]
        target: String,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// List the field chains a query reads
    Deps {
        /// The mpath query to inspect
        query: String,
    },

    /// Only validate syntax and print the canonical query
    Check {
        /// The mpath query to check
        query: String,
    },
}

fn main() {
    let cli = Cli::parse();
    let config = Config::from_env();

    if let Err(e) = cli::init_tracing(&config.log_level) {
        eprintln!("{e}");
        std::process::exit(2);
    }
    set_quote_decimals(cli.quote_decimals || config.quote_decimals);

    let engine = Engine::new(config);
    if let Err(e) = run(&engine, cli.command) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run(engine: &Engine, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Eval {
            query,
            input,
            root,
            pretty,
        } => {
            let options = CheckOptions {
                query,
                input: read_input(input)?,
                root,
                pretty,
                syntax_only: false,
            };
            if let CheckResult::Success(output) = cli::execute_check(engine, &options)? {
                println!("{output}");
            }
        }
        Commands::Validate {
            query,
            schema,
            target,
            pretty,
        } => {
            let options = ValidateOptions {
                query,
                schema: cli::load_schema(&schema)?,
                target,
                pretty,
            };
            println!("{}", cli::execute_validate(engine, &options)?);
        }
        Commands::Deps { query } => {
            for chain in cli::execute_deps(engine, &query)? {
                println!("{chain}");
            }
        }
        Commands::Check { query } => {
            let options = CheckOptions {
                query,
                syntax_only: true,
                ..CheckOptions::default()
            };
            if let CheckResult::SyntaxValid(canonical) = cli::execute_check(engine, &options)? {
                println!("Syntax is valid: {canonical}");
            }
        }
    }
    Ok(())
}

fn read_input(input: Option<String>) -> Result<Option<String>, CliError> {
    match input {
        Some(s) => Ok(Some(s)),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(Some(buffer))
        }
        None => Ok(None),
    }
}
