//! Command-line interface implementation for folio.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments structure for folio.
#[derive(Parser, Debug)]
#[command(author, version, about = "folio: portfolio site generator and publisher", long_about = None)]
pub struct Args {
    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a portfolio project from a template and user data
    Generate {
        /// Path to the template directory or git repository URL
        #[arg(value_name = "TEMPLATE")]
        template: String,

        /// Directory where the generated project will be created
        #[arg(value_name = "OUTPUT_DIR")]
        output_dir: PathBuf,

        /// User data file (JSON or YAML), or `-` to read stdin
        #[arg(short, long, value_name = "FILE")]
        data: PathBuf,

        /// Force overwrite of existing output directory
        #[arg(short, long)]
        force: bool,

        /// Replace an existing clone of a git template without asking.
        #[arg(long)]
        skip_overwrite_check: bool,
    },

    /// Run a generated project locally until interrupted
    Run {
        /// Generated project directory
        #[arg(value_name = "PROJECT_DIR")]
        project_dir: PathBuf,

        /// Port the server listens on
        #[arg(short, long)]
        port: Option<u16>,

        /// Start the development server instead of a production preview
        #[arg(long)]
        dev: bool,
    },

    /// Publish a generated project to GitHub Pages
    Deploy {
        /// Generated project directory
        #[arg(value_name = "PROJECT_DIR")]
        project_dir: PathBuf,

        /// User data file (JSON or YAML), or `-` to read stdin
        #[arg(short, long, value_name = "FILE")]
        data: PathBuf,

        /// Repository name, overriding the configured one
        #[arg(long)]
        repository: Option<String>,

        /// Branch to push and serve from
        #[arg(long)]
        branch: Option<String>,

        /// Create a private repository
        #[arg(long)]
        private: bool,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument
                || e.kind() == ErrorKind::MissingSubcommand
            {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
