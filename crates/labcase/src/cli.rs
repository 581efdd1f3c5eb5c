use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::cmd::{
    self, payment::PaymentArgs, schema::SchemaArgs, submit::SubmitArgs, validate::ValidateArgs,
};
use crate::logging;

#[derive(Parser, Debug)]
#[command(
    name = "labcase",
    about = "Validate and submit dental lab cases",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Log at debug level, ignoring RUST_LOG
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check case answers and print the field errors as JSON
    Validate(ValidateArgs),
    /// Walk the wizard with the given answers and files, then submit
    Submit(SubmitArgs),
    /// Check an online payment form
    Payment(PaymentArgs),
    /// Print a JSON Schema
    Schema(SchemaArgs),
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match cli.command {
        Commands::Validate(args) => cmd::validate::run(&args),
        Commands::Submit(args) => cmd::submit::run(args),
        Commands::Payment(args) => cmd::payment::run(&args),
        Commands::Schema(args) => cmd::schema::run(&args),
    }
}
