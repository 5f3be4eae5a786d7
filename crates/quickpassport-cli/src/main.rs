//! quickpassport CLI - crop portraits and lay them out on a printable A4 sheet

mod config;
mod loader;
mod logger;
mod pipeline;
mod remote;

use clap::Parser;
use config::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);

    match cli.command {
        Command::Sizes { json } => {
            if json {
                println!("{}", pipeline::size_json()?);
            } else {
                print!("{}", pipeline::size_table());
            }
        }
        Command::Compose(args) => {
            tracing::debug!(?args, "compose");
            let outcome = pipeline::compose(&args).await?;
            for path in &outcome.crop_paths {
                println!("Cropped photo: {}", path.display());
            }
            println!(
                "Sheet with {} photo(s), {}x{} px: {}",
                outcome.placed,
                outcome.export.width,
                outcome.export.height,
                outcome.sheet_path.display()
            );
        }
    }

    Ok(())
}
