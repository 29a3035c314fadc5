use anyhow::Result;
use clap::Parser;
use jenkins_widget::cli::Cli;
use jenkins_widget::output;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting Jenkins widget");
    cli.execute().await?;

    Ok(())
}
