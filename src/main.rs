use bookstack_monitor::{
    init_errors,
    init_logging,
    App,
    Cli,
};
use clap::Parser;
use color_eyre::Result;

#[tokio::main]
async fn main() -> Result<()> {
    init_errors()?;
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    App::new(cli).run().await
}
