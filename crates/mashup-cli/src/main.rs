mod args;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use args::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let filter = match cli.verbose {
        0 => "mashup=info,mashup_core=info",
        1 => "mashup=debug,mashup_core=debug",
        2 => "mashup=trace,mashup_core=trace",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    // Handle commands
    match cli.command {
        Some(Commands::Create { args }) => {
            commands::create::run(&args, cli.config.as_deref()).await
        }
        Some(Commands::Doctor) => commands::doctor::run().await,
        Some(Commands::Config) => commands::config::run(cli.config.as_deref()).await,
        None => {
            // Bare positional arguments are shorthand for `create`
            match (cli.singer, cli.n_videos, cli.trim_duration, cli.output) {
                (Some(singer), Some(n_videos), Some(trim_duration), Some(output)) => {
                    let args = args::CreateArgs {
                        singer,
                        n_videos,
                        trim_duration,
                        output,
                        keep_workspace: cli.keep_workspace,
                    };
                    commands::create::run(&args, cli.config.as_deref()).await
                }
                (None, None, None, None) => {
                    // No arguments at all, print help
                    use clap::CommandFactory;
                    Cli::command().print_help()?;
                    println!();
                    Ok(())
                }
                _ => {
                    use clap::CommandFactory;
                    let mut cmd = Cli::command();
                    cmd.error(
                        clap::error::ErrorKind::MissingRequiredArgument,
                        "expected <SINGER> <N_VIDEOS> <TRIM_DURATION> <OUTPUT>",
                    )
                    .exit()
                }
            }
        }
    }
}
