use crate::demo::{run_demo, run_leaderboard, DemoArgs, LeaderboardArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use road_watch::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Road Watch",
    about = "Run and demonstrate the Road Watch hazard reporting service",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print a deterministic, seeded leaderboard as a table or CSV
    Leaderboard(LeaderboardArgs),
    /// Run a scripted report, vote, and reputation scenario in memory
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Leaderboard(args) => run_leaderboard(args),
        Command::Demo(args) => run_demo(args),
    }
}
