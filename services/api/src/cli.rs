use crate::demo::{run_demo, run_jobs, DemoArgs, JobsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use kiosk_careers::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Kiosk Careers",
    about = "Serve and explore the careers job board from the command line",
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
    /// Print the job board, optionally filtered
    Jobs(JobsArgs),
    /// Walk one application from selection to submission
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
        Command::Jobs(args) => run_jobs(args),
        Command::Demo(args) => run_demo(args).await,
    }
}
