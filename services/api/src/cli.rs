use crate::demo::{
    run_demo, run_permission_resolution, run_simulation, DemoArgs, ResolveArgs, SimulateArgs,
};
use crate::server;
use backoffice::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Restaurant Back-Office",
    about = "Run the loyalty and staff permission service, or exercise it from the command line",
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
    /// Loyalty accrual tools
    Loyalty {
        #[command(subcommand)]
        command: LoyaltyCommand,
    },
    /// Staff permission tools
    Permissions {
        #[command(subcommand)]
        command: PermissionsCommand,
    },
    /// Walk a customer through a season of visits and resolve a few staff roles
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum LoyaltyCommand {
    /// Replay a list of visit amounts against a fresh customer
    Simulate(SimulateArgs),
}

#[derive(Subcommand, Debug)]
enum PermissionsCommand {
    /// Show the capability set granted to an employee
    Resolve(ResolveArgs),
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
        Command::Loyalty {
            command: LoyaltyCommand::Simulate(args),
        } => run_simulation(args),
        Command::Permissions {
            command: PermissionsCommand::Resolve(args),
        } => run_permission_resolution(args),
        Command::Demo(args) => run_demo(args),
    }
}
