use crate::estimate::{run_estimate, EstimateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use estate_ai::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Estate AI",
    about = "Serve the listing portal API or estimate sale prices from the command line",
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
    /// Estimate a sale price for one listing or every row of a CSV export
    Estimate(EstimateArgs),
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
        Command::Estimate(args) => run_estimate(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["estate-ai-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn estimate_accepts_attribute_flags() {
        let cli = Cli::try_parse_from([
            "estate-ai-api",
            "estimate",
            "--area",
            "7420",
            "--bedrooms",
            "4",
            "--mainroad",
            "Yes",
            "--furnishing",
            "furnished",
        ])
        .expect("parses");

        let Some(Command::Estimate(args)) = cli.command else {
            panic!("expected estimate command");
        };
        let attributes = args.listing.into_attributes();
        assert_eq!(attributes.area, Some(7420));
        assert_eq!(attributes.bedrooms, Some(4));
        assert_eq!(attributes.furnishingstatus.as_deref(), Some("furnished"));
        assert_eq!(
            attributes.flag(estate_ai::pricing::FlagField::Mainroad),
            1
        );
    }

    #[test]
    fn csv_conflicts_with_attribute_flags() {
        let result = Cli::try_parse_from([
            "estate-ai-api",
            "estimate",
            "--csv",
            "Housing.csv",
            "--area",
            "7420",
        ]);
        assert!(result.is_err());
    }
}
