use anyhow::Context;
use clap::{Parser, Subcommand};
use ezbook_authz::{Identity, SessionAuth};
use ezbook_kernel::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "ezbook-cli", about = "Operator commands for EZ Booking")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load and validate settings, then print them with secrets redacted
    CheckConfig,
    /// Sign a session token for an email, as `POST /jwt` would
    IssueToken {
        #[arg(long)]
        email: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().context("failed to load EZ Booking settings")?;
    ezbook_telemetry::try_init(&settings.telemetry);

    match cli.command {
        Command::CheckConfig => {
            tracing::debug!(env = ?settings.environment, "configuration loaded");
            println!("{:#?}", settings);
        }
        Command::IssueToken { email } => {
            let auth = SessionAuth::from_settings(&settings);
            let token = auth
                .tokens()
                .issue(&Identity { email })
                .context("failed to sign session token")?;
            println!("{}", token);
        }
    }

    Ok(())
}
