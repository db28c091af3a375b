use anyhow::Context;
use bookshelf_app::{app, shutdown_signal, App};
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bookshelf")]
#[command(about = "Book catalogue service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Print the effective settings and exit
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            bookshelf_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "bookshelf serve starting");

            App::bootstrap(settings)
                .await?
                .serve(shutdown_signal())
                .await?;
        }
        Commands::Migrate => {
            bookshelf_telemetry::init(&settings.telemetry)?;

            let applied = app::migrate(&settings).await?;
            println!("applied {applied} migration(s)");
        }
        Commands::Config => {
            println!("{settings:#?}");
        }
    }

    Ok(())
}
