pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tutorhub")]
#[command(about = "TutorHub CLI - migrations, seeding and maintenance jobs")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Seed reference or demo data")]
    Seed {
        #[command(subcommand)]
        cmd: commands::seed::SeedCommands,
    },

    #[command(about = "Reservation maintenance jobs")]
    Reservations {
        #[command(subcommand)]
        cmd: commands::reservations::ReservationCommands,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Migrate => commands::migrate::handle().await,
        Commands::Seed { cmd } => commands::seed::handle(cmd).await,
        Commands::Reservations { cmd } => commands::reservations::handle(cmd).await,
    }
}
