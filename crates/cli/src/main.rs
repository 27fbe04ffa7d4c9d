use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use ups_core::config::dismiss_prefix_from_env_value;
use ups_core::{CoreConfig, DismissOutcome, FilePropertyStore, NoticeKey, NoticeService, UserUuid};

#[derive(Parser)]
#[command(name = "ups")]
#[command(about = "UPS user property service CLI")]
struct Cli {
    /// Property data directory (defaults to PROPERTY_DATA_DIR, then "property_data")
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List recognised notice keys
    Notices,
    /// Dismiss a notice for a user
    Dismiss {
        /// User identifier
        user: UserUuid,
        /// Notice key
        notice: NoticeKey,
    },
    /// Check whether a user has dismissed one notice
    Status {
        /// User identifier
        user: UserUuid,
        /// Notice key
        notice: NoticeKey,
    },
    /// Show which notices a user has dismissed
    Dismissed {
        /// User identifier
        user: UserUuid,
    },
}

fn notice_service(
    data_dir: Option<PathBuf>,
) -> Result<NoticeService, Box<dyn std::error::Error>> {
    let data_dir = data_dir.unwrap_or_else(|| {
        std::env::var("PROPERTY_DATA_DIR")
            .unwrap_or_else(|_| ups_core::DEFAULT_PROPERTY_DATA_DIR.into())
            .into()
    });
    let prefix = dismiss_prefix_from_env_value(std::env::var("UPS_DISMISS_PREFIX").ok());

    let cfg = Arc::new(CoreConfig::new(data_dir, prefix)?);
    let store = Arc::new(FilePropertyStore::new(&cfg)?);
    Ok(NoticeService::new(cfg, store))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Notices) => {
            for notice in NoticeKey::ALL {
                println!("{}", notice);
            }
        }
        Some(Commands::Dismiss { user, notice }) => {
            let service = notice_service(cli.data_dir)?;
            match service.dismiss(&user, notice) {
                Ok(DismissOutcome::Dismissed) => println!("Dismissed {} for {}", notice, user),
                Ok(DismissOutcome::AlreadyDismissed) => {
                    println!("{} was already dismissed for {}", notice, user)
                }
                Err(e) => eprintln!("Error dismissing notice: {}", e),
            }
        }
        Some(Commands::Status { user, notice }) => {
            let service = notice_service(cli.data_dir)?;
            match service.is_dismissed(&user, notice) {
                Ok(true) => println!("{} is dismissed for {}", notice, user),
                Ok(false) => println!("{} is not dismissed for {}", notice, user),
                Err(e) => eprintln!("Error reading notice status: {}", e),
            }
        }
        Some(Commands::Dismissed { user }) => {
            let service = notice_service(cli.data_dir)?;
            match service.dismissed_notices(&user) {
                Ok(state) => {
                    for (notice, dismissed) in state {
                        println!("{}: {}", notice, if dismissed { "dismissed" } else { "-" });
                    }
                }
                Err(e) => eprintln!("Error reading dismissed notices: {}", e),
            }
        }
        None => {
            println!("Use 'ups --help' for commands");
        }
    }

    Ok(())
}
