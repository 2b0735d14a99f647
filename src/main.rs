mod cli;
mod error;
mod fmt;
mod models;
mod prompt;
mod reports;
mod settings;
mod store;
mod transfer;

use std::sync::Once;

use clap::Parser;

use cli::{Cli, Commands};
use prompt::Draft;
use settings::load_settings;

static TRACING_INIT: Once = Once::new();

/// Log to stderr so report output on stdout stays clean. `RUST_LOG` overrides
/// the default of warnings only.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cashbook=warn"));
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    });
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let settings = load_settings().with_overrides(cli.data_dir.as_deref(), cli.backend);
    let config = settings.store_config();
    tracing::debug!(?config, "resolved store config");

    let result = match cli.command {
        Commands::Init => cli::init::run(&settings),
        Commands::Add {
            amount,
            direction,
            category,
            account,
            description,
            tags,
            date,
            id,
        } => cli::add::run(
            &config,
            Draft {
                id,
                amount,
                direction,
                category,
                account,
                description,
                tags,
                date,
            },
        ),
        Commands::List { limit } => cli::list::run(&config, limit),
        Commands::Balance => cli::report::balance(&config),
        Commands::Monthly { month } => cli::report::monthly(&config, month),
        Commands::Dashboard { months } => cli::report::dashboard(&config, months),
        Commands::Export { out } => cli::export::run(&config, &out),
        Commands::Migrate { from } => cli::migrate::run(&config, from),
        Commands::Status => cli::status::run(&settings),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
