use clap::Parser;

mod commands;

use docstore::{
    user_error, user_info,
    utils::{logger, prelude::*},
};

#[derive(Parser)]
#[command(name = "docstore-cli")]
#[command(about = "Outil opérateur du magasin documentaire JSON", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    args: commands::jsondb::JsondbArgs,
}

#[tokio::main]
async fn main() {
    // 1. Initialisation de la Configuration (CRITIQUE)
    let config = match AppConfig::init() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("❌ CRITICAL ERROR: Impossible d'initialiser la configuration.");
            eprintln!("   Détails : {}", e);
            std::process::exit(1);
        }
    };

    // 2. Initialisation du Logger
    logger::init_logging(config);

    user_info!("CLI_START", "v{}", env!("CARGO_PKG_VERSION"));

    // 3. Parsing & Dispatch
    let cli = Cli::parse();
    if let Err(e) = commands::jsondb::handle(cli.args).await {
        user_error!("CMD_FAIL", error = e);
        std::process::exit(1);
    }

    tracing::debug!("Fin de l'exécution du CLI");
}
