mod cmd;
mod watch_service;

#[macro_use]
extern crate log;

use addr_watch::AddrWatchConfig;
use clap::Parser;
use cmd::Cli;
use watch_service::WatchService;
use watch_util::LogConfig;

// Single thread of control: one poll, one sleep, one notification at a time
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let root_dir = cli
        .config_dir
        .clone()
        .unwrap_or_else(|| watch_util::get_service_dir(watch_util::ADDR_WATCH_SERVICE_NAME));

    let log_config = LogConfig::new(watch_util::ADDR_WATCH_SERVICE_NAME)
        .with_root_dir(root_dir.clone())
        .enable_file(cli.command.logs_to_file())
        .enable_console(cli.console);
    let _logger = match watch_util::init_log(log_config) {
        Ok(handle) => handle,
        Err(e) => {
            println!("Failed to init log: {}", e);
            std::process::exit(1);
        }
    };

    info!("Using service directory: {}", root_dir.display());

    let mut config = match AddrWatchConfig::load(&root_dir) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load config: {}", e);
            println!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    // Credentials are resolved once here and handed to the notifier explicitly
    config.fill_credentials_from(|name| std::env::var(name).ok());

    let service = WatchService::new(config);
    if let Err(e) = service.process_command(cli.command).await {
        error!("Error processing command: {}", e);
        println!("Error processing command: {}", e);
        std::process::exit(1);
    }
}
