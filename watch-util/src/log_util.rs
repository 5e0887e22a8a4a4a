use super::dirs::get_service_dir;
use flexi_logger::{
    Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming, detailed_format,
};
use std::path::PathBuf;

const DEFAULT_LOG_LEVEL: &str = "info";

pub struct LogConfig {
    pub service_name: String,
    pub log_dir: Option<PathBuf>,
    pub file: bool,
    pub console: bool,
}

impl LogConfig {
    pub fn new(service_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            log_dir: None,
            file: true,
            console: false,
        }
    }

    // Logs go to {dir}/logs instead of the default service dir
    pub fn with_root_dir(mut self, dir: PathBuf) -> Self {
        self.log_dir = Some(dir.join("logs"));
        self
    }

    pub fn enable_file(mut self, enable: bool) -> Self {
        self.file = enable;
        self
    }

    pub fn enable_console(mut self, enable: bool) -> Self {
        self.console = enable;
        self
    }

    pub fn log_dir(&self) -> PathBuf {
        match &self.log_dir {
            Some(dir) => dir.clone(),
            None => get_service_dir(&self.service_name).join("logs"),
        }
    }
}

/// Starts the global logger. The returned handle must be kept alive until
/// the process exits, otherwise buffered file output may be lost.
pub fn init_log(config: LogConfig) -> Result<LoggerHandle, String> {
    // RUST_LOG takes precedence over the default level
    let logger = Logger::try_with_env_or_str(DEFAULT_LOG_LEVEL).map_err(|e| {
        let msg = format!("Invalid log level: {}", e);
        println!("{}", msg);
        msg
    })?;

    let logger = if config.file {
        let log_dir = config.log_dir();
        std::fs::create_dir_all(&log_dir).map_err(|e| {
            let msg = format!("Failed to create log directory {}: {}", log_dir.display(), e);
            println!("{}", msg);
            msg
        })?;

        let logger = logger
            .format(detailed_format)
            .log_to_file(
                FileSpec::default()
                    .directory(log_dir)
                    .basename(&config.service_name),
            )
            .rotate(
                Criterion::Size(100_000_000), // Rotate when file size reaches 100 MB
                Naming::Timestamps,
                Cleanup::KeepLogFiles(20),
            );

        if config.console {
            logger.duplicate_to_stderr(Duplicate::All)
        } else {
            logger
        }
    } else {
        // Without a file sink everything goes to stderr
        logger.format(detailed_format).log_to_stderr()
    };

    logger.start().map_err(|e| {
        let msg = format!("Failed to initialize flexi_logger: {}", e);
        println!("{}", msg);
        msg
    })
}
