use crate::cmd::Commands;
use addr_watch::{
    AddrWatchConfig, FeedClient, SmsMessage, TransactionSummary, TxSourceRef, VonageSmsClient,
    WatchMonitor, WatchOutput, WatchTarget, matcher,
};
use std::sync::Arc;

pub struct WatchService {
    config: AddrWatchConfig,
}

impl WatchService {
    pub fn new(config: AddrWatchConfig) -> Self {
        Self { config }
    }

    pub async fn process_command(mut self, command: Commands) -> Result<(), String> {
        match command {
            Commands::Watch {
                address,
                to,
                interval,
                max_cycles,
            } => {
                if let Some(address) = address {
                    self.config.watch.address = address;
                }
                if let Some(to) = to {
                    self.config.sms.to = to;
                }
                if let Some(interval) = interval {
                    self.config.watch.interval_secs = interval;
                }
                if max_cycles.is_some() {
                    self.config.watch.max_cycles = max_cycles;
                }

                self.watch().await
            }
            Commands::Check { address } => {
                let address = self.resolve_address(address)?;
                self.check(&address).await
            }
            Commands::History { address } => self.history(&address).await,
            Commands::Sms { to, text } => {
                if let Some(to) = to {
                    self.config.sms.to = to;
                }
                if let Some(text) = text {
                    self.config.sms.text = text;
                }

                self.send_sms().await
            }
        }
    }

    fn resolve_address(&self, address: Option<String>) -> Result<String, String> {
        match address {
            Some(address) => Ok(address),
            None => watch_util::parse_watch_address(&self.config.watch.address),
        }
    }

    async fn watch(&self) -> Result<(), String> {
        self.config.validate_watch()?;
        let address = watch_util::parse_watch_address(&self.config.watch.address)?;

        // The lock name only carries the service name, so this allows one
        // watcher per machine whatever --config-dir says
        let (_lock, _guard) = watch_util::init_process_lock(watch_util::ADDR_WATCH_SERVICE_NAME)?;

        let source: TxSourceRef = Arc::new(FeedClient::new(&self.config.feed)?);
        let notifier = Arc::new(VonageSmsClient::new(&self.config.sms)?);
        let output = Arc::new(WatchOutput::for_stderr(&address));

        output.println(&format!(
            "Watching {} every {}s, notifying {}",
            address, self.config.watch.interval_secs, self.config.sms.to
        ));

        let mut monitor = WatchMonitor::new(
            source,
            notifier,
            &self.config.watch,
            SmsMessage::from(&self.config.sms),
        )
        .with_output(output.clone());

        // Create a Future to wait for SIGTERM signal (sent by kill command by default)
        #[cfg(unix)]
        let sigterm = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    error!("Failed to create SIGTERM signal handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        // On non-Unix systems, we only rely on Ctrl+C
        #[cfg(not(unix))]
        let sigterm = std::future::pending::<()>();

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                output.println("Received Ctrl+C, shutting down...");
                Ok(())
            }
            _ = sigterm => {
                output.println("Received SIGTERM, shutting down...");
                Ok(())
            }
            report = monitor.run() => {
                info!("Watch finished: {:?}", report);
                if !report.matched {
                    output.println(&format!("No transfer from {} after {} polls", address, report.cycles));
                    Ok(())
                } else if report.notified {
                    output.println(&format!("Notified {} after {} polls", self.config.sms.to, report.cycles));
                    Ok(())
                } else {
                    let msg = format!("Transfer detected but notifying {} failed", self.config.sms.to);
                    output.println(&msg);
                    Err(msg)
                }
            }
        }
    }

    async fn check(&self, address: &str) -> Result<(), String> {
        let client = FeedClient::new(&self.config.feed)?;
        let feed = client.fetch_unconfirmed().await;
        if feed.is_failed() {
            // Reported, not fatal: the flags below read as no match
            println!("Unconfirmed transaction feed is unavailable");
        } else {
            println!("Pending transactions: {}", feed.records().len());
        }

        let target = WatchTarget::evaluate(address, &feed);
        println!("Address:  {}", target.address);
        println!("Sent:     {}", target.has_sent);
        println!("Received: {}", target.has_received);

        Ok(())
    }

    async fn history(&self, address: &str) -> Result<(), String> {
        let client = FeedClient::new(&self.config.feed)?;
        let summaries = matcher::history(&client, address).await;

        SummaryFormatter::print_summaries(&summaries);
        println!("{}", summaries.len());

        Ok(())
    }

    async fn send_sms(&self) -> Result<(), String> {
        let client = VonageSmsClient::new(&self.config.sms)?;
        let message = SmsMessage::from(&self.config.sms);

        let ids = client.send_message(&message).await?;
        println!("Sent message to number {}: {:?}", message.to, ids);

        Ok(())
    }
}

struct SummaryFormatter;

impl SummaryFormatter {
    fn print_summaries(summaries: &[TransactionSummary]) {
        if summaries.is_empty() {
            println!("No transactions found.");
            return;
        }

        let from_width = Self::column_width(summaries.iter().map(|s| s.from.len()), "From");
        let to_width = Self::column_width(summaries.iter().map(|s| s.to.len()), "To");

        println!(
            "{:<from_width$}  {:<to_width$}  {:>18}  {:>18}",
            "From", "To", "Amount (sat)", "Amount (BTC)"
        );
        for s in summaries {
            println!(
                "{:<from_width$}  {:<to_width$}  {:>18}  {:>18}",
                s.from,
                s.to,
                s.amount,
                watch_util::format_btc(s.amount)
            );
        }
    }

    fn column_width(lens: impl Iterator<Item = usize>, header: &str) -> usize {
        lens.max().unwrap_or(0).max(header.len())
    }
}
