use crate::config::WatchConfig;
use crate::feed::TxSourceRef;
use crate::matcher;
use crate::output::WatchOutputRef;
use crate::sms::{NotifierRef, SmsMessage};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MonitorPhase {
    Polling = 0,
    Notified = 1,
    Done = 2,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorReport {
    pub cycles: u64,
    pub matched: bool,
    pub notified: bool,
}

/// Sleep-poll loop for a single watched address.
///
/// Polling repeats every `interval` until the address shows up as the first
/// input of a pending transaction. The notifier is then called exactly once
/// and the loop ends whatever the outcome of that call.
pub struct WatchMonitor {
    source: TxSourceRef,
    notifier: NotifierRef,
    address: String,
    interval: Duration,
    max_cycles: Option<u64>,
    message: SmsMessage,
    phase: MonitorPhase,
    cycles: u64,
    output: Option<WatchOutputRef>,
}

impl WatchMonitor {
    pub fn new(
        source: TxSourceRef,
        notifier: NotifierRef,
        config: &WatchConfig,
        message: SmsMessage,
    ) -> Self {
        Self {
            source,
            notifier,
            address: config.address.trim().to_string(),
            interval: Duration::from_secs(config.interval_secs),
            max_cycles: config.max_cycles,
            message,
            phase: MonitorPhase::Polling,
            cycles: 0,
            output: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_output(mut self, output: WatchOutputRef) -> Self {
        self.output = Some(output);
        self
    }

    pub fn phase(&self) -> MonitorPhase {
        self.phase
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// One polling cycle. A failed fetch counts as no match.
    pub async fn poll_once(&mut self) -> bool {
        self.cycles += 1;

        let feed = self.source.unconfirmed().await;
        if feed.is_failed() {
            warn!(
                "Poll {} for {}: feed unavailable, treating as no match",
                self.cycles, self.address
            );
            return false;
        }

        let sent = matcher::sent_from(feed.records(), &self.address);
        debug!(
            "Poll {} for {}: {} pending transactions, sent={}",
            self.cycles,
            self.address,
            feed.records().len(),
            sent
        );

        sent
    }

    pub async fn run(&mut self) -> MonitorReport {
        info!(
            "Watching {} every {:?}, max cycles {:?}",
            self.address, self.interval, self.max_cycles
        );

        let mut matched = false;
        let mut notified = false;

        loop {
            self.report_progress();

            match self.phase {
                MonitorPhase::Polling => {
                    if self.poll_once().await {
                        info!("Detected a transfer sent from {}", self.address);
                        self.println(&format!("Detected a transfer sent from {}", self.address));
                        matched = true;
                        self.phase = MonitorPhase::Notified;
                        continue;
                    }

                    if let Some(max) = self.max_cycles {
                        if self.cycles >= max {
                            info!("Reached {} polls without a match, stopping", max);
                            self.phase = MonitorPhase::Done;
                            continue;
                        }
                    }

                    tokio::time::sleep(self.interval).await;
                }
                MonitorPhase::Notified => {
                    notified = self.notifier.send(&self.message).await;
                    if notified {
                        info!("Notification sent to {}", self.message.to);
                    } else {
                        error!("Notification to {} failed, not retrying", self.message.to);
                    }
                    self.phase = MonitorPhase::Done;
                }
                MonitorPhase::Done => break,
            }
        }

        if let Some(output) = &self.output {
            output.finish(if notified { "notified" } else { "done" });
        }

        MonitorReport {
            cycles: self.cycles,
            matched,
            notified,
        }
    }

    fn report_progress(&self) {
        if let Some(output) = &self.output {
            output.update(self.phase, self.cycles);
        }
    }

    fn println(&self, msg: &str) {
        if let Some(output) = &self.output {
            output.println(msg);
        }
    }
}
