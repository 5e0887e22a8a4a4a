use crate::monitor::MonitorPhase;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

pub struct WatchOutput {
    bar: ProgressBar,
}

impl WatchOutput {
    pub fn new(address: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {prefix:.bold} {msg}")
                .expect("Invalid progress bar template"),
        );
        bar.set_prefix(address.to_string());
        bar.enable_steady_tick(Duration::from_millis(120));

        Self { bar }
    }

    // indicatif draws on stderr, so that is the stream that must be a terminal
    pub fn for_stderr(address: &str) -> Self {
        if std::io::stderr().is_terminal() {
            Self::new(address)
        } else {
            Self::hidden()
        }
    }

    // No spinner, lines go straight to stdout
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }

    pub fn update(&self, phase: MonitorPhase, cycles: u64) {
        self.bar.set_message(format!("{:?}, {} polls", phase, cycles));
    }

    pub fn println(&self, msg: &str) {
        if self.bar.is_hidden() {
            println!("{}", msg);
        } else {
            self.bar.println(msg);
        }
    }

    pub fn finish(&self, msg: &str) {
        self.bar.finish_with_message(msg.to_string());
    }
}

pub type WatchOutputRef = std::sync::Arc<WatchOutput>;
