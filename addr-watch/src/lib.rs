pub mod config;
pub mod feed;
pub mod matcher;
pub mod monitor;
pub mod output;
pub mod sms;

#[cfg(test)]
mod test_util;

#[macro_use]
extern crate log;

pub use config::*;
pub use feed::*;
pub use matcher::WatchTarget;
pub use monitor::*;
pub use output::*;
pub use sms::*;
