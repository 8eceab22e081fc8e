//! 🚲 trailbot-core: Core library for the trailbot bike-trail assistant.
//!
//! - [`config`]: Typed configuration loading from JSON plus env overrides
//! - [`conversation`]: Turns, history, and per-exchange state
//! - [`provider`]: Completion provider trait with OpenAI, Hugging Face and BotLibre backends
//! - [`geocode`]: Place name to coordinates
//! - [`trails`]: Nearby trail lookup
//! - [`tools`]: Capability trait, registry, and the `get_lat_long` trail finder
//! - [`agent`]: The orchestrator deciding between direct answers and capability calls
//! - [`bot`]: Host-facing entry point
//!
//! # Quick Start
//!
//! ```no_run
//! use trailbot_core::bot::Bot;
//! use trailbot_core::config::Config;
//! use trailbot_core::conversation::{History, Turn};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let bot = Bot::from_config(&config)?;
//!
//! let history = History::from(vec![Turn::user("Find trails near Austin, Texas")]);
//! let (reply, state) = bot.on_message(&history, None).await;
//! println!("{reply} (exchange #{})", state.counter);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod bot;
pub mod config;
pub mod conversation;
pub mod error;
pub mod geocode;
pub mod http;
pub mod provider;
pub mod tools;
pub mod trails;

#[cfg(test)]
mod testing;

pub use error::{Result, TrailbotError};
