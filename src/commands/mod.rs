//! CLI subcommand implementations for notepush.
//!
//! - [`simulate`] - Run one notification activation against the loopback service
//! - [`notes`] - Talk to the remote notes service (list, create, comment)
//!
//! # Usage
//!
//! ```ignore
//! use notepush::commands;
//!
//! let report = commands::simulate::run(options).await?;
//! commands::notes::list(&client).await?;
//! ```

pub mod notes;
pub mod simulate;

#[doc(inline)]
pub use simulate::{SimulateOptions, SimulationReport};
