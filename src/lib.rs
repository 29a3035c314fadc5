//! Jenkins build job widget of the Ligoj console.
//!
//! Renders the status of a subscription's job (or of each branch of a
//! multi-branch job), triggers builds, and validates the name of jobs
//! created by new subscriptions. Console services are reached through the
//! capabilities of [`host`].

pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod jenkins;
pub mod model;
pub mod output;

pub use error::{Result, WidgetError};
pub use jenkins::JenkinsWidget;
