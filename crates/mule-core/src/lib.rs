pub mod api;
pub mod classifier;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod types;

pub use api::RightApi;
pub use client::HttpRightApi;
pub use config::{AuthConfig, RunOptions};
pub use dispatch::{DispatchReport, RunExecutable};
pub use error::{MuleError, Result};
