#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod builder;
pub mod config;
pub mod error;
pub mod input;
pub mod markdown;
pub mod meta;
pub mod models;
pub mod project;
pub mod site;
pub mod staging;

pub use builder::{BuildMode, JournalBuilder, ListingPolicy};
pub use config::JournalConfig;
pub use error::{JournalError, JournalResult};
pub use input::{normalize_input_path, resolve_markdown_path};
pub use models::{EntryBuild, ImageMap, JournalMeta};
pub use project::JournalLayout;
