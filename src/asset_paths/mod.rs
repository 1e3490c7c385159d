//! Helpers for resolving, naming and serving image assets referenced by journal Markdown.
//!
//! Filtering remote references, resolving local ones against the filesystem, choosing
//! collision-free destination names and building served/hero paths are split into focused
//! submodules so each rule can be tested on its own.

mod candidates;
mod filters;
mod naming;
mod served;

pub use candidates::{
  FallbackIndex, bare_file_name, clean_image_reference, resolve_reference,
};
pub use filters::is_remote_reference;
pub use naming::DestinationNames;
pub use served::{compute_hero_sources, served_asset_path, served_file_name};
