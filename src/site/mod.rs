//! HTML emitted for an entry: its own page and the blocks patched into the listing pages.

mod blocks;
mod listing;
mod page;

pub use blocks::{element_end, enclosing_element};
pub use listing::{
    ListingPatch, PendingListing, check_listing, commit_listing_updates, ensure_container,
    insert_block, patch_listing, prepare_listing_updates, preflight_listings,
    remove_existing_blocks, render_update_block,
};
pub use page::{render_entry_page, write_entry_page};
