//! The three file store endpoints.
//!
//! Each handler ends the request itself: every failure is turned into a
//! response here and nothing is propagated back to the server loop.

mod fetch;
mod list;
mod upload;

pub use fetch::get_file;
pub use list::list_files;
pub use upload::upload_file;
