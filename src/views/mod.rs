//! Plain-text views for the CLI.

pub mod dashboard;
pub mod event_detail;
pub mod participants;

pub use dashboard::{render_event_list, render_users};
pub use event_detail::render_event_detail;
pub use participants::render_participants;
