//! Service layer
//!
//! Planning tree roll-ups, board reordering, schedule calculation and the
//! planning timeline.

pub mod board;
pub mod schedule;
pub mod timeline;
pub mod wbs_tree;

pub use schedule::Schedule;
pub use timeline::{build_timeline, TimelineEntry};
pub use wbs_tree::build_wbs_tree;
