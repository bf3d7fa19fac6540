//! Domain types and DTOs
//!
//! These types define the data structures for projects, their WBS trees and
//! board tasks.

pub mod projects;
pub mod resources;
pub mod tasks;
pub mod wbs;

// Re-export commonly used types
pub use projects::*;
pub use resources::*;
pub use tasks::*;
pub use wbs::*;
