//! Application services layer.

pub mod error;
pub mod home;
pub mod repos;
pub mod results;
pub mod sidebar;
