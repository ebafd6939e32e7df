//! Server-rendered views and askama templates.

pub mod views;
