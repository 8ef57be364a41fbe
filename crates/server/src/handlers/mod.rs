//! HTTP request handlers.

pub mod admin;
pub mod common;
pub mod items;

pub use admin::*;
pub use common::*;
pub use items::*;
