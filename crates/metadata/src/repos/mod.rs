//! Per-entity repository traits.

pub mod items;
pub mod tokens;
pub mod users;

pub use items::{ClaimOutcome, ItemRepo};
pub use tokens::TokenRepo;
pub use users::UserRepo;
