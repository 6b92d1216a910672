pub mod endpoints;
pub mod swap;
pub mod tokens;

pub use tokens::*;
