//! Formation management: built-in templates, the current-formation store and
//! the custom formation repositories behind it.

pub mod persistence;
pub mod store;
pub mod templates;

pub use persistence::*;
pub use store::*;
pub use templates::*;
