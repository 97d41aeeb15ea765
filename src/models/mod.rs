//! Data models for flux

pub mod branch;
pub mod commit;
pub mod menu;
pub mod repository;
pub mod session;

pub use branch::*;
pub use commit::*;
pub use menu::*;
pub use repository::*;
pub use session::*;
