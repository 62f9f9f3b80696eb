pub mod app_error;
pub mod context;
pub mod store_error;

pub use app_error::*;
pub use context::*;
pub use store_error::*;
