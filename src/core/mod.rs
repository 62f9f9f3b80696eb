pub mod constants;
pub mod error_messages;
pub mod model;
pub mod progress;
pub mod service;
pub mod store;

pub use error_messages::*;
pub use model::*;
pub use progress::*;
pub use service::*;
pub use store::*;
