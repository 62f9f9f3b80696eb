pub mod config;
pub mod logging;
pub mod progress;
pub mod remote;

pub use config::*;
pub use logging::*;
pub use progress::*;
pub use remote::*;
