pub mod env_vars;
pub mod validation;

pub use env_vars::*;
pub use validation::*;
