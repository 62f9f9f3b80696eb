pub mod heroku;
pub mod http_client;
pub mod memory;

pub use heroku::HerokuEnvironmentService;
pub use http_client::{HttpClient, NetworkError};
pub use memory::{InMemoryEnvironmentService, RemoteCall, RemoteOperation};
