pub mod config;
pub mod errors;
pub mod greeting;
pub mod handler;
pub mod logger;
pub mod telemetry;

pub use config::{HelloConfig, load_config};
pub use errors::{HelloError, Result, ValidationError};
pub use greeting::{Greeting, Name, greet};
pub use handler::{HelloHandler, HelloRequest, HelloResponse};
pub use logger::{Field, Level, Logger, RequestContext, TracingLogger};
