//! School registry: schools, classrooms, students and user accounts over HTTP.
//!
//! Fixed REST routes and the generic `/api/:moduleName/:fnName` route both call into the entity
//! managers and answer through the same response envelope.

pub mod config;
pub mod error;
pub mod extractors;
pub mod gateway;
pub mod handlers;
pub mod managers;
pub mod response;
pub mod routes;
pub mod state;
pub mod store;
pub mod token;
pub mod validation;

pub use config::{Settings, StoreBackend};
pub use error::{AppError, ConfigError};
pub use gateway::Gateway;
pub use managers::{Managers, Outcome};
pub use response::Envelope;
pub use routes::{api_routes, app, common_routes_with_ready};
pub use state::AppState;
pub use store::{ensure_database_exists, EntityStore, MemoryStore, PgStore};
pub use token::{JwtIssuer, TokenIssuer};
