pub mod config;
pub mod error;
pub mod experience;
pub mod host;
pub mod logging;
pub mod personalizer;
pub mod state;
pub mod workers;

pub use error::ServiceError;
pub use state::AppState;
