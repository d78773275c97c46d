mod error;
mod reports;
mod routes;
mod state;
mod students;

pub use error::ApiError;
pub use routes::{app, serve};
pub use state::AppState;
