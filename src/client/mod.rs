mod api;
mod filter;
mod resource;

pub use api::{ApiClient, ClientError};
pub use filter::{report_matches, student_matches};
pub use resource::{FetchOptions, FetchState, Resource};
