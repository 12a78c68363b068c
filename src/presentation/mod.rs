pub mod config;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::{Environment, Settings};
pub use extractors::CurrentUser;
pub use router::create_router;
pub use state::AppState;
