pub mod app;
pub mod config;
pub mod emitter;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod worker;

pub use app::build_router;
pub use config::Config;
pub use state::AppState;
