pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;
pub mod templates;
