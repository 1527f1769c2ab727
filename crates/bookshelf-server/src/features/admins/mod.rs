pub mod commands;
pub mod routes;
pub mod types;

pub use commands::{LoginAdminCommand, LoginAdminError, RegisterAdminCommand, RegisterAdminError};
pub use routes::admins_routes;
pub use types::{AdminSession, AdminState};
