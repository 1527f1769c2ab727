pub mod login;
pub mod register;

pub use login::{LoginAdminCommand, LoginAdminError};
pub use register::{RegisterAdminCommand, RegisterAdminError};
