pub mod authorizor;
mod user;

pub use user::{TrustedRoles, User, USER_ID_HEADER, USER_ROLES_HEADER};
