pub mod auth;
pub mod bootstrap_admin;
pub mod complaint;
pub mod retention;
pub mod roster;
pub mod upload;
