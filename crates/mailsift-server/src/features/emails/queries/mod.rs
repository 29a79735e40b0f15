//! Email queries

pub mod get_email;

pub use get_email::{GetEmailError, GetEmailQuery};
