// Common types and utilities shared across the application

pub mod email;

pub use email::is_valid_email;
