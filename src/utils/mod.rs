//! Utility functions for code generation, URL validation, and request handling.
//!
//! - [`code_generator`] - Short code generation and custom alias validation
//! - [`url_validator`] - Long URL format checks
//! - [`client_identity`] - Rate-limit identity extraction from requests

pub mod client_identity;
pub mod code_generator;
pub mod url_validator;
