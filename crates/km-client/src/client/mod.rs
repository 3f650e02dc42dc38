pub(crate) mod client;
pub(crate) mod error;
pub(crate) mod error_body;
pub(crate) mod tenant_creation;

pub use client::ApiClient;
pub use error::{ClientError, Result};
pub use error_body::extract_error_message;
