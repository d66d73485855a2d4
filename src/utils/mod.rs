pub mod http_client;
pub mod validation;

pub use http_client::HttpClientFactory;
pub use validation::{avatar_path, hash_email, is_valid_avatar_hash};
