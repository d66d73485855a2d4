//! Configuration default values
//!
//! This module contains all the default values for configuration options,
//! making them easily changeable in one central location.
use std::time::Duration;

// Web server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_ENABLE_GZIP: bool = false;

// Avatar provider defaults
pub const DEFAULT_AVATAR_ENABLED: bool = true;
pub const DEFAULT_AVATAR_BASE_URL: &str = "https://secure.gravatar.com/avatar/";
pub const DEFAULT_PLACEHOLDER_PATH: &str = "./public/img/user_profile.png";

// Fetch pool defaults
pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(3);

// Cache defaults
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10 * 60);
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(2 * 60 * 60);

// Upstream query strings
pub const PRIMARY_QUERY: &str = "d=retro&size=200&r=pg";
pub const PROBE_QUERY: &str = "d=404";

// Response headers
pub const AVATAR_CONTENT_TYPE: &str = "image/jpeg";
pub const AVATAR_CACHE_CONTROL: &str = "private, max-age=3600";
