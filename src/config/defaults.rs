//! Default configuration values

/// Default repository API base URL
pub const REPOSITORY_URL: &str = "http://localhost:8004";

/// Default build orchestrator API base URL
pub const ORCHESTRATOR_URL: &str = "http://localhost:9999";

/// Maximum number of request retry attempts against collaborators
pub const MAX_REQUEST_RETRIES: u32 = 3;

/// Base delay for request retry backoff (in milliseconds)
pub const RETRY_BASE_DELAY_MS: u64 = 1000;

/// Request timeout for collaborator round trips (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Connect timeout for collaborator round trips (in seconds)
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Product definition file name at the project root
pub const PRODUCT_FILE: &str = "product.toml";

/// Directory holding local checkouts under the project root
pub const CHECKOUTS_DIR: &str = "checkouts";

/// Recipe file extension
pub const RECIPE_EXT: &str = "recipe";

/// Poll interval while watching a job (in seconds)
pub const WATCH_POLL_SECS: u64 = 2;
