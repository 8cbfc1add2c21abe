//! Constants used throughout the hastane core crate.

/// Port the server listens on when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 3000;

/// Maximum pooled database connections when `DATABASE_POOL_SIZE` is not set.
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// Template directory, relative to the workspace root.
pub const VIEWS_DIR: &str = "crates/web/views";

/// Extension of template sources in the views directory.
pub const VIEW_EXTENSION: &str = "html";
