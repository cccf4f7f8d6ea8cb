//! API constants

/// API base path prefix (version-independent)
pub const API_BASE: &str = "/api";

/// Current API version segment.
pub const API_VERSION: &str = "v0";

/// Prefix every versioned route is nested under.
pub const API_PREFIX: &str = "/api/v0";
