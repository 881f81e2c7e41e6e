//! Well-known string identifiers shared across the workspace.

/// Application name; log files and logger scopes derive from it.
pub const APP_NAME: &str = "maildesk";

/// Feature slice identifiers.
pub const THEME: &str = "theme";
pub const AUTH: &str = "auth";
