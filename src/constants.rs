//! Application constants
//!
//! Centralized location for user-facing strings and configuration defaults.

/// Default backend base URL when no config file or override is present
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Default resource collection path segment
pub const DEFAULT_RESOURCE: &str = "blogs";

/// Default log file name (written in the working directory)
pub const DEFAULT_LOG_FILE: &str = "blog-admin.log";

/// Environment variable overriding the configured base URL
pub const BASE_URL_ENV: &str = "BLOG_ADMIN_URL";

/// How long a notification stays visible
pub const NOTIFICATION_TTL_MS: i64 = 4000;

/// Number of plain-text characters shown in the table preview column
pub const PREVIEW_CHARS: usize = 100;

/// Application name
pub const APP_NAME: &str = "Blog Admin Panel";

// Notification texts
pub const MSG_TITLE_REQUIRED: &str = "Title is required";
pub const MSG_CREATED: &str = "Blog created";
pub const MSG_UPDATED: &str = "Blog updated";
pub const MSG_DELETED: &str = "Blog deleted";
pub const MSG_LOAD_FAILED: &str = "Failed to load blogs";
pub const MSG_DELETE_FAILED: &str = "Failed to delete blog";
pub const MSG_SAVE_FALLBACK: &str = "Error saving blog";
