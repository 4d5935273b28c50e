//! # Policy Constants
//!
//! Fixed rules of the results model. These are compiled in and are not
//! configurable at runtime.

/// Minimum percentage for a mark (or an aggregate) to count as a pass.
pub const PASS_THRESHOLD_PERCENT: f64 = 33.0;

/// Maximum marks assigned to a subject when none is given.
pub const DEFAULT_MAX_MARKS: u32 = 100;

/// Value written for auto-provisioned marks.
pub const ZERO_MARK: &str = "0";

/// Name shown for a mark whose subject row no longer exists.
pub const PLACEHOLDER_SUBJECT_NAME: &str = "Unknown";

/// Maximum marks shown for the placeholder subject.
pub const PLACEHOLDER_MAX_MARKS: u32 = 100;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for names (sessions, classes, students, subjects, admins).
pub const MAX_NAME_LENGTH: usize = 128;

/// Maximum length of a textual `obtained` value.
pub const MAX_OBTAINED_LENGTH: usize = 32;

/// Maximum length for setting keys.
pub const MAX_SETTING_KEY_LENGTH: usize = 64;

/// Maximum length for setting values.
pub const MAX_SETTING_VALUE_LENGTH: usize = 4096;

/// Maximum number of entries in one bulk mark replacement.
pub const MAX_BULK_MARKS: usize = 500;
