//! Shared crate-wide constants.

use std::time::Duration;

/// Hover debounce used before showing a tooltip, and the grace period after
/// one hides during which the next hover shows without delay.
pub const HOVER_TIMEOUT: Duration = Duration::from_millis(300);

/// How long the workspace grid popup stays up after the last switch.
pub const SWITCHER_POPUP_TIMEOUT: Duration = Duration::from_millis(400);

/// Bounds accepted by the workspace dialog for the total workspace count.
pub const MIN_WORKSPACES: usize = 2;
pub const MAX_WORKSPACES: usize = 32;

/// Bounds accepted for the number of switcher rows.
pub const MIN_ROWS: usize = 1;
pub const MAX_ROWS: usize = 5;

/// Tooltips never come closer than this to either edge of their parent.
pub const TOOLTIP_EDGE_MARGIN: i32 = 6;

/// File name, under the home directory, holding the persisted row count.
pub const ROWS_FILE_NAME: &str = ".bottom_panel_rows";

/// Settings schema and key for the dynamic workspaces switch.
pub const OVERRIDES_SCHEMA: &str = "org.gnome.shell.overrides";
pub const DYNAMIC_WORKSPACES_KEY: &str = "dynamic-workspaces";
