//! Host shell port.
//!
//! The panel never owns window-manager state. Everything it shows is read
//! through [`Shell`] queries, everything the user does is sent back through
//! [`Shell`] commands, and every change arrives as a [`HostEvent`] delivered
//! against a [`SubscriptionId`] previously handed out by [`Shell::connect`].

use std::fmt;

/// Opaque, stable identity of a managed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(pub u64);

/// Opaque, stable identity of a workspace object.
///
/// Indices shift when workspaces are removed; ids do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkspaceId(pub u64);

/// Handle returned by [`Shell::connect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionDirection {
    Left,
    Right,
    Up,
    Down,
}

impl MotionDirection {
    pub const ALL: [MotionDirection; 4] = [
        MotionDirection::Left,
        MotionDirection::Right,
        MotionDirection::Up,
        MotionDirection::Down,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MotionDirection::Left => "left",
            MotionDirection::Right => "right",
            MotionDirection::Up => "up",
            MotionDirection::Down => "down",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "left" => Some(MotionDirection::Left),
            "right" => Some(MotionDirection::Right),
            "up" => Some(MotionDirection::Up),
            "down" => Some(MotionDirection::Down),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenCorner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Workspace grid override pushed to the window manager.
///
/// `rows == -1` hands the row count back to the window manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOverride {
    pub corner: ScreenCorner,
    pub vertical: bool,
    pub rows: i32,
    pub columns: i32,
}

impl LayoutOverride {
    pub const fn grid(rows: usize, columns: usize) -> Self {
        Self {
            corner: ScreenCorner::TopLeft,
            vertical: false,
            rows: rows as i32,
            columns: columns as i32,
        }
    }

    /// The override restored when the panel is disabled.
    pub const fn reset() -> Self {
        Self {
            corner: ScreenCorner::TopLeft,
            vertical: false,
            rows: -1,
            columns: 1,
        }
    }
}

/// Snapshot of the per-window attributes the panel reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    pub title: String,
    pub minimized: bool,
    pub has_focus: bool,
    pub maximized_horizontally: bool,
    pub maximized_vertically: bool,
    pub above: bool,
    pub on_all_workspaces: bool,
    pub stable_sequence: u64,
}

impl WindowInfo {
    pub fn new(title: impl Into<String>, stable_sequence: u64) -> Self {
        Self {
            title: title.into(),
            minimized: false,
            has_focus: false,
            maximized_horizontally: false,
            maximized_vertically: false,
            above: false,
            on_all_workspaces: false,
            stable_sequence,
        }
    }

    pub fn maximized_both(&self) -> bool {
        self.maximized_horizontally && self.maximized_vertically
    }

    /// A minimized window is not showing on its workspace.
    pub fn showing_on_its_workspace(&self) -> bool {
        !self.minimized
    }
}

/// The application a window resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    pub id: String,
    pub name: String,
    /// Short glyph standing in for the application icon.
    pub icon: char,
}

impl AppInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>, icon: char) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Monitor {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Sources the panel can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    WorkspaceCountChanged,
    WindowAdded(WorkspaceId),
    WindowRemoved(WorkspaceId),
    SwitchWorkspace,
    Minimize,
    Map,
    FocusAppChanged,
    TitleChanged(WindowId),
    MonitorsChanged,
    SessionModeUpdated,
    TraySummaryAdded,
    TraySummaryRemoved,
}

/// A notification emitted by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    WorkspaceCountChanged,
    WindowAdded {
        workspace: WorkspaceId,
        window: WindowId,
    },
    WindowRemoved {
        workspace: WorkspaceId,
        window: WindowId,
    },
    SwitchWorkspace {
        from: usize,
        to: usize,
        direction: Option<MotionDirection>,
    },
    Minimize(WindowId),
    Map(WindowId),
    FocusAppChanged,
    TitleChanged(WindowId),
    MonitorsChanged,
    SessionModeUpdated,
    TraySummaryAdded,
    TraySummaryRemoved,
}

impl HostEvent {
    /// The signal a subscriber must hold to receive this event.
    pub fn signal(&self) -> Signal {
        match *self {
            HostEvent::WorkspaceCountChanged => Signal::WorkspaceCountChanged,
            HostEvent::WindowAdded { workspace, .. } => Signal::WindowAdded(workspace),
            HostEvent::WindowRemoved { workspace, .. } => Signal::WindowRemoved(workspace),
            HostEvent::SwitchWorkspace { .. } => Signal::SwitchWorkspace,
            HostEvent::Minimize(_) => Signal::Minimize,
            HostEvent::Map(_) => Signal::Map,
            HostEvent::FocusAppChanged => Signal::FocusAppChanged,
            HostEvent::TitleChanged(id) => Signal::TitleChanged(id),
            HostEvent::MonitorsChanged => Signal::MonitorsChanged,
            HostEvent::SessionModeUpdated => Signal::SessionModeUpdated,
            HostEvent::TraySummaryAdded => Signal::TraySummaryAdded,
            HostEvent::TraySummaryRemoved => Signal::TraySummaryRemoved,
        }
    }
}

/// Everything the panel needs from the window manager and session.
///
/// Queries for ids the host no longer knows return `None`/empty; commands on
/// such ids are ignored by the host.
pub trait Shell {
    // Queries
    fn n_workspaces(&self) -> usize;
    fn active_workspace_index(&self) -> usize;
    fn workspace_by_index(&self, index: usize) -> Option<WorkspaceId>;
    fn workspace_index(&self, workspace: WorkspaceId) -> Option<usize>;
    fn workspace_name(&self, index: usize) -> String;
    fn list_windows(&self, workspace: WorkspaceId) -> Vec<WindowId>;
    fn window_info(&self, window: WindowId) -> Option<WindowInfo>;
    fn is_window_interesting(&self, window: WindowId) -> bool;
    fn window_app(&self, window: WindowId) -> Option<AppInfo>;
    fn focus_window(&self) -> Option<WindowId>;
    fn primary_monitor(&self) -> Monitor;
    fn session_has_workspaces(&self) -> bool;
    fn overview_visible(&self) -> bool;
    fn tray_summary_len(&self) -> usize;
    fn tray_summary_shown(&self) -> bool;

    // Subscriptions
    fn connect(&mut self, signal: Signal) -> SubscriptionId;
    fn disconnect(&mut self, id: SubscriptionId);

    // Window commands
    fn activate_window(&mut self, window: WindowId);
    fn minimize_window(&mut self, window: WindowId);
    fn maximize_window(&mut self, window: WindowId);
    fn unmaximize_window(&mut self, window: WindowId);
    fn make_above(&mut self, window: WindowId);
    fn unmake_above(&mut self, window: WindowId);
    fn stick(&mut self, window: WindowId);
    fn unstick(&mut self, window: WindowId);
    fn change_workspace(&mut self, window: WindowId, index: usize);
    fn delete_window(&mut self, window: WindowId);

    // Workspace commands
    fn activate_workspace(&mut self, index: usize);
    fn append_workspace(&mut self);
    fn remove_workspace(&mut self, index: usize);
    fn override_workspace_layout(&mut self, layout: LayoutOverride);

    // Tray
    fn set_tray_summoned(&mut self, summoned: bool);
}
