//! Host behaviors adjusted to sit above the bottom panel.
//!
//! The notification tray and its banners slide in from the bottom edge and
//! would be hidden behind the bar, and the stock workspace-switch popup only
//! knows about a single row.
//!
//! Vertical positions are offsets from the bottom edge of the primary
//! monitor; negative values move upwards.

use std::str::FromStr;
use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear};
use thiserror::Error;

use crate::constants::SWITCHER_POPUP_TIMEOUT;
use crate::grid::WorkspaceGrid;
use crate::shell::{Monitor, MotionDirection, Shell, WindowId};
use crate::timer::Deadline;
use crate::ui::{UiFrame, safe_set_string};

/// Target y of the tray when it slides in.
pub fn tray_target_y(tray_height: i32, panel_height: i32) -> i32 {
    -(tray_height + panel_height)
}

/// Target y of a notification banner being shown.
///
/// `None` leaves the banner where it is: on older hosts an already expanded
/// notification positions itself.
pub fn notification_target_y(
    widget_height: i32,
    panel_height: i32,
    expanded: bool,
    legacy: bool,
) -> Option<i32> {
    if legacy && expanded {
        None
    } else {
        Some(tray_target_y(widget_height, panel_height))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandMove {
    /// Jump straight to the target.
    Snap(i32),
    /// Animate towards the target.
    Animate(i32),
    Stay,
}

/// Move for a banner that has just expanded.
///
/// A banner already above its target snaps down instead of animating so no
/// gap opens between it and the panel.
pub fn expanded_notification_move(current_y: i32, widget_height: i32, panel_height: i32) -> ExpandMove {
    let target = tray_target_y(widget_height, panel_height);
    if current_y < target {
        ExpandMove::Snap(target)
    } else if current_y != target {
        ExpandMove::Animate(target)
    } else {
        ExpandMove::Stay
    }
}

/// Hovering the screen corner no longer opens the tray.
pub fn tray_dwell_timeout() -> Option<Duration> {
    None
}

/// Dismiss the tray when it is up, summon it otherwise.
pub fn toggle_tray(host: &mut dyn Shell) {
    let summon = !host.tray_summary_shown();
    tracing::debug!(summon, "tray toggled");
    host.set_tray_summoned(summon);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingAction {
    /// Switch to the neighboring workspace.
    Switch,
    /// Take the focused window along to the neighboring workspace.
    Move,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("not a workspace keybinding: {0:?}")]
pub struct UnknownBinding(String);

/// A `switch-to-workspace-<dir>` or `move-to-workspace-<dir>` keybinding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkspaceBinding {
    pub action: BindingAction,
    pub direction: MotionDirection,
}

impl WorkspaceBinding {
    /// Every keybinding name handled here.
    pub const NAMES: [&'static str; 8] = [
        "switch-to-workspace-left",
        "switch-to-workspace-right",
        "switch-to-workspace-up",
        "switch-to-workspace-down",
        "move-to-workspace-left",
        "move-to-workspace-right",
        "move-to-workspace-up",
        "move-to-workspace-down",
    ];

    pub fn new(action: BindingAction, direction: MotionDirection) -> Self {
        Self { action, direction }
    }
}

impl FromStr for WorkspaceBinding {
    type Err = UnknownBinding;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownBinding(name.to_string());
        let parts: Vec<&str> = name.split('-').collect();
        let [action, "to", "workspace", direction] = parts.as_slice() else {
            return Err(unknown());
        };
        let action = match *action {
            "switch" => BindingAction::Switch,
            "move" => BindingAction::Move,
            _ => return Err(unknown()),
        };
        let direction = MotionDirection::parse(direction).ok_or_else(unknown)?;
        Ok(Self { action, direction })
    }
}

/// Run a workspace keybinding against the grid.
///
/// Returns the workspace that is active afterwards, or `None` when the
/// binding was ignored because there is only one workspace. Without a
/// neighbor in the requested direction nothing moves but the popup still
/// shows.
pub fn handle_workspace_binding(
    host: &mut dyn Shell,
    grid: &WorkspaceGrid,
    binding: WorkspaceBinding,
    window: Option<WindowId>,
    popup: &mut SwitcherPopup,
    now: Instant,
) -> Option<usize> {
    if host.n_workspaces() == 1 {
        return None;
    }
    let grid = grid.resized(host.n_workspaces());
    let active = host.active_workspace_index();
    let target = grid.neighbor(active, binding.direction);
    if let Some(target) = target {
        match (binding.action, window) {
            (BindingAction::Switch, _) => host.activate_workspace(target),
            (BindingAction::Move, Some(window)) => {
                host.change_workspace(window, target);
                host.activate_window(window);
            }
            (BindingAction::Move, None) => host.activate_workspace(target),
        }
    }
    let new_index = target.unwrap_or(active);
    tracing::debug!(?binding, from = active, to = new_index, "workspace keybinding");
    if !host.overview_visible() {
        popup.display(grid, binding.direction, new_index, now);
    }
    Some(new_index)
}

/// One indicator in the popup grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupCell {
    pub index: usize,
    /// Set on the target workspace: the direction of travel.
    pub marker: Option<MotionDirection>,
}

/// Pixel (or cell) size of the popup and of each of its indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupSize {
    pub width: u32,
    pub height: u32,
    pub cell_width: u32,
    pub cell_height: u32,
}

/// Size the popup for `grid` on `monitor`.
///
/// Indicators keep the monitor's aspect ratio at `cell_height`; the total is
/// clamped to the monitor minus `reserved_height` (panels) and `padding` on
/// each axis.
pub fn popup_size(
    monitor: Monitor,
    grid: &WorkspaceGrid,
    cell_height: u32,
    spacing: u32,
    reserved_height: u32,
    padding: u32,
) -> PopupSize {
    let rows = grid.rows() as u32;
    let columns = grid.columns() as u32;
    let avail_height = monitor
        .height
        .saturating_sub(reserved_height)
        .saturating_sub(padding);
    let avail_width = monitor.width.saturating_sub(padding);
    let cell_width = if monitor.height == 0 {
        cell_height
    } else {
        cell_height * monitor.width / monitor.height
    };
    let v_spacing = spacing * rows.saturating_sub(1);
    let h_spacing = spacing * columns.saturating_sub(1);
    let height = (rows * cell_height + v_spacing).min(avail_height);
    let width = (columns * cell_width + h_spacing).min(avail_width);
    PopupSize {
        width,
        height,
        cell_width: width.saturating_sub(h_spacing) / columns.max(1),
        cell_height: height.saturating_sub(v_spacing) / rows.max(1),
    }
}

/// Grid-aware workspace switch popup.
#[derive(Debug, Clone)]
pub struct SwitcherPopup {
    grid: Option<WorkspaceGrid>,
    target: usize,
    direction: MotionDirection,
    dismiss: Deadline,
    timeout: Duration,
}

impl SwitcherPopup {
    pub fn new() -> Self {
        Self {
            grid: None,
            target: 0,
            direction: MotionDirection::Right,
            dismiss: Deadline::new(),
            timeout: SWITCHER_POPUP_TIMEOUT,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.dismiss.is_armed()
    }

    pub fn target(&self) -> usize {
        self.target
    }

    /// Redraw for `target` and restart the dismiss timer.
    pub fn display(
        &mut self,
        grid: WorkspaceGrid,
        direction: MotionDirection,
        target: usize,
        now: Instant,
    ) {
        self.grid = Some(grid);
        self.direction = direction;
        self.target = target;
        self.dismiss.arm(now, self.timeout);
    }

    pub fn tick(&mut self, now: Instant) {
        if self.dismiss.fire(now) {
            self.grid = None;
        }
    }

    pub fn hide(&mut self) {
        self.dismiss.cancel();
        self.grid = None;
    }

    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        self.dismiss.remaining(now)
    }

    /// Indicators in row-major order, one per workspace.
    pub fn cells(&self) -> Vec<PopupCell> {
        let Some(grid) = self.grid else {
            return Vec::new();
        };
        (0..grid.count())
            .map(|index| PopupCell {
                index,
                marker: (index == self.target).then_some(self.direction),
            })
            .collect()
    }

    pub fn render(&self, frame: &mut UiFrame<'_>, bounds: Rect, monitor: Monitor, reserved: u16) {
        let Some(grid) = self.grid.filter(|_| self.is_visible()) else {
            return;
        };
        let size = popup_size(monitor, &grid, 1, 0, u32::from(reserved), 2);
        let cell_w = size.cell_width.clamp(3, 9) as u16;
        let width = cell_w * grid.columns() as u16 + 2;
        let height = grid.rows() as u16 + 2;
        let rect = Rect {
            x: bounds.x + bounds.width.saturating_sub(width) / 2,
            y: bounds.y + bounds.height.saturating_sub(height) / 2,
            width: width.min(bounds.width),
            height: height.min(bounds.height),
        };
        let base = Style::default().bg(crate::theme::popup_bg());
        frame.render_widget(Clear, rect);
        frame.render_widget(Block::default().borders(Borders::ALL).style(base), rect);
        let buffer = frame.buffer_mut();
        for cell in self.cells() {
            let x = rect.x + 1 + grid.column_of(cell.index) as u16 * cell_w;
            let y = rect.y + 1 + grid.row_of(cell.index) as u16;
            let (glyph, style) = match cell.marker {
                Some(direction) => (
                    arrow(direction),
                    base.fg(crate::theme::popup_target_fg())
                        .add_modifier(Modifier::BOLD),
                ),
                None => ("□", base.fg(crate::theme::popup_cell_fg())),
            };
            let text = format!("{glyph:^width$}", width = cell_w as usize);
            safe_set_string(buffer, rect, x, y, &text, style);
        }
    }
}

impl Default for SwitcherPopup {
    fn default() -> Self {
        Self::new()
    }
}

fn arrow(direction: MotionDirection) -> &'static str {
    match direction {
        MotionDirection::Left => "◀",
        MotionDirection::Right => "▶",
        MotionDirection::Up => "▲",
        MotionDirection::Down => "▼",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Rows;
    use crate::sim::{SimCommand, SimShell};

    fn grid(rows: usize, count: usize) -> WorkspaceGrid {
        WorkspaceGrid::new(Rows::new(rows).unwrap(), count)
    }

    #[test]
    fn tray_and_banner_sit_above_panel() {
        assert_eq!(tray_target_y(120, 30), -150);
        assert_eq!(notification_target_y(80, 30, false, true), Some(-110));
        assert_eq!(notification_target_y(80, 30, true, false), Some(-110));
        assert_eq!(notification_target_y(80, 30, true, true), None);
        assert_eq!(tray_dwell_timeout(), None);
    }

    #[test]
    fn expanded_banner_snaps_when_above_target() {
        assert_eq!(expanded_notification_move(-200, 100, 30), ExpandMove::Snap(-130));
        assert_eq!(expanded_notification_move(-50, 100, 30), ExpandMove::Animate(-130));
        assert_eq!(expanded_notification_move(-130, 100, 30), ExpandMove::Stay);
    }

    #[test]
    fn toggle_tray_flips_summoned_state() {
        let mut host = SimShell::new(1);
        toggle_tray(&mut host);
        assert!(host.tray_summary_shown());
        toggle_tray(&mut host);
        assert_eq!(
            host.take_commands(),
            vec![
                SimCommand::SetTraySummoned(true),
                SimCommand::SetTraySummoned(false)
            ]
        );
    }

    #[test]
    fn binding_names_parse() {
        for name in WorkspaceBinding::NAMES {
            assert!(name.parse::<WorkspaceBinding>().is_ok(), "{name}");
        }
        assert_eq!(
            "move-to-workspace-up".parse::<WorkspaceBinding>(),
            Ok(WorkspaceBinding::new(BindingAction::Move, MotionDirection::Up))
        );
        assert!("switch-to-workspace-1".parse::<WorkspaceBinding>().is_err());
        assert!("switch-windows".parse::<WorkspaceBinding>().is_err());
    }

    #[test]
    fn single_workspace_ignores_binding() {
        let mut host = SimShell::new(1);
        let mut popup = SwitcherPopup::new();
        let binding = WorkspaceBinding::new(BindingAction::Switch, MotionDirection::Right);
        let got = handle_workspace_binding(
            &mut host,
            &grid(1, 1),
            binding,
            None,
            &mut popup,
            Instant::now(),
        );
        assert_eq!(got, None);
        assert!(!popup.is_visible());
        assert!(host.take_commands().is_empty());
    }

    #[test]
    fn switch_moves_along_grid_and_shows_popup() {
        let mut host = SimShell::new(6);
        let mut popup = SwitcherPopup::new();
        let t0 = Instant::now();
        let down = WorkspaceBinding::new(BindingAction::Switch, MotionDirection::Down);
        let got = handle_workspace_binding(&mut host, &grid(2, 6), down, None, &mut popup, t0);
        assert_eq!(got, Some(3));
        assert_eq!(host.take_commands(), vec![SimCommand::ActivateWorkspace(3)]);
        assert!(popup.is_visible());
        let marked: Vec<_> = popup.cells().into_iter().filter(|c| c.marker.is_some()).collect();
        assert_eq!(
            marked,
            vec![PopupCell {
                index: 3,
                marker: Some(MotionDirection::Down)
            }]
        );
        // blocked at the grid edge: nothing moves, popup re-armed
        let t1 = t0 + Duration::from_millis(300);
        let got = handle_workspace_binding(&mut host, &grid(2, 6), down, None, &mut popup, t1);
        assert_eq!(got, Some(3));
        assert!(host.take_commands().is_empty());
        popup.tick(t0 + SWITCHER_POPUP_TIMEOUT);
        assert!(popup.is_visible());
        popup.tick(t1 + SWITCHER_POPUP_TIMEOUT);
        assert!(!popup.is_visible());
    }

    #[test]
    fn move_takes_window_along() {
        let mut host = SimShell::new(4);
        let w = host.add_window(0, "term", "shell");
        let mut popup = SwitcherPopup::new();
        let right = WorkspaceBinding::new(BindingAction::Move, MotionDirection::Right);
        host.set_overview_visible(true);
        let got =
            handle_workspace_binding(&mut host, &grid(1, 4), right, Some(w), &mut popup, Instant::now());
        assert_eq!(got, Some(1));
        assert_eq!(
            host.take_commands(),
            vec![
                SimCommand::ChangeWorkspace(w, 1),
                SimCommand::ActivateWindow(w)
            ]
        );
        assert_eq!(host.active_workspace_index(), 1);
        assert!(!popup.is_visible());
    }

    #[test]
    fn popup_size_is_clamped_to_monitor() {
        let monitor = Monitor {
            x: 0,
            y: 0,
            width: 1600,
            height: 900,
        };
        let size = popup_size(monitor, &grid(2, 6), 90, 10, 60, 20);
        assert_eq!(size.cell_height, 90);
        assert_eq!(size.cell_width, 160);
        assert_eq!((size.width, size.height), (500, 190));
        let tiny = Monitor {
            width: 160,
            height: 90,
            ..monitor
        };
        let size = popup_size(tiny, &grid(2, 6), 90, 0, 30, 0);
        assert_eq!(size.height, 60);
        assert_eq!(size.cell_height, 30);
        assert_eq!(size.width, 160);
    }
}
