//! Workspace switcher: one row of workspace buttons plus a row indicator.
//!
//! The switcher shows the grid row holding the active workspace. A change in
//! workspace count or row count rebuilds every button; a plain workspace
//! switch only rebinds the existing buttons.

pub mod button;
pub mod dialog;

use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use crate::config::{Rows, SettingsStore};
use crate::grid::{ScrollDirection, WorkspaceGrid};
use crate::input::PointerButton;
use crate::shell::{HostEvent, LayoutOverride, Shell, Signal, SubscriptionId};
use crate::signals::Subscriptions;
use crate::theme::{ROW_INDICATOR_WIDTH, WORKSPACE_BUTTON_WIDTH};
use crate::tooltip::{HoverDebouncer, Tooltip, TooltipCommand};
use crate::ui::{UiFrame, rect_contains, safe_set_string};

pub use button::WorkspaceButton;
pub use dialog::{DialogAction, DialogField, WorkspaceDialog};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SwitcherRoute {
    WorkspaceCount,
    SwitchWorkspace,
}

/// What lies under a pointer position inside the switcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SwitcherHit {
    Button(usize),
    /// Row indicator, with the offset from its top edge and its height.
    RowIndicator { y: f64, height: f64 },
    Background,
}

#[derive(Debug)]
pub struct WorkspaceSwitcher {
    buttons: Vec<WorkspaceButton>,
    grid: WorkspaceGrid,
    subs: Subscriptions<SwitcherRoute>,
    hover: HoverDebouncer<usize>,
    dialog: Option<WorkspaceDialog>,
    area: Rect,
    indicator: Rect,
}

impl WorkspaceSwitcher {
    pub fn new(host: &mut dyn Shell, rows: Rows) -> Self {
        let mut subs = Subscriptions::new();
        subs.connect(host, Signal::WorkspaceCountChanged, SwitcherRoute::WorkspaceCount);
        subs.connect(host, Signal::SwitchWorkspace, SwitcherRoute::SwitchWorkspace);
        let mut switcher = Self {
            buttons: Vec::new(),
            grid: WorkspaceGrid::new(rows, host.n_workspaces()),
            subs,
            hover: HoverDebouncer::new(),
            dialog: None,
            area: Rect::default(),
            indicator: Rect::default(),
        };
        switcher.create_buttons(host, rows);
        switcher
    }

    pub fn buttons(&self) -> &[WorkspaceButton] {
        &self.buttons
    }

    pub fn grid(&self) -> WorkspaceGrid {
        self.grid
    }

    /// The row indicator is shown only with more than one row.
    pub fn has_row_indicator(&self) -> bool {
        self.grid.rows() > 1
    }

    pub fn owns(&self, id: SubscriptionId) -> bool {
        self.subs.owns(id)
    }

    /// Grid over the live workspace count, with the current row setting.
    fn live_grid(&self, host: &dyn Shell) -> WorkspaceGrid {
        self.grid.resized(host.n_workspaces())
    }

    /// Rebuild every button for `rows` and push the layout to the host.
    pub fn create_buttons(&mut self, host: &mut dyn Shell, rows: Rows) {
        self.hover.cancel();
        self.buttons.clear();
        self.grid = WorkspaceGrid::new(rows, host.n_workspaces());
        let active = host.active_workspace_index();
        self.buttons = self
            .grid
            .slot_indices(active)
            .into_iter()
            .enumerate()
            .map(|(slot, index)| WorkspaceButton::new(host, slot, index))
            .collect();
        host.override_workspace_layout(LayoutOverride::grid(
            self.grid.rows(),
            self.grid.columns(),
        ));
        tracing::debug!(
            rows = self.grid.rows(),
            columns = self.grid.columns(),
            count = self.grid.count(),
            "workspace buttons rebuilt"
        );
    }

    /// Rebind existing buttons after a workspace switch.
    pub fn update_buttons(&mut self, host: &dyn Shell) {
        let grid = self.live_grid(host);
        let first = grid.first_in_row(host.active_workspace_index());
        for (offset, button) in self.buttons.iter_mut().enumerate() {
            let index = first + offset;
            if grid.contains(index) {
                button.set_index(host, index);
            } else {
                button.unbind();
            }
        }
    }

    pub fn handle_signal(
        &mut self,
        host: &mut dyn Shell,
        rows: Rows,
        id: SubscriptionId,
        event: &HostEvent,
    ) -> bool {
        let Some(route) = self.subs.route(id) else {
            return false;
        };
        match (route, event) {
            (SwitcherRoute::WorkspaceCount, HostEvent::WorkspaceCountChanged) => {
                self.create_buttons(host, rows)
            }
            (SwitcherRoute::SwitchWorkspace, HostEvent::SwitchWorkspace { .. }) => {
                self.update_buttons(host)
            }
            (route, event) => {
                tracing::warn!(?route, ?event, "delivery does not match subscription");
            }
        }
        true
    }

    fn activate(host: &mut dyn Shell, target: Option<usize>) -> bool {
        match target {
            Some(index) => {
                host.activate_workspace(index);
                true
            }
            None => false,
        }
    }

    /// Scroll over the buttons: step within the active row.
    pub fn scroll(&mut self, host: &mut dyn Shell, direction: ScrollDirection) -> bool {
        let grid = self.live_grid(host);
        let target = grid.scroll_step(host.active_workspace_index(), direction);
        Self::activate(host, target)
    }

    /// Primary click on the row indicator at `y` of `height`.
    pub fn click_row(
        &mut self,
        host: &mut dyn Shell,
        button: PointerButton,
        y: f64,
        height: f64,
    ) -> bool {
        if button != PointerButton::Primary {
            return false;
        }
        let grid = self.live_grid(host);
        let target = grid.row_at(host.active_workspace_index(), y, height);
        Self::activate(host, target)
    }

    /// Scroll over the row indicator: step to the adjacent row.
    pub fn scroll_row(&mut self, host: &mut dyn Shell, direction: ScrollDirection) -> bool {
        let grid = self.live_grid(host);
        let target = grid.row_step(host.active_workspace_index(), direction);
        Self::activate(host, target)
    }

    pub fn click_button(&mut self, host: &mut dyn Shell, slot: usize) -> bool {
        self.buttons
            .get(slot)
            .is_some_and(|button| button.click(host))
    }

    pub fn dialog(&self) -> Option<&WorkspaceDialog> {
        self.dialog.as_ref()
    }

    pub fn dialog_mut(&mut self) -> Option<&mut WorkspaceDialog> {
        self.dialog.as_mut()
    }

    pub fn open_dialog(&mut self, host: &dyn Shell, rows: Rows, settings: &dyn SettingsStore) {
        self.hover.cancel();
        for button in &mut self.buttons {
            button.hide_tooltip();
        }
        self.dialog = Some(WorkspaceDialog::open(host, rows, settings));
    }

    /// Close the dialog, applying it on [`DialogAction::Apply`]. Returns the
    /// new row count when the user changed it.
    pub fn finish_dialog(
        &mut self,
        host: &mut dyn Shell,
        rows: Rows,
        action: DialogAction,
    ) -> Option<Rows> {
        let dialog = self.dialog.take()?;
        match action {
            DialogAction::Apply => dialog.apply(host, rows),
            DialogAction::Cancel => None,
        }
    }

    pub fn hover(&mut self, slot: usize, hovered: bool, now: Instant) {
        if let Some(command) = self.hover.hover_changed(slot, hovered, now) {
            self.apply_tooltip(command);
        }
    }

    pub fn tick(&mut self, now: Instant) {
        if let Some(command) = self.hover.tick(now) {
            self.apply_tooltip(command);
        }
    }

    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        self.hover.next_deadline(now)
    }

    fn apply_tooltip(&mut self, command: TooltipCommand<usize>) {
        match command {
            TooltipCommand::Show(slot) => {
                for button in &mut self.buttons {
                    button.hide_tooltip();
                }
                if let Some(button) = self.buttons.get_mut(slot) {
                    button.show_tooltip();
                }
            }
            TooltipCommand::Hide(slot) => {
                if let Some(button) = self.buttons.get_mut(slot) {
                    button.hide_tooltip();
                }
            }
        }
    }

    pub fn tooltip_button(&self) -> Option<&WorkspaceButton> {
        self.buttons.iter().find(|button| button.tooltip_visible())
    }

    /// Release subscriptions and timers.
    pub fn destroy(mut self, host: &mut dyn Shell) {
        self.hover.cancel();
        self.dialog = None;
        self.buttons.clear();
        self.subs.release_all(host);
    }

    pub fn preferred_width(&self) -> u16 {
        let indicator = if self.has_row_indicator() {
            ROW_INDICATOR_WIDTH
        } else {
            0
        };
        indicator + WORKSPACE_BUTTON_WIDTH * self.buttons.len() as u16
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, active: usize) {
        self.area = area;
        self.indicator = Rect::default();
        if area.width == 0 || area.height == 0 {
            return;
        }
        let mut x = area.x;
        let max_x = area.x.saturating_add(area.width);
        let buffer = frame.buffer_mut();
        if self.has_row_indicator() {
            self.indicator = Rect {
                x,
                y: area.y,
                width: ROW_INDICATOR_WIDTH,
                height: area.height,
            };
            let active_row = self.grid.row_of(active);
            let rows = self.grid.rows() as u16;
            for row in 0..rows {
                let y = area.y + (row + 1) * area.height / (rows + 1);
                let color = if row as usize == active_row {
                    crate::theme::row_indicator_active_fg()
                } else {
                    crate::theme::row_indicator_fg()
                };
                safe_set_string(buffer, area, x, y, "─", Style::default().fg(color));
            }
            x = x.saturating_add(ROW_INDICATOR_WIDTH);
        }
        let y = area.y.saturating_add(area.height.saturating_sub(1));
        for button in &mut self.buttons {
            if x >= max_x {
                button.set_rect(Rect::default());
                continue;
            }
            let rect = Rect {
                x,
                y,
                width: WORKSPACE_BUTTON_WIDTH.min(max_x - x),
                height: 1,
            };
            let style = if button.outlined() {
                Style::default()
                    .bg(crate::theme::workspace_outlined_bg())
                    .fg(crate::theme::workspace_outlined_fg())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(crate::theme::workspace_fg())
            };
            let text = format!("{:^width$}", button.label(), width = rect.width as usize);
            safe_set_string(buffer, rect, rect.x, rect.y, &text, style);
            button.set_rect(rect);
            x = x.saturating_add(WORKSPACE_BUTTON_WIDTH);
        }
    }

    pub fn hit_test(&self, column: u16, row: u16) -> Option<SwitcherHit> {
        if !rect_contains(self.area, column, row) {
            return None;
        }
        if rect_contains(self.indicator, column, row) {
            return Some(SwitcherHit::RowIndicator {
                y: f64::from(row - self.indicator.y) + 0.5,
                height: f64::from(self.indicator.height),
            });
        }
        Some(
            self.buttons
                .iter()
                .find(|button| rect_contains(button.rect(), column, row))
                .map_or(SwitcherHit::Background, |button| {
                    SwitcherHit::Button(button.slot())
                }),
        )
    }
}
