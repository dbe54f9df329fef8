use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::Style;

use crate::compat::{self, SwitcherPopup, WorkspaceBinding};
use crate::config::{Rows, RowsStore, SettingsStore};
use crate::grid::ScrollDirection;
use crate::input::PointerButton;
use crate::message_button::MessageButton;
use crate::shell::{HostEvent, LayoutOverride, Monitor, Shell, Signal, SubscriptionId, WindowId};
use crate::signals::Subscriptions;
use crate::theme::{MESSAGE_BUTTON_WIDTH, PANEL_BASE_HEIGHT};
use crate::tooltip::{TextDirection, Tooltip, tooltip_x};
use crate::ui::{UiFrame, rect_contains, safe_set_string};
use crate::window_list::WindowList;
use crate::workspace::{SwitcherHit, WorkspaceSwitcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PanelRoute {
    Monitors,
    SessionMode,
}

/// Child under the pointer, for hover tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HoverTarget {
    Item(WindowId),
    Button(usize),
}

/// The bar: window list on the left, workspace switcher and tray toggle on
/// the right, pinned to the bottom edge of the primary monitor.
pub struct BottomPanel {
    rows: Rows,
    rows_store: Box<dyn RowsStore>,
    settings: Box<dyn SettingsStore>,
    list: WindowList,
    switcher: WorkspaceSwitcher,
    message: MessageButton,
    popup: SwitcherPopup,
    subs: Subscriptions<PanelRoute>,
    visible: bool,
    monitor: Monitor,
    rect: Rect,
    direction: TextDirection,
    hovered: Option<HoverTarget>,
}

impl BottomPanel {
    /// Load the row setting, build every component and place the bar.
    pub fn enable(
        host: &mut dyn Shell,
        rows_store: Box<dyn RowsStore>,
        settings: Box<dyn SettingsStore>,
    ) -> Self {
        let rows = rows_store.load().unwrap_or_default();
        let mut subs = Subscriptions::new();
        subs.connect(host, Signal::MonitorsChanged, PanelRoute::Monitors);
        subs.connect(host, Signal::SessionModeUpdated, PanelRoute::SessionMode);
        let list = WindowList::new(host);
        let switcher = WorkspaceSwitcher::new(host, rows);
        let message = MessageButton::new(host);
        let mut panel = Self {
            rows,
            rows_store,
            settings,
            list,
            switcher,
            message,
            popup: SwitcherPopup::new(),
            subs,
            visible: host.session_has_workspaces(),
            monitor: Monitor::default(),
            rect: Rect::default(),
            direction: TextDirection::LeftToRight,
            hovered: None,
        };
        panel.relayout(host);
        tracing::debug!(rows = %rows, "panel enabled");
        panel
    }

    /// Release every subscription and timer and hand the workspace layout
    /// back to the window manager.
    pub fn disable(mut self, host: &mut dyn Shell) {
        self.popup.hide();
        self.list.destroy(host);
        self.switcher.destroy(host);
        self.message.destroy(host);
        self.subs.release_all(host);
        host.override_workspace_layout(LayoutOverride::reset());
        tracing::debug!("panel disabled");
    }

    pub fn rows(&self) -> Rows {
        self.rows
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn height(&self) -> u16 {
        PANEL_BASE_HEIGHT.max(self.rows.get() as u16)
    }

    /// Bar rectangle in monitor coordinates.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn window_list(&self) -> &WindowList {
        &self.list
    }

    pub fn switcher(&self) -> &WorkspaceSwitcher {
        &self.switcher
    }

    pub fn message_button(&self) -> &MessageButton {
        &self.message
    }

    pub fn popup(&self) -> &SwitcherPopup {
        &self.popup
    }

    pub fn set_text_direction(&mut self, direction: TextDirection) {
        self.direction = direction;
    }

    /// Target y of the tray so it clears the bar.
    pub fn tray_target_y(&self, tray_height: i32) -> i32 {
        compat::tray_target_y(tray_height, i32::from(self.height()))
    }

    /// Re-read the primary monitor and pin the bar to its bottom edge.
    pub fn relayout(&mut self, host: &dyn Shell) {
        self.monitor = host.primary_monitor();
        self.rect = panel_rect(self.monitor, self.height());
        tracing::trace!(rect = ?self.rect, "panel relayout");
    }

    /// Route one host delivery to whichever component owns it.
    pub fn dispatch(&mut self, host: &mut dyn Shell, id: SubscriptionId, event: &HostEvent) {
        if let Some(route) = self.subs.route(id) {
            match route {
                PanelRoute::Monitors => self.relayout(host),
                PanelRoute::SessionMode => {
                    self.visible = host.session_has_workspaces();
                    tracing::debug!(visible = self.visible, "session mode updated");
                }
            }
            return;
        }
        let handled = self.list.handle_signal(host, id, event)
            || self.switcher.handle_signal(host, self.rows, id, event)
            || self.message.handle_signal(host, id, event);
        if !handled {
            tracing::trace!(subscription = %id, ?event, "dropping stale delivery");
        }
    }

    /// Run a `switch-to-workspace-*` / `move-to-workspace-*` keybinding.
    pub fn keybinding(&mut self, host: &mut dyn Shell, name: &str, now: Instant) -> Option<usize> {
        let binding = match name.parse::<WorkspaceBinding>() {
            Ok(binding) => binding,
            Err(err) => {
                tracing::debug!(%err, "keybinding ignored");
                return None;
            }
        };
        let window = host.focus_window();
        let grid = self.switcher.grid();
        compat::handle_workspace_binding(host, &grid, binding, window, &mut self.popup, now)
    }

    /// Store a changed row count and rebuild the switcher for it.
    fn apply_rows(&mut self, host: &mut dyn Shell, rows: Rows) {
        if let Err(err) = self.rows_store.save(rows) {
            tracing::warn!(%err, "failed to save rows");
        }
        self.rows = rows;
        self.switcher.create_buttons(host, rows);
        self.relayout(host);
    }

    /// Feed a terminal input event. Returns true when the panel consumed it.
    pub fn handle_event(&mut self, host: &mut dyn Shell, event: &Event, now: Instant) -> bool {
        if !self.visible {
            return false;
        }
        if let Some(dialog) = self.switcher.dialog_mut() {
            if let Some(action) = dialog.handle_event(event, self.settings.as_mut())
                && let Some(rows) = self.switcher.finish_dialog(host, self.rows, action)
            {
                self.apply_rows(host, rows);
            }
            return true;
        }
        match event {
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Moved => {
                    self.update_hover(mouse.column, mouse.row, now);
                    false
                }
                MouseEventKind::Down(button) => {
                    self.click(host, mouse.column, mouse.row, button.into())
                }
                MouseEventKind::ScrollUp => {
                    self.scroll(host, mouse.column, mouse.row, ScrollDirection::Up)
                }
                MouseEventKind::ScrollDown => {
                    self.scroll(host, mouse.column, mouse.row, ScrollDirection::Down)
                }
                _ => false,
            },
            Event::Key(key) if self.list.open_menu().is_some() => {
                let grid = self.switcher.grid();
                match key.code {
                    KeyCode::Up => self.list.move_menu_selection(-1),
                    KeyCode::Down => self.list.move_menu_selection(1),
                    KeyCode::Enter => self.list.activate_selected_menu_entry(host, &grid),
                    KeyCode::Esc => self.list.close_menu(),
                    _ => return false,
                }
                true
            }
            _ => false,
        }
    }

    fn click(&mut self, host: &mut dyn Shell, column: u16, row: u16, button: PointerButton) -> bool {
        let grid = self.switcher.grid();
        if self.list.open_menu().is_some() {
            if let Some(entry) = self.list.hit_test_menu(column, row) {
                self.list.activate_menu_entry(host, &grid, entry);
                return true;
            }
            if self.list.hit_test(column, row).is_none() {
                self.list.close_menu();
                return true;
            }
        }
        if let Some(window) = self.list.hit_test(column, row) {
            self.list.click(host, &grid, window, button);
            return true;
        }
        if rect_contains(self.message.rect(), column, row) {
            if button == PointerButton::Primary {
                self.message.click(host);
            }
            return true;
        }
        let Some(hit) = self.switcher.hit_test(column, row) else {
            return rect_contains(self.rect, column, row);
        };
        if button == PointerButton::Secondary {
            self.switcher
                .open_dialog(host, self.rows, self.settings.as_ref());
            return true;
        }
        match hit {
            SwitcherHit::Button(slot) => {
                if button == PointerButton::Primary {
                    self.switcher.click_button(host, slot);
                }
            }
            SwitcherHit::RowIndicator { y, height } => {
                self.switcher.click_row(host, button, y, height);
            }
            SwitcherHit::Background => {}
        }
        true
    }

    fn scroll(
        &mut self,
        host: &mut dyn Shell,
        column: u16,
        row: u16,
        direction: ScrollDirection,
    ) -> bool {
        match self.switcher.hit_test(column, row) {
            Some(SwitcherHit::RowIndicator { .. }) => {
                self.switcher.scroll_row(host, direction);
                true
            }
            Some(_) => {
                self.switcher.scroll(host, direction);
                true
            }
            None => false,
        }
    }

    fn update_hover(&mut self, column: u16, row: u16, now: Instant) {
        let target = self
            .list
            .hit_test(column, row)
            .map(HoverTarget::Item)
            .or_else(|| match self.switcher.hit_test(column, row) {
                Some(SwitcherHit::Button(slot)) => Some(HoverTarget::Button(slot)),
                _ => None,
            });
        if target == self.hovered {
            return;
        }
        match self.hovered {
            Some(HoverTarget::Item(window)) => self.list.hover(window, false, now),
            Some(HoverTarget::Button(slot)) => self.switcher.hover(slot, false, now),
            None => {}
        }
        match target {
            Some(HoverTarget::Item(window)) => self.list.hover(window, true, now),
            Some(HoverTarget::Button(slot)) => self.switcher.hover(slot, true, now),
            None => {}
        }
        self.hovered = target;
    }

    pub fn tick(&mut self, now: Instant) {
        self.list.tick(now);
        self.switcher.tick(now);
        self.popup.tick(now);
    }

    /// Time until the earliest pending timer.
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        [
            self.list.next_deadline(now),
            self.switcher.next_deadline(now),
            self.popup.next_deadline(now),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Draw the bar and its overlays. `frame` covers the primary monitor.
    pub fn render(&mut self, frame: &mut UiFrame<'_>) {
        let screen = frame.area();
        if self.visible {
            let bar = self.rect.intersection(screen);
            if bar.width > 0 && bar.height > 0 {
                self.render_bar(frame, bar);
                self.render_tooltip(frame, bar);
                self.list.render_menu(frame, screen);
            }
            if let Some(dialog) = self.switcher.dialog_mut() {
                dialog.render(frame, screen);
            }
        }
        self.popup
            .render(frame, screen, self.monitor, self.height());
    }

    fn render_bar(&mut self, frame: &mut UiFrame<'_>, bar: Rect) {
        frame.fill(
            bar,
            Style::default()
                .bg(crate::theme::panel_bg())
                .fg(crate::theme::panel_fg()),
        );
        let message_w = MESSAGE_BUTTON_WIDTH.min(bar.width);
        let switcher_w = self
            .switcher
            .preferred_width()
            .min(bar.width.saturating_sub(message_w));
        let list_w = bar.width.saturating_sub(message_w + switcher_w);
        let list_area = Rect {
            width: list_w,
            ..bar
        };
        let switcher_area = Rect {
            x: bar.x + list_w,
            width: switcher_w,
            ..bar
        };
        let message_area = Rect {
            x: bar.x + list_w + switcher_w,
            width: message_w,
            ..bar
        };
        self.list.render(frame, list_area);
        let active = self
            .switcher
            .buttons()
            .iter()
            .find(|button| button.outlined())
            .and_then(|button| button.index())
            .unwrap_or_default();
        self.switcher.render(frame, switcher_area, active);
        self.message.render(frame, message_area);
    }

    fn render_tooltip(&mut self, frame: &mut UiFrame<'_>, bar: Rect) {
        let tip = self
            .list
            .tooltip_item()
            .map(|item| (item.rect(), item.tooltip_text().to_string()))
            .or_else(|| {
                self.switcher
                    .tooltip_button()
                    .map(|button| (button.rect(), button.tooltip_text().to_string()))
            });
        let Some((anchor, text)) = tip else {
            return;
        };
        if text.is_empty() || bar.y == 0 {
            return;
        }
        let screen = frame.area();
        let width = (text.chars().count() as u16 + 2).min(screen.width);
        let x = tooltip_x(
            i32::from(anchor.x - screen.x),
            i32::from(anchor.width),
            i32::from(width),
            i32::from(screen.width),
            self.direction,
        )
        .max(0) as u16;
        let rect = Rect {
            x: screen.x + x,
            y: bar.y - 1,
            width,
            height: 1,
        };
        let style = Style::default()
            .bg(crate::theme::tooltip_bg())
            .fg(crate::theme::tooltip_fg());
        frame.fill(rect, style);
        safe_set_string(frame.buffer_mut(), rect, rect.x + 1, rect.y, &text, style);
    }
}

/// Bar rectangle of `height` rows along the bottom of `monitor`.
pub fn panel_rect(monitor: Monitor, height: u16) -> Rect {
    let clamp = |v: i64| v.clamp(0, i64::from(u16::MAX)) as u16;
    let height = height.min(clamp(i64::from(monitor.height)));
    let bottom = i64::from(monitor.y) + i64::from(monitor.height);
    Rect {
        x: clamp(i64::from(monitor.x)),
        y: clamp(bottom - i64::from(height)),
        width: clamp(i64::from(monitor.width)),
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MemoryRows, MemorySettings};
    use crate::sim::{SimCommand, SimShell};
    use crossterm::event::{KeyModifiers, MouseButton, MouseEvent};
    use ratatui::buffer::Buffer;

    fn rows(n: usize) -> Rows {
        Rows::new(n).unwrap()
    }

    fn enable(host: &mut SimShell, stored: Option<Rows>) -> BottomPanel {
        BottomPanel::enable(
            host,
            Box::new(MemoryRows::new(stored)),
            Box::new(MemorySettings::new()),
        )
    }

    fn pump(host: &mut SimShell, panel: &mut BottomPanel) {
        while let Some((id, event)) = host.next_delivery() {
            panel.dispatch(host, id, &event);
        }
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn draw(panel: &mut BottomPanel, host: &SimShell) -> Buffer {
        let monitor = host.primary_monitor();
        let area = Rect {
            x: 0,
            y: 0,
            width: monitor.width as u16,
            height: monitor.height as u16,
        };
        let mut buf = Buffer::empty(area);
        let mut ui = UiFrame::from_parts(area, &mut buf);
        panel.render(&mut ui);
        buf
    }

    #[test]
    fn panel_rect_sits_on_bottom_edge() {
        let monitor = Monitor {
            x: 10,
            y: 5,
            width: 100,
            height: 40,
        };
        assert_eq!(
            panel_rect(monitor, 2),
            Rect {
                x: 10,
                y: 43,
                width: 100,
                height: 2
            }
        );
        assert_eq!(panel_rect(Monitor::default(), 3).height, 0);
    }

    #[test]
    fn height_follows_rows_and_monitor_changes_relayout() {
        let mut host = SimShell::new(6);
        let mut panel = enable(&mut host, Some(rows(3)));
        assert_eq!(panel.height(), 3);
        assert_eq!(panel.rect().y, 21);
        host.set_monitor(Monitor {
            x: 0,
            y: 0,
            width: 120,
            height: 40,
        });
        pump(&mut host, &mut panel);
        assert_eq!(panel.rect().y, 37);
        assert_eq!(panel.rect().width, 120);
        assert_eq!(panel.tray_target_y(10), -13);
        panel.disable(&mut host);
    }

    #[test]
    fn visibility_follows_session_mode() {
        let mut host = SimShell::new(2);
        let mut panel = enable(&mut host, None);
        assert!(panel.visible());
        host.set_session_has_workspaces(false);
        pump(&mut host, &mut panel);
        assert!(!panel.visible());
        let click = mouse(MouseEventKind::Down(MouseButton::Left), 1, 23);
        assert!(!panel.handle_event(&mut host, &click, Instant::now()));
        panel.disable(&mut host);
    }

    #[test]
    fn disable_releases_everything_and_resets_layout() {
        let mut host = SimShell::new(4);
        host.add_window(0, "term", "shell");
        let mut panel = enable(&mut host, Some(rows(2)));
        pump(&mut host, &mut panel);
        assert!(host.live_subscriptions() > 0);
        assert_eq!(
            host.layout_override(),
            Some(LayoutOverride::grid(2, 2))
        );
        panel.disable(&mut host);
        assert_eq!(host.live_subscriptions(), 0);
        assert_eq!(host.layout_override(), Some(LayoutOverride::reset()));
    }

    #[test]
    fn clicks_reach_list_switcher_and_tray() {
        let mut host = SimShell::new(3);
        let w = host.add_window(0, "term", "shell");
        let mut panel = enable(&mut host, None);
        pump(&mut host, &mut panel);
        draw(&mut panel, &host);
        host.take_commands();
        let now = Instant::now();

        let item = panel.window_list().item(w).unwrap().rect();
        let click = mouse(MouseEventKind::Down(MouseButton::Left), item.x + 1, item.y);
        assert!(panel.handle_event(&mut host, &click, now));

        let third = panel.switcher().buttons()[2].rect();
        let click = mouse(MouseEventKind::Down(MouseButton::Left), third.x, third.y);
        assert!(panel.handle_event(&mut host, &click, now));

        let tray = panel.message_button().rect();
        let click = mouse(MouseEventKind::Down(MouseButton::Left), tray.x, tray.y);
        assert!(panel.handle_event(&mut host, &click, now));

        assert_eq!(
            host.take_commands(),
            vec![
                SimCommand::ActivateWindow(w),
                SimCommand::ActivateWorkspace(2),
                SimCommand::SetTraySummoned(true),
            ]
        );
        panel.disable(&mut host);
    }

    #[test]
    fn dialog_row_change_is_persisted_and_rebuilds() {
        let mut host = SimShell::new(6);
        let mut panel = enable(&mut host, None);
        draw(&mut panel, &host);
        let first = panel.switcher().buttons()[0].rect();
        let right = mouse(MouseEventKind::Down(MouseButton::Right), first.x, first.y);
        assert!(panel.handle_event(&mut host, &right, Instant::now()));
        assert!(panel.switcher().dialog().is_some());

        let dialog = panel.switcher.dialog_mut().unwrap();
        dialog.set_rows_text("2");
        let enter = Event::Key(crossterm::event::KeyEvent::new(
            KeyCode::Enter,
            KeyModifiers::NONE,
        ));
        assert!(panel.handle_event(&mut host, &enter, Instant::now()));
        assert!(panel.switcher().dialog().is_none());
        assert_eq!(panel.rows(), rows(2));
        assert_eq!(panel.rows_store.load(), Some(rows(2)));
        assert_eq!(panel.switcher().buttons().len(), 3);
        assert_eq!(host.layout_override(), Some(LayoutOverride::grid(2, 3)));
        assert_eq!(panel.height(), 2);
        panel.disable(&mut host);
    }

    #[test]
    fn keybinding_shows_popup_until_timeout() {
        let mut host = SimShell::new(4);
        let mut panel = enable(&mut host, Some(rows(2)));
        let t0 = Instant::now();
        assert_eq!(panel.keybinding(&mut host, "switch-to-workspace-down", t0), Some(2));
        assert_eq!(host.active_workspace_index(), 2);
        assert!(panel.popup().is_visible());
        assert!(panel.next_deadline(t0).is_some());
        panel.tick(t0 + crate::constants::SWITCHER_POPUP_TIMEOUT);
        assert!(!panel.popup().is_visible());
        assert_eq!(panel.keybinding(&mut host, "toggle-overview", t0), None);
        panel.disable(&mut host);
    }

    #[test]
    fn hover_over_button_shows_workspace_name() {
        let mut host = SimShell::new(2);
        host.set_workspace_name(1, "Mail");
        let mut panel = enable(&mut host, None);
        draw(&mut panel, &host);
        let second = panel.switcher().buttons()[1].rect();
        let t0 = Instant::now();
        let moved = mouse(MouseEventKind::Moved, second.x, second.y);
        panel.handle_event(&mut host, &moved, t0);
        panel.tick(t0 + crate::constants::HOVER_TIMEOUT);
        let tip = panel.switcher().tooltip_button().map(|b| b.tooltip_text().to_string());
        assert_eq!(tip.as_deref(), Some("Mail"));

        let buf = draw(&mut panel, &host);
        let line: String = (0..buf.area.width)
            .map(|x| buf[(x, second.y - 1)].symbol().to_string())
            .collect();
        assert!(line.contains("Mail"));
        panel.disable(&mut host);
    }

    fn wide_tooltip_column(direction: TextDirection) -> Option<u16> {
        let mut host = SimShell::new(2);
        host.set_workspace_name(1, &"w".repeat(70));
        let mut panel = enable(&mut host, None);
        panel.set_text_direction(direction);
        draw(&mut panel, &host);
        let second = panel.switcher().buttons()[1].rect();
        let t0 = Instant::now();
        panel.handle_event(&mut host, &mouse(MouseEventKind::Moved, second.x, second.y), t0);
        panel.tick(t0 + crate::constants::HOVER_TIMEOUT);
        let buf = draw(&mut panel, &host);
        panel.disable(&mut host);
        (0..buf.area.width).find(|&x| buf[(x, second.y - 1)].symbol() == "w")
    }

    #[test]
    fn oversized_tooltip_keeps_the_leading_edge_margin() {
        // 72 columns on an 80 column monitor cannot honor both margins
        assert_eq!(wide_tooltip_column(TextDirection::LeftToRight), Some(7));
        assert_eq!(wide_tooltip_column(TextDirection::RightToLeft), Some(3));
    }
}
