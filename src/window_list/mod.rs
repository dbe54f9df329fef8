//! Mirror of the active workspace's windows.
//!
//! The list is rebuilt from scratch whenever the active workspace changes and
//! is patched incrementally on window-added/removed events for the active
//! workspace. Entries are keyed by [`WindowId`]; display order is creation
//! order at rebuild time, then append order.

pub mod item;
pub mod menu;

use std::collections::HashMap;
use std::time::Instant;

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use crate::grid::WorkspaceGrid;
use crate::input::PointerButton;
use crate::shell::{HostEvent, Shell, Signal, SubscriptionId, WindowId, WorkspaceId};
use crate::signals::Subscriptions;
use crate::tooltip::{HoverDebouncer, Tooltip, TooltipCommand};
use crate::ui::{UiFrame, ellipsize, rect_contains, safe_set_string};

pub use item::{ItemClick, WindowListItem};
pub use menu::{MenuEntry, MenuItem, WindowMenu};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListRoute {
    FocusApp,
    SwitchWorkspace,
    Minimize,
    Map,
    WorkspaceCount,
    WindowAdded(WorkspaceId),
    WindowRemoved(WorkspaceId),
}

#[derive(Debug)]
pub struct WindowList {
    items: HashMap<WindowId, WindowListItem>,
    order: Vec<WindowId>,
    workspaces: Vec<WorkspaceId>,
    subs: Subscriptions<ListRoute>,
    hover: HoverDebouncer<WindowId>,
    open_menu: Option<WindowId>,
    area: Rect,
    menu_hits: Vec<(MenuEntry, Rect)>,
}

impl WindowList {
    pub fn new(host: &mut dyn Shell) -> Self {
        let mut subs = Subscriptions::new();
        subs.connect(host, Signal::FocusAppChanged, ListRoute::FocusApp);
        subs.connect(host, Signal::SwitchWorkspace, ListRoute::SwitchWorkspace);
        subs.connect(host, Signal::Minimize, ListRoute::Minimize);
        subs.connect(host, Signal::Map, ListRoute::Map);
        subs.connect(host, Signal::WorkspaceCountChanged, ListRoute::WorkspaceCount);
        let mut list = Self {
            items: HashMap::new(),
            order: Vec::new(),
            workspaces: Vec::new(),
            subs,
            hover: HoverDebouncer::new(),
            open_menu: None,
            area: Rect::default(),
            menu_hits: Vec::new(),
        };
        list.change_workspaces(host);
        list.refresh_items(host);
        list
    }

    /// Tracked windows in display order.
    pub fn windows(&self) -> &[WindowId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn item(&self, window: WindowId) -> Option<&WindowListItem> {
        self.items.get(&window)
    }

    pub fn items(&self) -> impl Iterator<Item = &WindowListItem> {
        self.order.iter().filter_map(|id| self.items.get(id))
    }

    /// Workspaces currently watched for window-added/removed.
    pub fn watched_workspaces(&self) -> &[WorkspaceId] {
        &self.workspaces
    }

    pub fn open_menu(&self) -> Option<WindowId> {
        self.open_menu
    }

    pub fn owns(&self, id: SubscriptionId) -> bool {
        self.subs.owns(id)
    }

    /// Route one delivery. Returns false when the subscription is not ours.
    pub fn handle_signal(
        &mut self,
        host: &mut dyn Shell,
        id: SubscriptionId,
        event: &HostEvent,
    ) -> bool {
        let Some(route) = self.subs.route(id) else {
            return self.handle_item_signal(host, id, event);
        };
        match (route, event) {
            (ListRoute::FocusApp, HostEvent::FocusAppChanged) => self.on_focus(host),
            (ListRoute::SwitchWorkspace, HostEvent::SwitchWorkspace { .. }) => {
                self.refresh_items(host)
            }
            (ListRoute::Minimize, HostEvent::Minimize(window)) => self.on_minimize(*window),
            (ListRoute::Map, HostEvent::Map(window)) => self.on_map(*window),
            (ListRoute::WorkspaceCount, HostEvent::WorkspaceCountChanged) => {
                self.change_workspaces(host)
            }
            (ListRoute::WindowAdded(_), HostEvent::WindowAdded { workspace, window }) => {
                self.window_added(host, *workspace, *window)
            }
            (ListRoute::WindowRemoved(_), HostEvent::WindowRemoved { workspace, window }) => {
                self.window_removed(host, *workspace, *window)
            }
            (route, event) => {
                tracing::warn!(?route, ?event, "delivery does not match subscription");
            }
        }
        true
    }

    fn handle_item_signal(
        &mut self,
        host: &mut dyn Shell,
        id: SubscriptionId,
        event: &HostEvent,
    ) -> bool {
        let HostEvent::TitleChanged(window) = event else {
            return false;
        };
        match self.items.get_mut(window) {
            Some(item) if item.owns(id) => {
                item.on_title_changed(host);
                true
            }
            _ => false,
        }
    }

    fn on_focus(&mut self, host: &dyn Shell) {
        for item in self.items.values_mut() {
            item.sync_focus(host);
        }
    }

    fn on_minimize(&mut self, window: WindowId) {
        if let Some(item) = self.items.get_mut(&window) {
            item.do_minimize();
        }
    }

    fn on_map(&mut self, window: WindowId) {
        if let Some(item) = self.items.get_mut(&window) {
            item.do_map();
        }
    }

    fn is_active(host: &dyn Shell, workspace: WorkspaceId) -> bool {
        host.workspace_index(workspace) == Some(host.active_workspace_index())
    }

    /// Create an entry for `window` if it is interesting and has an app.
    fn add_list_item(&mut self, host: &mut dyn Shell, window: WindowId) {
        if !host.is_window_interesting(window) {
            return;
        }
        let Some(app) = host.window_app(window) else {
            tracing::trace!(window_id = %window, "no owning application; skipped");
            return;
        };
        let Some(info) = host.window_info(window) else {
            return;
        };
        let item = WindowListItem::new(host, app, window, &info);
        self.items.insert(window, item);
        self.order.push(window);
    }

    fn destroy_item(&mut self, host: &mut dyn Shell, window: WindowId) {
        let Some(item) = self.items.remove(&window) else {
            return;
        };
        self.order.retain(|id| *id != window);
        self.hover.forget(window);
        if self.open_menu == Some(window) {
            self.open_menu = None;
        }
        item.destroy(host);
    }

    fn destroy_all(&mut self, host: &mut dyn Shell) {
        for window in std::mem::take(&mut self.order) {
            if let Some(item) = self.items.remove(&window) {
                self.hover.forget(window);
                item.destroy(host);
            }
        }
        self.items.clear();
        self.open_menu = None;
    }

    /// Rebuild every entry from the active workspace.
    pub fn refresh_items(&mut self, host: &mut dyn Shell) {
        self.destroy_all(host);
        let active = host.active_workspace_index();
        let Some(workspace) = host.workspace_by_index(active) else {
            return;
        };
        let mut windows: Vec<(u64, WindowId)> = host
            .list_windows(workspace)
            .into_iter()
            .filter_map(|w| host.window_info(w).map(|info| (info.stable_sequence, w)))
            .collect();
        windows.sort_by_key(|(seq, _)| *seq);
        for (_, window) in windows {
            self.add_list_item(host, window);
        }
        self.on_focus(host);
        tracing::debug!(workspace = active, windows = self.order.len(), "window list rebuilt");
    }

    fn window_added(&mut self, host: &mut dyn Shell, workspace: WorkspaceId, window: WindowId) {
        if !Self::is_active(host, workspace) {
            return;
        }
        if self.items.contains_key(&window) {
            tracing::trace!(window_id = %window, "duplicate window-added ignored");
            return;
        }
        self.add_list_item(host, window);
    }

    fn window_removed(&mut self, host: &mut dyn Shell, workspace: WorkspaceId, window: WindowId) {
        if !Self::is_active(host, workspace) {
            return;
        }
        self.destroy_item(host, window);
    }

    /// Re-subscribe to window-added/removed on the current workspace set.
    fn change_workspaces(&mut self, host: &mut dyn Shell) {
        let current: Vec<WorkspaceId> = (0..host.n_workspaces())
            .filter_map(|index| host.workspace_by_index(index))
            .collect();
        // Surviving workspaces keep their subscription ids so deliveries
        // already queued against them still route.
        let released = self.subs.release_where(host, |route| match route {
            ListRoute::WindowAdded(ws) | ListRoute::WindowRemoved(ws) => !current.contains(ws),
            _ => false,
        });
        let mut connected = 0;
        for &workspace in &current {
            if self.workspaces.contains(&workspace) {
                continue;
            }
            self.subs.connect(
                host,
                Signal::WindowAdded(workspace),
                ListRoute::WindowAdded(workspace),
            );
            self.subs.connect(
                host,
                Signal::WindowRemoved(workspace),
                ListRoute::WindowRemoved(workspace),
            );
            connected += 1;
        }
        self.workspaces = current;
        tracing::debug!(
            released,
            connected,
            watched = self.workspaces.len(),
            "workspace subscriptions refreshed"
        );
    }

    pub fn hover(&mut self, window: WindowId, hovered: bool, now: Instant) {
        let menu_open = self
            .items
            .get(&window)
            .is_some_and(|item| item.menu().is_open());
        if menu_open {
            if let Some(item) = self.items.get_mut(&window) {
                item.hide_tooltip();
            }
            return;
        }
        if let Some(command) = self.hover.hover_changed(window, hovered, now) {
            self.apply_tooltip(command);
        }
    }

    pub fn tick(&mut self, now: Instant) {
        if let Some(command) = self.hover.tick(now) {
            self.apply_tooltip(command);
        }
    }

    pub fn next_deadline(&self, now: Instant) -> Option<std::time::Duration> {
        self.hover.next_deadline(now)
    }

    fn apply_tooltip(&mut self, command: TooltipCommand<WindowId>) {
        match command {
            TooltipCommand::Show(window) => {
                for item in self.items.values_mut() {
                    item.hide_tooltip();
                }
                if let Some(item) = self.items.get_mut(&window) {
                    item.show_tooltip();
                }
            }
            TooltipCommand::Hide(window) => {
                if let Some(item) = self.items.get_mut(&window) {
                    item.hide_tooltip();
                }
            }
        }
    }

    /// The entry whose tooltip is up, if any.
    pub fn tooltip_item(&self) -> Option<&WindowListItem> {
        self.items().find(|item| item.tooltip_visible())
    }

    pub fn click(
        &mut self,
        host: &mut dyn Shell,
        grid: &WorkspaceGrid,
        window: WindowId,
        button: PointerButton,
    ) -> ItemClick {
        if let Some(other) = self.open_menu.filter(|open| *open != window) {
            if let Some(item) = self.items.get_mut(&other) {
                item.menu_mut().close();
            }
            self.open_menu = None;
        }
        let Some(item) = self.items.get_mut(&window) else {
            return ItemClick::Ignored;
        };
        let outcome = item.click(host, grid, button);
        match outcome {
            ItemClick::MenuOpened => self.open_menu = Some(window),
            ItemClick::MenuClosed => self.open_menu = None,
            _ => {}
        }
        outcome
    }

    pub fn close_menu(&mut self) {
        if let Some(window) = self.open_menu.take()
            && let Some(item) = self.items.get_mut(&window)
        {
            item.menu_mut().close();
        }
    }

    pub fn activate_menu_entry(
        &mut self,
        host: &mut dyn Shell,
        grid: &WorkspaceGrid,
        entry: MenuEntry,
    ) {
        let Some(window) = self.open_menu.take() else {
            return;
        };
        if let Some(item) = self.items.get_mut(&window) {
            item.activate_menu_entry(entry, host, grid);
        }
    }

    pub fn move_menu_selection(&mut self, delta: isize) {
        if let Some(window) = self.open_menu
            && let Some(item) = self.items.get_mut(&window)
        {
            item.menu_mut().move_selection(delta);
        }
    }

    pub fn activate_selected_menu_entry(&mut self, host: &mut dyn Shell, grid: &WorkspaceGrid) {
        let selected = self
            .open_menu
            .and_then(|window| self.items.get(&window))
            .and_then(|item| item.menu().selected());
        if let Some(entry) = selected {
            self.activate_menu_entry(host, grid, entry);
        }
    }

    /// Release every subscription and entry.
    pub fn destroy(mut self, host: &mut dyn Shell) {
        self.destroy_all(host);
        self.hover.cancel();
        self.subs.release_all(host);
        self.workspaces.clear();
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect) {
        self.area = area;
        if area.width == 0 || area.height == 0 {
            return;
        }
        let count = self.order.len();
        if count == 0 {
            return;
        }
        let y = area.y.saturating_add(area.height.saturating_sub(1));
        let slot = (area.width as usize / count).clamp(4, 32) as u16;
        let mut x = area.x;
        let max_x = area.x.saturating_add(area.width);
        let order = self.order.clone();
        for window in order {
            let Some(item) = self.items.get_mut(&window) else {
                continue;
            };
            if x >= max_x {
                item.set_rect(Rect::default());
                continue;
            }
            let width = slot.min(max_x - x);
            let text = format!(
                " {} {}",
                item.app().icon,
                ellipsize(item.label(), width.saturating_sub(4) as usize)
            );
            let mut style = if item.focused() {
                Style::default()
                    .bg(crate::theme::item_focused_bg())
                    .fg(crate::theme::item_focused_fg())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(crate::theme::panel_fg())
            };
            if item.icon_dimmed() {
                style = style.add_modifier(Modifier::DIM);
            }
            let rect = Rect {
                x,
                y,
                width,
                height: 1,
            };
            let buffer = frame.buffer_mut();
            safe_set_string(buffer, rect, x, y, &text, style);
            item.set_rect(rect);
            x = x.saturating_add(width);
        }
    }

    pub fn hit_test(&self, column: u16, row: u16) -> Option<WindowId> {
        self.items()
            .find(|item| rect_contains(item.rect(), column, row))
            .map(|item| item.window())
    }

    /// Draw the open menu upwards from its entry.
    pub fn render_menu(&mut self, frame: &mut UiFrame<'_>, bounds: Rect) {
        self.menu_hits.clear();
        let Some(item) = self.open_menu.and_then(|window| self.items.get(&window)) else {
            return;
        };
        let menu = item.menu();
        let rows: Vec<&MenuItem> = menu.visible_items().collect();
        let labels: Vec<String> = rows
            .iter()
            .map(|entry| match entry.toggle {
                Some(true) => format!("[x] {}", entry.label),
                Some(false) => format!("[ ] {}", entry.label),
                None => format!("    {}", entry.label),
            })
            .collect();
        let width = labels
            .iter()
            .map(|l| l.chars().count() as u16)
            .max()
            .unwrap_or(1)
            .saturating_add(4);
        let height = labels.len() as u16 + 2;
        let anchor = item.rect();
        if anchor.y < bounds.y.saturating_add(height) {
            return;
        }
        let x = anchor
            .x
            .min(bounds.x.saturating_add(bounds.width).saturating_sub(width));
        let rect = Rect {
            x,
            y: anchor.y - height,
            width,
            height,
        };
        let selected = menu.selected();
        let menu_style = Style::default()
            .bg(crate::theme::menu_bg())
            .fg(crate::theme::menu_fg());
        let selected_style = Style::default()
            .bg(crate::theme::menu_selected_bg())
            .fg(crate::theme::menu_selected_fg())
            .add_modifier(Modifier::BOLD);
        frame.fill(rect, menu_style);
        let buffer = frame.buffer_mut();
        let mut hits = Vec::with_capacity(rows.len());
        for (idx, (entry, label)) in rows.iter().zip(labels.iter()).enumerate() {
            let y = rect.y + 1 + idx as u16;
            let style = if Some(entry.entry) == selected {
                selected_style
            } else {
                menu_style
            };
            safe_set_string(buffer, rect, rect.x + 2, y, label, style);
            hits.push((
                entry.entry,
                Rect {
                    x: rect.x,
                    y,
                    width,
                    height: 1,
                },
            ));
        }
        self.menu_hits = hits;
    }

    pub fn hit_test_menu(&self, column: u16, row: u16) -> Option<MenuEntry> {
        self.menu_hits
            .iter()
            .find(|(_, rect)| rect_contains(*rect, column, row))
            .map(|(entry, _)| *entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Rows;
    use crate::sim::SimShell;
    use std::time::Duration;

    fn pump(host: &mut SimShell, list: &mut WindowList) {
        while let Some((id, event)) = host.next_delivery() {
            list.handle_signal(host, id, &event);
        }
    }

    #[test]
    fn initial_scan_sorted_by_creation_and_filtered() {
        let mut host = SimShell::new(2);
        let b = host.add_window(0, "b", "B");
        let a = host.add_window(0, "a", "A");
        let _other = host.add_window(1, "c", "C");
        let dock = host.add_window(0, "dock", "Dock");
        host.set_interesting(dock, false);
        let orphan = host.add_window(0, "x", "Orphan");
        host.set_app(orphan, None);
        host.clear_deliveries();
        let list = WindowList::new(&mut host);
        assert_eq!(list.windows(), &[b, a]);
        list.destroy(&mut host);
        assert_eq!(host.live_subscriptions(), 0);
    }

    #[test]
    fn add_remove_only_for_active_workspace() {
        let mut host = SimShell::new(2);
        let mut list = WindowList::new(&mut host);
        let a = host.add_window(0, "a", "A");
        let b = host.add_window(1, "b", "B");
        pump(&mut host, &mut list);
        assert_eq!(list.windows(), &[a]);
        host.close_window(b);
        pump(&mut host, &mut list);
        assert_eq!(list.windows(), &[a]);
        host.close_window(a);
        pump(&mut host, &mut list);
        assert!(list.is_empty());
        list.destroy(&mut host);
    }

    #[test]
    fn duplicate_add_and_untracked_remove_are_noops() {
        let mut host = SimShell::new(1);
        let mut list = WindowList::new(&mut host);
        let a = host.add_window(0, "a", "A");
        host.emit_window_added(0, a);
        pump(&mut host, &mut list);
        assert_eq!(list.len(), 1);
        host.emit_window_removed(0, crate::shell::WindowId(999));
        pump(&mut host, &mut list);
        assert_eq!(list.len(), 1);
        list.destroy(&mut host);
    }

    #[test]
    fn switch_rebuilds_from_new_workspace() {
        let mut host = SimShell::new(2);
        let _a = host.add_window(0, "a", "A");
        let b = host.add_window(1, "b", "B");
        let c = host.add_window(1, "c", "C");
        host.clear_deliveries();
        let mut list = WindowList::new(&mut host);
        host.activate_workspace(1);
        pump(&mut host, &mut list);
        assert_eq!(list.windows(), &[b, c]);
        list.destroy(&mut host);
    }

    #[test]
    fn minimize_and_map_toggle_styling() {
        let mut host = SimShell::new(1);
        let a = host.add_window(0, "a", "A");
        host.clear_deliveries();
        let mut list = WindowList::new(&mut host);
        host.minimize_window(a);
        pump(&mut host, &mut list);
        assert_eq!(list.item(a).unwrap().label(), "[A]");
        host.activate_window(a);
        pump(&mut host, &mut list);
        assert_eq!(list.item(a).unwrap().label(), "A");
        assert!(list.item(a).unwrap().focused());
        list.destroy(&mut host);
    }

    #[test]
    fn workspace_count_change_resubscribes_without_rebuild() {
        let mut host = SimShell::new(2);
        let mut list = WindowList::new(&mut host);
        let live = host.live_subscriptions();
        host.append_workspace();
        pump(&mut host, &mut list);
        assert_eq!(list.watched_workspaces().len(), 3);
        assert_eq!(host.live_subscriptions(), live + 2);
        host.remove_workspace(2);
        host.remove_workspace(1);
        pump(&mut host, &mut list);
        assert_eq!(list.watched_workspaces().len(), 1);
        assert_eq!(host.live_subscriptions(), live - 2);
        list.destroy(&mut host);
    }

    #[test]
    fn window_events_queued_behind_count_change_still_route() {
        let mut host = SimShell::new(2);
        let mut list = WindowList::new(&mut host);
        host.append_workspace();
        let a = host.add_window(0, "a", "A");
        pump(&mut host, &mut list);
        assert_eq!(list.windows(), &[a]);

        host.append_workspace();
        host.close_window(a);
        pump(&mut host, &mut list);
        assert!(list.is_empty());
        assert_eq!(list.watched_workspaces().len(), 4);
        list.destroy(&mut host);
        assert_eq!(host.live_subscriptions(), 0);
    }

    #[test]
    fn workspace_removal_keeps_surviving_workspace_routes() {
        let mut host = SimShell::new(3);
        let mut list = WindowList::new(&mut host);
        let live = host.live_subscriptions();
        host.remove_workspace(2);
        let a = host.add_window(0, "a", "A");
        pump(&mut host, &mut list);
        assert_eq!(list.windows(), &[a]);
        assert_eq!(list.watched_workspaces().len(), 2);
        // two fewer workspace routes, one title route for the new entry
        assert_eq!(host.live_subscriptions(), live - 2 + 1);
        list.destroy(&mut host);
    }

    #[test]
    fn hover_on_item_with_open_menu_hides_tooltip() {
        let mut host = SimShell::new(1);
        let a = host.add_window(0, "a", "A");
        host.clear_deliveries();
        let grid = WorkspaceGrid::new(Rows::ONE, 1);
        let mut list = WindowList::new(&mut host);
        let t0 = Instant::now();
        list.hover(a, true, t0);
        list.tick(t0 + Duration::from_millis(300));
        assert!(list.tooltip_item().is_some());
        list.click(&mut host, &grid, a, PointerButton::Secondary);
        assert_eq!(list.open_menu(), Some(a));
        list.hover(a, true, t0 + Duration::from_millis(400));
        assert!(list.tooltip_item().is_none());
        list.destroy(&mut host);
    }

    #[test]
    fn opening_second_menu_closes_first() {
        let mut host = SimShell::new(1);
        let a = host.add_window(0, "a", "A");
        let b = host.add_window(0, "b", "B");
        host.clear_deliveries();
        let grid = WorkspaceGrid::new(Rows::ONE, 1);
        let mut list = WindowList::new(&mut host);
        list.click(&mut host, &grid, a, PointerButton::Secondary);
        list.click(&mut host, &grid, b, PointerButton::Secondary);
        assert_eq!(list.open_menu(), Some(b));
        assert!(!list.item(a).unwrap().menu().is_open());
        list.destroy(&mut host);
    }
}
