//! In-process stand-in for the window manager.
//!
//! `SimShell` keeps a small model of workspaces and windows, journals every
//! command it receives and queues host events against the subscriptions that
//! were live at the moment the event was emitted. Events stay queued until
//! drained, so a component that releases its subscriptions in between still
//! sees the late delivery arrive and must drop it.

use std::collections::{BTreeMap, VecDeque};

use crate::shell::{
    AppInfo, HostEvent, LayoutOverride, Monitor, MotionDirection, Shell, Signal, SubscriptionId,
    WindowId, WindowInfo, WorkspaceId,
};

/// One command received through the [`Shell`] port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimCommand {
    ActivateWindow(WindowId),
    MinimizeWindow(WindowId),
    MaximizeWindow(WindowId),
    UnmaximizeWindow(WindowId),
    MakeAbove(WindowId),
    UnmakeAbove(WindowId),
    Stick(WindowId),
    Unstick(WindowId),
    ChangeWorkspace(WindowId, usize),
    DeleteWindow(WindowId),
    ActivateWorkspace(usize),
    AppendWorkspace,
    RemoveWorkspace(usize),
    OverrideLayout(LayoutOverride),
    SetTraySummoned(bool),
}

#[derive(Debug, Clone)]
struct SimWindow {
    workspace: WorkspaceId,
    info: WindowInfo,
    app: Option<AppInfo>,
    interesting: bool,
}

#[derive(Debug)]
pub struct SimShell {
    workspaces: Vec<WorkspaceId>,
    names: BTreeMap<WorkspaceId, String>,
    active: usize,
    windows: BTreeMap<WindowId, SimWindow>,
    subscriptions: BTreeMap<SubscriptionId, Signal>,
    deliveries: VecDeque<(SubscriptionId, HostEvent)>,
    commands: Vec<SimCommand>,
    layout: Option<LayoutOverride>,
    monitor: Monitor,
    session_has_workspaces: bool,
    overview_visible: bool,
    tray_items: usize,
    tray_shown: bool,
    next_workspace: u64,
    next_window: u64,
    next_subscription: u64,
    next_sequence: u64,
}

fn display_name(app_id: &str) -> String {
    let mut chars = app_id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl SimShell {
    pub fn new(n_workspaces: usize) -> Self {
        let mut shell = Self {
            workspaces: Vec::new(),
            names: BTreeMap::new(),
            active: 0,
            windows: BTreeMap::new(),
            subscriptions: BTreeMap::new(),
            deliveries: VecDeque::new(),
            commands: Vec::new(),
            layout: None,
            monitor: Monitor {
                x: 0,
                y: 0,
                width: 80,
                height: 24,
            },
            session_has_workspaces: true,
            overview_visible: false,
            tray_items: 0,
            tray_shown: false,
            next_workspace: 1,
            next_window: 1,
            next_subscription: 1,
            next_sequence: 1,
        };
        for _ in 0..n_workspaces.max(1) {
            shell.push_workspace();
        }
        shell
    }

    fn push_workspace(&mut self) -> WorkspaceId {
        let id = WorkspaceId(self.next_workspace);
        self.next_workspace += 1;
        self.workspaces.push(id);
        id
    }

    /// Queue `event` for every live subscription to its signal.
    pub fn emit(&mut self, event: HostEvent) {
        let signal = event.signal();
        let targets: Vec<SubscriptionId> = self
            .subscriptions
            .iter()
            .filter(|(_, s)| **s == signal)
            .map(|(id, _)| *id)
            .collect();
        for id in targets {
            self.deliveries.push_back((id, event.clone()));
        }
    }

    pub fn next_delivery(&mut self) -> Option<(SubscriptionId, HostEvent)> {
        self.deliveries.pop_front()
    }

    pub fn take_deliveries(&mut self) -> Vec<(SubscriptionId, HostEvent)> {
        self.deliveries.drain(..).collect()
    }

    pub fn clear_deliveries(&mut self) {
        self.deliveries.clear();
    }

    pub fn pending_deliveries(&self) -> usize {
        self.deliveries.len()
    }

    pub fn live_subscriptions(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn subscribers(&self, signal: Signal) -> usize {
        self.subscriptions.values().filter(|s| **s == signal).count()
    }

    pub fn take_commands(&mut self) -> Vec<SimCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn layout_override(&self) -> Option<LayoutOverride> {
        self.layout
    }

    pub fn focused_window(&self) -> Option<WindowId> {
        self.windows
            .iter()
            .find(|(_, w)| w.info.has_focus)
            .map(|(id, _)| *id)
    }

    pub fn window_workspace_index(&self, window: WindowId) -> Option<usize> {
        let workspace = self.windows.get(&window)?.workspace;
        self.workspace_index(workspace)
    }

    /// Open a window on workspace `index`. The window is not focused.
    pub fn add_window(&mut self, index: usize, app_id: &str, title: &str) -> WindowId {
        let index = index.min(self.workspaces.len() - 1);
        let workspace = self.workspaces[index];
        let id = WindowId(self.next_window);
        self.next_window += 1;
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        let icon = display_name(app_id).chars().next().unwrap_or('?');
        self.windows.insert(
            id,
            SimWindow {
                workspace,
                info: WindowInfo::new(title, sequence),
                app: Some(AppInfo::new(app_id, display_name(app_id), icon)),
                interesting: true,
            },
        );
        self.emit(HostEvent::WindowAdded {
            workspace,
            window: id,
        });
        id
    }

    /// Remove a window as if it had closed on its own.
    pub fn close_window(&mut self, window: WindowId) {
        let Some(removed) = self.windows.remove(&window) else {
            return;
        };
        self.emit(HostEvent::WindowRemoved {
            workspace: removed.workspace,
            window,
        });
        if removed.info.has_focus {
            self.emit(HostEvent::FocusAppChanged);
        }
    }

    /// Mutate a window's attributes without emitting anything.
    pub fn update_window(&mut self, window: WindowId, f: impl FnOnce(&mut WindowInfo)) {
        if let Some(w) = self.windows.get_mut(&window) {
            f(&mut w.info);
        }
    }

    pub fn set_title(&mut self, window: WindowId, title: &str) {
        if let Some(w) = self.windows.get_mut(&window) {
            w.info.title = title.to_string();
            self.emit(HostEvent::TitleChanged(window));
        }
    }

    pub fn set_interesting(&mut self, window: WindowId, interesting: bool) {
        if let Some(w) = self.windows.get_mut(&window) {
            w.interesting = interesting;
        }
    }

    pub fn set_app(&mut self, window: WindowId, app: Option<AppInfo>) {
        if let Some(w) = self.windows.get_mut(&window) {
            w.app = app;
        }
    }

    pub fn set_workspace_name(&mut self, index: usize, name: &str) {
        if let Some(id) = self.workspaces.get(index) {
            self.names.insert(*id, name.to_string());
        }
    }

    /// Emit window-added on workspace `index` without touching the model.
    pub fn emit_window_added(&mut self, index: usize, window: WindowId) {
        if let Some(workspace) = self.workspaces.get(index).copied() {
            self.emit(HostEvent::WindowAdded { workspace, window });
        }
    }

    pub fn emit_window_removed(&mut self, index: usize, window: WindowId) {
        if let Some(workspace) = self.workspaces.get(index).copied() {
            self.emit(HostEvent::WindowRemoved { workspace, window });
        }
    }

    /// Switch workspaces the way a keybinding would, carrying a direction.
    pub fn switch_workspace(&mut self, index: usize, direction: Option<MotionDirection>) {
        if index >= self.workspaces.len() || index == self.active {
            return;
        }
        let from = self.active;
        self.active = index;
        self.emit(HostEvent::SwitchWorkspace {
            from,
            to: index,
            direction,
        });
    }

    pub fn set_monitor(&mut self, monitor: Monitor) {
        self.monitor = monitor;
        self.emit(HostEvent::MonitorsChanged);
    }

    pub fn set_session_has_workspaces(&mut self, has: bool) {
        self.session_has_workspaces = has;
        self.emit(HostEvent::SessionModeUpdated);
    }

    pub fn set_overview_visible(&mut self, visible: bool) {
        self.overview_visible = visible;
    }

    pub fn add_tray_item(&mut self) {
        self.tray_items += 1;
        self.emit(HostEvent::TraySummaryAdded);
    }

    pub fn remove_tray_item(&mut self) {
        if self.tray_items > 0 {
            self.tray_items -= 1;
            self.emit(HostEvent::TraySummaryRemoved);
        }
    }

    fn set_focus(&mut self, window: Option<WindowId>) {
        let mut changed = false;
        for (id, w) in self.windows.iter_mut() {
            let focus = Some(*id) == window;
            changed |= w.info.has_focus != focus;
            w.info.has_focus = focus;
        }
        if changed {
            self.emit(HostEvent::FocusAppChanged);
        }
    }
}

impl Shell for SimShell {
    fn n_workspaces(&self) -> usize {
        self.workspaces.len()
    }

    fn active_workspace_index(&self) -> usize {
        self.active
    }

    fn workspace_by_index(&self, index: usize) -> Option<WorkspaceId> {
        self.workspaces.get(index).copied()
    }

    fn workspace_index(&self, workspace: WorkspaceId) -> Option<usize> {
        self.workspaces.iter().position(|w| *w == workspace)
    }

    fn workspace_name(&self, index: usize) -> String {
        self.workspaces
            .get(index)
            .and_then(|id| self.names.get(id).cloned())
            .unwrap_or_else(|| format!("Workspace {}", index + 1))
    }

    fn list_windows(&self, workspace: WorkspaceId) -> Vec<WindowId> {
        self.windows
            .iter()
            .filter(|(_, w)| w.workspace == workspace)
            .map(|(id, _)| *id)
            .collect()
    }

    fn window_info(&self, window: WindowId) -> Option<WindowInfo> {
        self.windows.get(&window).map(|w| w.info.clone())
    }

    fn is_window_interesting(&self, window: WindowId) -> bool {
        self.windows.get(&window).is_some_and(|w| w.interesting)
    }

    fn window_app(&self, window: WindowId) -> Option<AppInfo> {
        self.windows.get(&window).and_then(|w| w.app.clone())
    }

    fn focus_window(&self) -> Option<WindowId> {
        self.focused_window()
    }

    fn primary_monitor(&self) -> Monitor {
        self.monitor
    }

    fn session_has_workspaces(&self) -> bool {
        self.session_has_workspaces
    }

    fn overview_visible(&self) -> bool {
        self.overview_visible
    }

    fn tray_summary_len(&self) -> usize {
        self.tray_items
    }

    fn tray_summary_shown(&self) -> bool {
        self.tray_shown
    }

    fn connect(&mut self, signal: Signal) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscriptions.insert(id, signal);
        id
    }

    fn disconnect(&mut self, id: SubscriptionId) {
        self.subscriptions.remove(&id);
    }

    fn activate_window(&mut self, window: WindowId) {
        self.commands.push(SimCommand::ActivateWindow(window));
        let Some(workspace) = self.windows.get(&window).map(|w| w.workspace) else {
            return;
        };
        if let Some(index) = self.workspace_index(workspace) {
            self.switch_workspace(index, None);
        }
        let was_minimized = self
            .windows
            .get_mut(&window)
            .map(|w| std::mem::replace(&mut w.info.minimized, false))
            .unwrap_or(false);
        if was_minimized {
            self.emit(HostEvent::Map(window));
        }
        self.set_focus(Some(window));
    }

    fn minimize_window(&mut self, window: WindowId) {
        self.commands.push(SimCommand::MinimizeWindow(window));
        let Some(w) = self.windows.get_mut(&window) else {
            return;
        };
        if w.info.minimized {
            return;
        }
        w.info.minimized = true;
        let had_focus = w.info.has_focus;
        self.emit(HostEvent::Minimize(window));
        if had_focus {
            self.set_focus(None);
        }
    }

    fn maximize_window(&mut self, window: WindowId) {
        self.commands.push(SimCommand::MaximizeWindow(window));
        self.update_window(window, |info| {
            info.maximized_horizontally = true;
            info.maximized_vertically = true;
        });
    }

    fn unmaximize_window(&mut self, window: WindowId) {
        self.commands.push(SimCommand::UnmaximizeWindow(window));
        self.update_window(window, |info| {
            info.maximized_horizontally = false;
            info.maximized_vertically = false;
        });
    }

    fn make_above(&mut self, window: WindowId) {
        self.commands.push(SimCommand::MakeAbove(window));
        self.update_window(window, |info| info.above = true);
    }

    fn unmake_above(&mut self, window: WindowId) {
        self.commands.push(SimCommand::UnmakeAbove(window));
        self.update_window(window, |info| info.above = false);
    }

    fn stick(&mut self, window: WindowId) {
        self.commands.push(SimCommand::Stick(window));
        self.update_window(window, |info| info.on_all_workspaces = true);
    }

    fn unstick(&mut self, window: WindowId) {
        self.commands.push(SimCommand::Unstick(window));
        self.update_window(window, |info| info.on_all_workspaces = false);
    }

    fn change_workspace(&mut self, window: WindowId, index: usize) {
        self.commands.push(SimCommand::ChangeWorkspace(window, index));
        let Some(target) = self.workspaces.get(index).copied() else {
            return;
        };
        let Some(w) = self.windows.get_mut(&window) else {
            return;
        };
        if w.workspace == target {
            return;
        }
        let source = std::mem::replace(&mut w.workspace, target);
        self.emit(HostEvent::WindowRemoved {
            workspace: source,
            window,
        });
        self.emit(HostEvent::WindowAdded {
            workspace: target,
            window,
        });
    }

    fn delete_window(&mut self, window: WindowId) {
        self.commands.push(SimCommand::DeleteWindow(window));
        self.close_window(window);
    }

    fn activate_workspace(&mut self, index: usize) {
        self.commands.push(SimCommand::ActivateWorkspace(index));
        self.switch_workspace(index, None);
    }

    fn append_workspace(&mut self) {
        self.commands.push(SimCommand::AppendWorkspace);
        self.push_workspace();
        self.emit(HostEvent::WorkspaceCountChanged);
    }

    fn remove_workspace(&mut self, index: usize) {
        self.commands.push(SimCommand::RemoveWorkspace(index));
        if index >= self.workspaces.len() || self.workspaces.len() == 1 {
            return;
        }
        let active_id = self.workspaces[self.active];
        let removed = self.workspaces.remove(index);
        self.names.remove(&removed);
        let fallback = self.workspaces[index.saturating_sub(1).min(self.workspaces.len() - 1)];
        let moved: Vec<WindowId> = self
            .windows
            .iter_mut()
            .filter(|(_, w)| w.workspace == removed)
            .map(|(id, w)| {
                w.workspace = fallback;
                *id
            })
            .collect();
        for window in moved {
            self.emit(HostEvent::WindowAdded {
                workspace: fallback,
                window,
            });
        }
        match self.workspace_index(active_id) {
            Some(still) => self.active = still,
            None => {
                let from = self.active;
                self.active = self.workspace_index(fallback).unwrap_or(0);
                self.emit(HostEvent::SwitchWorkspace {
                    from,
                    to: self.active,
                    direction: None,
                });
            }
        }
        self.emit(HostEvent::WorkspaceCountChanged);
    }

    fn override_workspace_layout(&mut self, layout: LayoutOverride) {
        self.commands.push(SimCommand::OverrideLayout(layout));
        self.layout = Some(layout);
    }

    fn set_tray_summoned(&mut self, summoned: bool) {
        self.commands.push(SimCommand::SetTraySummoned(summoned));
        self.tray_shown = summoned;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_reach_only_live_subscribers_at_emit_time() {
        let mut host = SimShell::new(2);
        let ws0 = host.workspace_by_index(0).unwrap();
        let sub = host.connect(Signal::WindowAdded(ws0));
        let _other = host.connect(Signal::Minimize);
        let w = host.add_window(0, "term", "shell");
        let late = host.connect(Signal::WindowAdded(ws0));
        let deliveries = host.take_deliveries();
        assert_eq!(
            deliveries,
            vec![(
                sub,
                HostEvent::WindowAdded {
                    workspace: ws0,
                    window: w
                }
            )]
        );
        host.disconnect(sub);
        host.disconnect(late);
        assert_eq!(host.live_subscriptions(), 1);
    }

    #[test]
    fn activate_switches_unminimizes_and_focuses() {
        let mut host = SimShell::new(2);
        let w = host.add_window(1, "term", "shell");
        host.update_window(w, |info| info.minimized = true);
        let switch = host.connect(Signal::SwitchWorkspace);
        let map = host.connect(Signal::Map);
        host.activate_window(w);
        assert_eq!(host.active_workspace_index(), 1);
        assert_eq!(host.focused_window(), Some(w));
        let got: Vec<SubscriptionId> = host.take_deliveries().into_iter().map(|(id, _)| id).collect();
        assert_eq!(got, vec![switch, map]);
    }

    #[test]
    fn removing_active_workspace_falls_back_to_previous() {
        let mut host = SimShell::new(3);
        host.switch_workspace(2, None);
        let w = host.add_window(2, "a", "A");
        host.remove_workspace(2);
        assert_eq!(host.n_workspaces(), 2);
        assert_eq!(host.active_workspace_index(), 1);
        assert_eq!(host.window_workspace_index(w), Some(1));
    }

    #[test]
    fn workspace_names_default_to_ordinal() {
        let mut host = SimShell::new(2);
        host.set_workspace_name(1, "Mail");
        assert_eq!(host.workspace_name(0), "Workspace 1");
        assert_eq!(host.workspace_name(1), "Mail");
    }
}
