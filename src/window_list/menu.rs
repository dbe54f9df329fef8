//! Right-click menu of a window list entry.
//!
//! Labels and toggle states are read from the window when the menu opens and
//! are not tracked while it is closed.

use crate::grid::WorkspaceGrid;
use crate::shell::{MotionDirection, Shell, WindowId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    Minimize,
    Maximize,
    AlwaysOnTop,
    Sticky,
    Move(MotionDirection),
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub entry: MenuEntry,
    pub label: String,
    /// Switch state for toggle entries.
    pub toggle: Option<bool>,
    pub visible: bool,
    /// A separator is drawn above this item.
    pub separated: bool,
}

impl MenuItem {
    fn action(entry: MenuEntry, label: &str) -> Self {
        Self {
            entry,
            label: label.to_string(),
            toggle: None,
            visible: true,
            separated: false,
        }
    }

    fn switch(entry: MenuEntry, label: &str, state: bool) -> Self {
        Self {
            toggle: Some(state),
            ..Self::action(entry, label)
        }
    }

    fn separated(mut self) -> Self {
        self.separated = true;
        self
    }
}

fn move_label(direction: MotionDirection) -> &'static str {
    match direction {
        MotionDirection::Left => "Move to Workspace Left",
        MotionDirection::Right => "Move to Workspace Right",
        MotionDirection::Up => "Move to Workspace Up",
        MotionDirection::Down => "Move to Workspace Down",
    }
}

#[derive(Debug, Clone)]
pub struct WindowMenu {
    window: WindowId,
    open: bool,
    items: Vec<MenuItem>,
    selected: usize,
}

impl WindowMenu {
    pub fn new(window: WindowId, minimized: bool, maximized: bool, above: bool, sticky: bool) -> Self {
        let mut items = vec![
            MenuItem::action(
                MenuEntry::Minimize,
                if minimized { "Unminimize" } else { "Minimize" },
            ),
            MenuItem::action(
                MenuEntry::Maximize,
                if maximized { "Unmaximize" } else { "Maximize" },
            ),
            MenuItem::switch(MenuEntry::AlwaysOnTop, "Always on Top", above).separated(),
            MenuItem::switch(MenuEntry::Sticky, "Always on Visible Workspace", sticky),
        ];
        for direction in MotionDirection::ALL {
            items.push(MenuItem::action(
                MenuEntry::Move(direction),
                move_label(direction),
            ));
        }
        items.push(MenuItem::action(MenuEntry::Close, "Close").separated());
        Self {
            window,
            open: false,
            items,
            selected: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn visible_items(&self) -> impl Iterator<Item = &MenuItem> {
        self.items.iter().filter(|item| item.visible)
    }

    pub fn item(&self, entry: MenuEntry) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.entry == entry)
    }

    fn item_mut(&mut self, entry: MenuEntry) -> Option<&mut MenuItem> {
        self.items.iter_mut().find(|item| item.entry == entry)
    }

    fn set_label(&mut self, entry: MenuEntry, label: &str) {
        if let Some(item) = self.item_mut(entry) {
            item.label = label.to_string();
        }
    }

    pub fn selected(&self) -> Option<MenuEntry> {
        self.visible_items().nth(self.selected).map(|item| item.entry)
    }

    /// Open the menu, re-reading the window's state first.
    pub fn open(&mut self, host: &dyn Shell, grid: &WorkspaceGrid) {
        let Some(info) = host.window_info(self.window) else {
            return;
        };
        self.set_label(
            MenuEntry::Minimize,
            if info.minimized { "Unminimize" } else { "Minimize" },
        );
        self.set_label(
            MenuEntry::Maximize,
            if info.maximized_both() {
                "Unmaximize"
            } else {
                "Maximize"
            },
        );
        if let Some(item) = self.item_mut(MenuEntry::AlwaysOnTop) {
            item.toggle = Some(info.above);
        }
        if let Some(item) = self.item_mut(MenuEntry::Sticky) {
            item.toggle = Some(info.on_all_workspaces);
        }
        let active = host.active_workspace_index();
        for direction in MotionDirection::ALL {
            let has_neighbor = grid.neighbor(active, direction).is_some();
            if let Some(item) = self.item_mut(MenuEntry::Move(direction)) {
                item.visible = has_neighbor;
            }
        }
        self.selected = 0;
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn move_selection(&mut self, delta: isize) {
        let count = self.visible_items().count();
        if count == 0 {
            self.selected = 0;
            return;
        }
        let next = (self.selected as isize + delta).rem_euclid(count as isize);
        self.selected = next as usize;
    }

    /// Run `entry` against the window and close the menu.
    pub fn activate(&mut self, entry: MenuEntry, host: &mut dyn Shell, grid: &WorkspaceGrid) {
        self.open = false;
        let window = self.window;
        let Some(info) = host.window_info(window) else {
            return;
        };
        tracing::debug!(window_id = %window, ?entry, "window menu action");
        match entry {
            MenuEntry::Minimize => {
                if info.minimized {
                    host.activate_window(window);
                    self.set_label(MenuEntry::Minimize, "Minimize");
                } else {
                    host.minimize_window(window);
                    self.set_label(MenuEntry::Minimize, "Unminimize");
                }
            }
            MenuEntry::Maximize => {
                if info.maximized_both() {
                    host.unmaximize_window(window);
                    self.set_label(MenuEntry::Maximize, "Maximize");
                } else {
                    host.maximize_window(window);
                    self.set_label(MenuEntry::Maximize, "Unmaximize");
                }
            }
            MenuEntry::AlwaysOnTop => {
                let state = !self
                    .item(MenuEntry::AlwaysOnTop)
                    .and_then(|item| item.toggle)
                    .unwrap_or(info.above);
                if let Some(item) = self.item_mut(MenuEntry::AlwaysOnTop) {
                    item.toggle = Some(state);
                }
                if state {
                    host.make_above(window);
                } else {
                    host.unmake_above(window);
                }
            }
            MenuEntry::Sticky => {
                let state = !self
                    .item(MenuEntry::Sticky)
                    .and_then(|item| item.toggle)
                    .unwrap_or(info.on_all_workspaces);
                if let Some(item) = self.item_mut(MenuEntry::Sticky) {
                    item.toggle = Some(state);
                }
                if state {
                    host.stick(window);
                } else {
                    host.unstick(window);
                }
            }
            MenuEntry::Move(direction) => {
                let active = host.active_workspace_index();
                if let Some(target) = grid.neighbor(active, direction) {
                    host.change_workspace(window, target);
                }
            }
            MenuEntry::Close => host.delete_window(window),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Rows;
    use crate::shell::WindowInfo;
    use crate::sim::{SimCommand, SimShell};

    fn setup() -> (SimShell, WindowId, WorkspaceGrid) {
        let mut host = SimShell::new(4);
        let w = host.add_window(0, "editor", "Editor");
        let grid = WorkspaceGrid::new(Rows::new(2).unwrap(), host.n_workspaces());
        (host, w, grid)
    }

    #[test]
    fn open_resyncs_from_live_state() {
        let (mut host, w, grid) = setup();
        let mut menu = WindowMenu::new(w, false, false, false, false);
        host.update_window(w, |info: &mut WindowInfo| {
            info.minimized = true;
            info.maximized_horizontally = true;
            info.maximized_vertically = true;
            info.above = true;
        });
        menu.open(&host, &grid);
        assert!(menu.is_open());
        assert_eq!(menu.item(MenuEntry::Minimize).unwrap().label, "Unminimize");
        assert_eq!(menu.item(MenuEntry::Maximize).unwrap().label, "Unmaximize");
        assert_eq!(menu.item(MenuEntry::AlwaysOnTop).unwrap().toggle, Some(true));
        assert_eq!(menu.item(MenuEntry::Sticky).unwrap().toggle, Some(false));
    }

    #[test]
    fn move_entries_hidden_without_neighbor() {
        let (host, w, grid) = setup();
        // 4 workspaces, 2 rows -> 2 columns; active 0 is top-left.
        let mut menu = WindowMenu::new(w, false, false, false, false);
        menu.open(&host, &grid);
        let visible = |dir| menu.item(MenuEntry::Move(dir)).unwrap().visible;
        assert!(!visible(MotionDirection::Left));
        assert!(!visible(MotionDirection::Up));
        assert!(visible(MotionDirection::Right));
        assert!(visible(MotionDirection::Down));
    }

    #[test]
    fn activate_issues_commands_and_closes() {
        let (mut host, w, grid) = setup();
        let mut menu = WindowMenu::new(w, false, false, false, false);
        menu.open(&host, &grid);
        menu.activate(MenuEntry::Minimize, &mut host, &grid);
        assert!(!menu.is_open());
        assert_eq!(menu.item(MenuEntry::Minimize).unwrap().label, "Unminimize");
        menu.activate(MenuEntry::AlwaysOnTop, &mut host, &grid);
        menu.activate(MenuEntry::Move(MotionDirection::Down), &mut host, &grid);
        menu.activate(MenuEntry::Close, &mut host, &grid);
        let journal = host.take_commands();
        assert_eq!(
            journal,
            vec![
                SimCommand::MinimizeWindow(w),
                SimCommand::MakeAbove(w),
                SimCommand::ChangeWorkspace(w, 2),
                SimCommand::DeleteWindow(w),
            ]
        );
    }

    #[test]
    fn keyboard_selection_wraps_over_visible_items() {
        let (host, w, grid) = setup();
        let mut menu = WindowMenu::new(w, false, false, false, false);
        menu.open(&host, &grid);
        assert_eq!(menu.selected(), Some(MenuEntry::Minimize));
        menu.move_selection(-1);
        assert_eq!(menu.selected(), Some(MenuEntry::Close));
        menu.move_selection(1);
        assert_eq!(menu.selected(), Some(MenuEntry::Minimize));
    }
}
