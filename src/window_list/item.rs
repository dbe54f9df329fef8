use ratatui::layout::Rect;

use crate::grid::WorkspaceGrid;
use crate::input::PointerButton;
use crate::shell::{AppInfo, Shell, Signal, WindowId, WindowInfo};
use crate::signals::Subscriptions;
use crate::tooltip::Tooltip;
use crate::window_list::menu::{MenuEntry, WindowMenu};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ItemRoute {
    Title,
}

/// What a click on an entry did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemClick {
    Activated,
    Minimized,
    MenuOpened,
    MenuClosed,
    Ignored,
}

/// One taskbar entry.
#[derive(Debug)]
pub struct WindowListItem {
    window: WindowId,
    app: AppInfo,
    title: String,
    label: String,
    minimized: bool,
    focused: bool,
    tooltip: String,
    tooltip_visible: bool,
    menu: WindowMenu,
    subs: Subscriptions<ItemRoute>,
    rect: Rect,
}

fn label_for(title: &str, showing: bool) -> String {
    if showing {
        title.to_string()
    } else {
        format!("[{title}]")
    }
}

impl WindowListItem {
    pub fn new(host: &mut dyn Shell, app: AppInfo, window: WindowId, info: &WindowInfo) -> Self {
        let mut subs = Subscriptions::new();
        subs.connect(host, Signal::TitleChanged(window), ItemRoute::Title);
        tracing::debug!(window_id = %window, app = %app.id, "list item created");
        Self {
            window,
            app,
            title: info.title.clone(),
            label: label_for(&info.title, info.showing_on_its_workspace()),
            minimized: info.minimized,
            focused: info.has_focus,
            tooltip: info.title.clone(),
            tooltip_visible: false,
            menu: WindowMenu::new(
                window,
                info.minimized,
                info.maximized_both(),
                info.above,
                info.on_all_workspaces,
            ),
            subs,
            rect: Rect::default(),
        }
    }

    pub fn window(&self) -> WindowId {
        self.window
    }

    pub fn app(&self) -> &AppInfo {
        &self.app
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn minimized(&self) -> bool {
        self.minimized
    }

    /// The icon is drawn at half opacity while minimized.
    pub fn icon_dimmed(&self) -> bool {
        self.minimized
    }

    pub fn focused(&self) -> bool {
        self.focused
    }

    pub fn menu(&self) -> &WindowMenu {
        &self.menu
    }

    pub(crate) fn menu_mut(&mut self) -> &mut WindowMenu {
        &mut self.menu
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub(crate) fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    pub(crate) fn owns(&self, id: crate::shell::SubscriptionId) -> bool {
        self.subs.owns(id)
    }

    pub fn on_title_changed(&mut self, host: &dyn Shell) {
        let Some(info) = host.window_info(self.window) else {
            return;
        };
        self.title = info.title.clone();
        self.tooltip = info.title.clone();
        self.label = label_for(&info.title, info.showing_on_its_workspace());
    }

    pub fn do_minimize(&mut self) {
        self.minimized = true;
        self.label = label_for(&self.title, false);
    }

    pub fn do_map(&mut self) {
        self.minimized = false;
        self.label = label_for(&self.title, true);
    }

    pub fn sync_focus(&mut self, host: &dyn Shell) {
        self.focused = host
            .window_info(self.window)
            .is_some_and(|info| info.has_focus);
    }

    pub fn click(
        &mut self,
        host: &mut dyn Shell,
        grid: &WorkspaceGrid,
        button: PointerButton,
    ) -> ItemClick {
        if self.menu.is_open() {
            self.menu.close();
            return ItemClick::MenuClosed;
        }
        match button {
            PointerButton::Primary => {
                let focused = host
                    .window_info(self.window)
                    .is_some_and(|info| info.has_focus);
                if focused {
                    host.minimize_window(self.window);
                    ItemClick::Minimized
                } else {
                    host.activate_window(self.window);
                    ItemClick::Activated
                }
            }
            PointerButton::Secondary => {
                self.hide_tooltip();
                self.menu.open(host, grid);
                if self.menu.is_open() {
                    ItemClick::MenuOpened
                } else {
                    ItemClick::Ignored
                }
            }
            PointerButton::Middle => ItemClick::Ignored,
        }
    }

    pub fn activate_menu_entry(
        &mut self,
        entry: MenuEntry,
        host: &mut dyn Shell,
        grid: &WorkspaceGrid,
    ) {
        self.menu.activate(entry, host, grid);
    }

    /// Release the title subscription and tear down the tooltip and menu.
    pub fn destroy(mut self, host: &mut dyn Shell) {
        self.subs.release_all(host);
        self.tooltip_visible = false;
        self.menu.close();
        tracing::debug!(window_id = %self.window, "list item destroyed");
    }
}

impl Tooltip for WindowListItem {
    fn show_tooltip(&mut self) {
        self.tooltip_visible = true;
    }

    fn hide_tooltip(&mut self) {
        self.tooltip_visible = false;
    }

    fn tooltip_text(&self) -> &str {
        &self.tooltip
    }

    fn tooltip_visible(&self) -> bool {
        self.tooltip_visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Rows;
    use crate::sim::{SimCommand, SimShell};

    fn make(host: &mut SimShell, title: &str) -> WindowListItem {
        let w = host.add_window(0, "term", title);
        let info = host.window_info(w).unwrap();
        let app = host.window_app(w).unwrap();
        WindowListItem::new(host, app, w, &info)
    }

    #[test]
    fn minimized_label_is_bracketed() {
        let mut host = SimShell::new(1);
        let mut item = make(&mut host, "vim");
        assert_eq!(item.label(), "vim");
        item.do_minimize();
        assert!(item.minimized());
        assert_eq!(item.label(), "[vim]");
        assert!(item.icon_dimmed());
        item.do_map();
        assert!(!item.minimized());
        assert_eq!(item.label(), "vim");
        item.destroy(&mut host);
    }

    #[test]
    fn title_change_updates_label_and_tooltip() {
        let mut host = SimShell::new(1);
        let mut item = make(&mut host, "old");
        host.update_window(item.window(), |info| {
            info.title = "new".into();
            info.minimized = true;
        });
        item.on_title_changed(&host);
        assert_eq!(item.title(), "new");
        assert_eq!(item.tooltip_text(), "new");
        assert_eq!(item.label(), "[new]");
        item.destroy(&mut host);
    }

    #[test]
    fn primary_click_toggles_focus_and_minimize() {
        let mut host = SimShell::new(1);
        let grid = WorkspaceGrid::new(Rows::ONE, 1);
        let mut item = make(&mut host, "a");
        host.take_commands();
        assert_eq!(
            item.click(&mut host, &grid, PointerButton::Primary),
            ItemClick::Activated
        );
        assert_eq!(
            item.click(&mut host, &grid, PointerButton::Primary),
            ItemClick::Minimized
        );
        assert_eq!(
            host.take_commands(),
            vec![
                SimCommand::ActivateWindow(item.window()),
                SimCommand::MinimizeWindow(item.window())
            ]
        );
        item.destroy(&mut host);
    }

    #[test]
    fn click_with_open_menu_only_closes_it() {
        let mut host = SimShell::new(1);
        let grid = WorkspaceGrid::new(Rows::ONE, 1);
        let mut item = make(&mut host, "a");
        item.show_tooltip();
        assert_eq!(
            item.click(&mut host, &grid, PointerButton::Secondary),
            ItemClick::MenuOpened
        );
        assert!(!item.tooltip_visible());
        host.take_commands();
        assert_eq!(
            item.click(&mut host, &grid, PointerButton::Primary),
            ItemClick::MenuClosed
        );
        assert!(host.take_commands().is_empty());
        item.destroy(&mut host);
    }

    #[test]
    fn destroy_releases_title_subscription() {
        let mut host = SimShell::new(1);
        let before = host.live_subscriptions();
        let item = make(&mut host, "a");
        assert_eq!(host.live_subscriptions(), before + 1);
        item.destroy(&mut host);
        assert_eq!(host.live_subscriptions(), before);
    }
}
