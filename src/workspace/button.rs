use ratatui::layout::Rect;

use crate::shell::Shell;
use crate::tooltip::Tooltip;

/// One slot of the switcher row.
///
/// The slot's screen position never changes; the workspace it stands for
/// does.
#[derive(Debug, Clone)]
pub struct WorkspaceButton {
    slot: usize,
    index: Option<usize>,
    label: String,
    outlined: bool,
    tooltip: String,
    tooltip_visible: bool,
    rect: Rect,
}

impl WorkspaceButton {
    pub fn new(host: &dyn Shell, slot: usize, index: Option<usize>) -> Self {
        let mut button = Self {
            slot,
            index: None,
            label: String::new(),
            outlined: false,
            tooltip: String::new(),
            tooltip_visible: false,
            rect: Rect::default(),
        };
        if let Some(index) = index {
            button.set_index(host, index);
        }
        button
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn outlined(&self) -> bool {
        self.outlined
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub(crate) fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    /// Bind to workspace `index`. Out-of-range indices leave the button as is.
    pub fn set_index(&mut self, host: &dyn Shell, index: usize) {
        if index >= host.n_workspaces() {
            return;
        }
        self.index = Some(index);
        let number = index + 1;
        if index == host.active_workspace_index() {
            self.label = format!("-{number}-");
            self.outlined = true;
        } else {
            self.label = number.to_string();
            self.outlined = false;
        }
        self.tooltip = host.workspace_name(index);
    }

    /// Show an empty slot.
    pub fn unbind(&mut self) {
        self.index = None;
        self.label.clear();
        self.outlined = false;
        self.tooltip.clear();
        self.tooltip_visible = false;
    }

    /// Activate the bound workspace if it still exists.
    pub fn click(&self, host: &mut dyn Shell) -> bool {
        match self.index {
            Some(index) if index < host.n_workspaces() => {
                host.activate_workspace(index);
                true
            }
            _ => false,
        }
    }
}

impl Tooltip for WorkspaceButton {
    fn show_tooltip(&mut self) {
        if self.index.is_some() {
            self.tooltip_visible = true;
        }
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
