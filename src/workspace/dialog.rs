use crossterm::event::{Event, KeyCode, KeyEvent, MouseButton, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear};

use crate::config::{Rows, SettingsStore, parse_leading_int};
use crate::constants::{
    DYNAMIC_WORKSPACES_KEY, MAX_WORKSPACES, MIN_WORKSPACES, OVERRIDES_SCHEMA,
};
use crate::shell::Shell;
use crate::ui::{UiFrame, rect_contains, safe_set_string};

/// Focusable parts of the dialog, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogField {
    Workspaces,
    Rows,
    Dynamic,
    Cancel,
    Ok,
}

impl DialogField {
    const ORDER: [DialogField; 5] = [
        DialogField::Workspaces,
        DialogField::Rows,
        DialogField::Dynamic,
        DialogField::Cancel,
        DialogField::Ok,
    ];

    fn step(self, delta: isize) -> Self {
        let pos = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0) as isize;
        let len = Self::ORDER.len() as isize;
        Self::ORDER[(pos + delta).rem_euclid(len) as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    Apply,
    Cancel,
}

/// Modal editor for workspace count, switcher rows and dynamic workspaces.
#[derive(Debug, Clone)]
pub struct WorkspaceDialog {
    workspaces: String,
    rows: String,
    dynamic: bool,
    focus: DialogField,
    hits: Vec<(DialogField, Rect)>,
}

impl WorkspaceDialog {
    /// Open pre-filled with the current values.
    pub fn open(host: &dyn Shell, rows: Rows, settings: &dyn SettingsStore) -> Self {
        Self {
            workspaces: host.n_workspaces().to_string(),
            rows: rows.to_string(),
            dynamic: settings.get_bool(OVERRIDES_SCHEMA, DYNAMIC_WORKSPACES_KEY),
            focus: DialogField::Workspaces,
            hits: Vec::new(),
        }
    }

    pub fn workspaces_text(&self) -> &str {
        &self.workspaces
    }

    pub fn rows_text(&self) -> &str {
        &self.rows
    }

    pub fn dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn focus(&self) -> DialogField {
        self.focus
    }

    pub fn set_focus(&mut self, field: DialogField) {
        self.focus = field;
    }

    pub fn set_workspaces_text(&mut self, text: impl Into<String>) {
        self.workspaces = text.into();
    }

    pub fn set_rows_text(&mut self, text: impl Into<String>) {
        self.rows = text.into();
    }

    /// Flip the dynamic-workspaces switch. The setting is written at once,
    /// independent of OK/Cancel.
    pub fn toggle_dynamic(&mut self, settings: &mut dyn SettingsStore) {
        self.dynamic = !self.dynamic;
        settings.set_bool(OVERRIDES_SCHEMA, DYNAMIC_WORKSPACES_KEY, self.dynamic);
        tracing::debug!(dynamic = self.dynamic, "dynamic workspaces toggled");
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focus {
            DialogField::Workspaces => Some(&mut self.workspaces),
            DialogField::Rows => Some(&mut self.rows),
            _ => None,
        }
    }

    pub fn handle_key(
        &mut self,
        key: &KeyEvent,
        settings: &mut dyn SettingsStore,
    ) -> Option<DialogAction> {
        match key.code {
            KeyCode::Esc => Some(DialogAction::Cancel),
            KeyCode::Tab | KeyCode::Down => {
                self.focus = self.focus.step(1);
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = self.focus.step(-1);
                None
            }
            KeyCode::Enter => match self.focus {
                DialogField::Dynamic => {
                    self.toggle_dynamic(settings);
                    None
                }
                DialogField::Cancel => Some(DialogAction::Cancel),
                _ => Some(DialogAction::Apply),
            },
            KeyCode::Char(' ') if self.focus == DialogField::Dynamic => {
                self.toggle_dynamic(settings);
                None
            }
            KeyCode::Char(c) => {
                if let Some(text) = self.focused_text() {
                    text.push(c);
                }
                None
            }
            KeyCode::Backspace => {
                if let Some(text) = self.focused_text() {
                    text.pop();
                }
                None
            }
            _ => None,
        }
    }

    pub fn handle_event(
        &mut self,
        event: &Event,
        settings: &mut dyn SettingsStore,
    ) -> Option<DialogAction> {
        match event {
            Event::Key(key) => self.handle_key(key, settings),
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Up(MouseButton::Left) => {
                let field = self
                    .hits
                    .iter()
                    .find(|(_, rect)| rect_contains(*rect, mouse.column, mouse.row))
                    .map(|(field, _)| *field)?;
                self.focus = field;
                match field {
                    DialogField::Dynamic => {
                        self.toggle_dynamic(settings);
                        None
                    }
                    DialogField::Cancel => Some(DialogAction::Cancel),
                    DialogField::Ok => Some(DialogAction::Apply),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Apply the entered values. Invalid fields are skipped.
    ///
    /// Workspaces are appended or removed from the end to reach the requested
    /// count. Returns the new row count when it is valid and differs from
    /// `current`.
    pub fn apply(&self, host: &mut dyn Shell, current: Rows) -> Option<Rows> {
        if let Some(target) = parse_leading_int(&self.workspaces)
            .filter(|n| (MIN_WORKSPACES..=MAX_WORKSPACES).contains(n))
        {
            let existing = host.n_workspaces();
            for _ in existing..target {
                host.append_workspace();
            }
            for index in (target..existing).rev() {
                host.remove_workspace(index);
            }
            if target != existing {
                tracing::debug!(from = existing, to = target, "workspace count changed");
            }
        }
        self.rows
            .parse::<Rows>()
            .ok()
            .filter(|rows| *rows != current)
    }

    /// Centered rectangle of the dialog inside `area`.
    pub fn rect_for(area: Rect) -> Rect {
        let width = area.width.min(40);
        let height = area.height.min(7);
        Rect {
            x: area.x.saturating_add(area.width.saturating_sub(width) / 2),
            y: area.y.saturating_add(area.height.saturating_sub(height) / 2),
            width,
            height,
        }
    }

    pub fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect) {
        self.hits.clear();
        let rect = Self::rect_for(area);
        if rect.width < 24 || rect.height < 7 {
            return;
        }
        let base = Style::default()
            .bg(crate::theme::dialog_bg())
            .fg(crate::theme::dialog_fg());
        let focused = Style::default()
            .bg(crate::theme::dialog_focus_bg())
            .fg(crate::theme::dialog_fg())
            .add_modifier(Modifier::BOLD);
        frame.render_widget(Clear, rect);
        frame.render_widget(
            Block::default()
                .title(" Workspaces ")
                .borders(Borders::ALL)
                .style(base),
            rect,
        );
        let style_for = |field| if self.focus == field { focused } else { base };
        let label_x = rect.x + 2;
        let value_x = rect.x + rect.width - 8;
        let switch = if self.dynamic { "[on] " } else { "[off]" };
        let rows = [
            (DialogField::Workspaces, "Number of workspaces", self.workspaces.as_str()),
            (DialogField::Rows, "Rows in workspace switcher", self.rows.as_str()),
            (DialogField::Dynamic, "Dynamic workspaces", switch),
        ];
        let mut hits = Vec::with_capacity(5);
        let buffer = frame.buffer_mut();
        for (line, (field, label, value)) in rows.into_iter().enumerate() {
            let y = rect.y + 1 + line as u16;
            safe_set_string(buffer, rect, label_x, y, label, base);
            safe_set_string(buffer, rect, value_x, y, &format!("{value:<5}"), style_for(field));
            hits.push((
                field,
                Rect {
                    x: value_x,
                    y,
                    width: 5,
                    height: 1,
                },
            ));
        }
        let button_y = rect.y + rect.height - 2;
        let cancel = "[ Cancel ]";
        let ok = "[ OK ]";
        let ok_x = rect.x + rect.width - 2 - ok.len() as u16;
        let cancel_x = ok_x.saturating_sub(cancel.len() as u16 + 1);
        safe_set_string(buffer, rect, cancel_x, button_y, cancel, style_for(DialogField::Cancel));
        safe_set_string(buffer, rect, ok_x, button_y, ok, style_for(DialogField::Ok));
        hits.push((
            DialogField::Cancel,
            Rect {
                x: cancel_x,
                y: button_y,
                width: cancel.len() as u16,
                height: 1,
            },
        ));
        hits.push((
            DialogField::Ok,
            Rect {
                x: ok_x,
                y: button_y,
                width: ok.len() as u16,
                height: 1,
            },
        ));
        self.hits = hits;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemorySettings;
    use crate::sim::{SimCommand, SimShell};
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn open_prefills_current_values() {
        let host = SimShell::new(4);
        let mut settings = MemorySettings::new();
        settings.set_bool(OVERRIDES_SCHEMA, DYNAMIC_WORKSPACES_KEY, true);
        let dialog = WorkspaceDialog::open(&host, Rows::new(2).unwrap(), &settings);
        assert_eq!(dialog.workspaces_text(), "4");
        assert_eq!(dialog.rows_text(), "2");
        assert!(dialog.dynamic());
    }

    #[test]
    fn apply_grows_and_shrinks_from_the_end() {
        let mut host = SimShell::new(4);
        let settings = MemorySettings::new();
        let mut dialog = WorkspaceDialog::open(&host, Rows::ONE, &settings);
        dialog.set_workspaces_text("6");
        assert_eq!(dialog.apply(&mut host, Rows::ONE), None);
        assert_eq!(host.n_workspaces(), 6);
        dialog.set_workspaces_text("3");
        dialog.apply(&mut host, Rows::ONE);
        assert_eq!(
            host.take_commands(),
            vec![
                SimCommand::AppendWorkspace,
                SimCommand::AppendWorkspace,
                SimCommand::RemoveWorkspace(5),
                SimCommand::RemoveWorkspace(4),
                SimCommand::RemoveWorkspace(3),
            ]
        );
    }

    #[test]
    fn invalid_values_are_ignored() {
        let mut host = SimShell::new(4);
        let settings = MemorySettings::new();
        let mut dialog = WorkspaceDialog::open(&host, Rows::ONE, &settings);
        for text in ["1", "33", "many", ""] {
            dialog.set_workspaces_text(text);
            dialog.set_rows_text(text);
            assert_eq!(dialog.apply(&mut host, Rows::ONE), None);
        }
        dialog.set_rows_text("6");
        assert_eq!(dialog.apply(&mut host, Rows::ONE), None);
        assert!(host.take_commands().is_empty());
    }

    #[test]
    fn rows_reported_only_when_changed() {
        let mut host = SimShell::new(4);
        let settings = MemorySettings::new();
        let mut dialog = WorkspaceDialog::open(&host, Rows::ONE, &settings);
        assert_eq!(dialog.apply(&mut host, Rows::ONE), None);
        dialog.set_rows_text("2 rows");
        assert_eq!(dialog.apply(&mut host, Rows::ONE), Rows::new(2).ok());
    }

    #[test]
    fn dynamic_switch_writes_setting_immediately() {
        let host = SimShell::new(2);
        let mut settings = MemorySettings::new();
        let mut dialog = WorkspaceDialog::open(&host, Rows::ONE, &settings);
        dialog.set_focus(DialogField::Dynamic);
        assert_eq!(dialog.handle_key(&key(KeyCode::Char(' ')), &mut settings), None);
        assert!(settings.get_bool(OVERRIDES_SCHEMA, DYNAMIC_WORKSPACES_KEY));
        assert_eq!(dialog.handle_key(&key(KeyCode::Enter), &mut settings), None);
        assert!(!settings.get_bool(OVERRIDES_SCHEMA, DYNAMIC_WORKSPACES_KEY));
        assert_eq!(
            dialog.handle_key(&key(KeyCode::Esc), &mut settings),
            Some(DialogAction::Cancel)
        );
    }

    #[test]
    fn typing_edits_focused_field() {
        let host = SimShell::new(2);
        let mut settings = MemorySettings::new();
        let mut dialog = WorkspaceDialog::open(&host, Rows::ONE, &settings);
        dialog.handle_key(&key(KeyCode::Backspace), &mut settings);
        dialog.handle_key(&key(KeyCode::Char('8')), &mut settings);
        dialog.handle_key(&key(KeyCode::Tab), &mut settings);
        dialog.handle_key(&key(KeyCode::Char('3')), &mut settings);
        assert_eq!(dialog.workspaces_text(), "8");
        assert_eq!(dialog.rows_text(), "13");
        assert_eq!(
            dialog.handle_key(&key(KeyCode::Enter), &mut settings),
            Some(DialogAction::Apply)
        );
    }
}
