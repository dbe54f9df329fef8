use ratatui::style::Color;

// Centralized panel colors and metrics. Components ask for colors through
// these helpers so the bar can be restyled in one place.

/// Height of the bar in cells before the row indicator grows it.
pub const PANEL_BASE_HEIGHT: u16 = 1;

/// Width of the row indicator column.
pub const ROW_INDICATOR_WIDTH: u16 = 1;

/// Width of one workspace button.
pub const WORKSPACE_BUTTON_WIDTH: u16 = 4;

/// Width of the tray-toggle button.
pub const MESSAGE_BUTTON_WIDTH: u16 = 3;

// Bar
pub fn panel_bg() -> Color {
    Color::DarkGray
}
pub fn panel_fg() -> Color {
    Color::White
}

// Window list entries
pub fn item_focused_bg() -> Color {
    Color::Gray
}
pub fn item_focused_fg() -> Color {
    Color::Black
}

// Workspace buttons
pub fn workspace_fg() -> Color {
    Color::Gray
}
pub fn workspace_outlined_bg() -> Color {
    Color::Blue
}
pub fn workspace_outlined_fg() -> Color {
    Color::White
}
pub fn row_indicator_fg() -> Color {
    Color::Gray
}
pub fn row_indicator_active_fg() -> Color {
    Color::Yellow
}

// Menu
pub fn menu_bg() -> Color {
    Color::Black
}
pub fn menu_fg() -> Color {
    Color::White
}
pub fn menu_selected_bg() -> Color {
    Color::Gray
}
pub fn menu_selected_fg() -> Color {
    Color::Black
}

// Tooltip
pub fn tooltip_bg() -> Color {
    Color::Black
}
pub fn tooltip_fg() -> Color {
    Color::Yellow
}

// Dialog
pub fn dialog_bg() -> Color {
    Color::Black
}
pub fn dialog_fg() -> Color {
    Color::White
}
pub fn dialog_focus_bg() -> Color {
    Color::Blue
}

// Grid switcher popup
pub fn popup_bg() -> Color {
    Color::Black
}
pub fn popup_cell_fg() -> Color {
    Color::DarkGray
}
pub fn popup_target_fg() -> Color {
    Color::LightGreen
}

// Demo desktop
pub fn desktop_bg() -> Color {
    Color::Reset
}
pub fn desktop_fg() -> Color {
    Color::Gray
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outlined_button_stands_out_from_bar() {
        assert_ne!(workspace_outlined_bg(), panel_bg());
        assert_ne!(item_focused_bg(), panel_bg());
    }
}
