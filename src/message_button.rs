use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use crate::compat;
use crate::shell::{HostEvent, Shell, Signal, SubscriptionId};
use crate::signals::Subscriptions;
use crate::theme::MESSAGE_BUTTON_WIDTH;
use crate::ui::{UiFrame, safe_set_string};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrayRoute {
    Added,
    Removed,
}

/// Tray toggle at the right end of the bar. Shows `!` while the tray holds
/// anything.
#[derive(Debug)]
pub struct MessageButton {
    label: char,
    subs: Subscriptions<TrayRoute>,
    rect: Rect,
}

impl MessageButton {
    pub fn new(host: &mut dyn Shell) -> Self {
        let mut subs = Subscriptions::new();
        subs.connect(host, Signal::TraySummaryAdded, TrayRoute::Added);
        subs.connect(host, Signal::TraySummaryRemoved, TrayRoute::Removed);
        Self {
            label: label_for(host.tray_summary_len()),
            subs,
            rect: Rect::default(),
        }
    }

    pub fn label(&self) -> char {
        self.label
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn owns(&self, id: SubscriptionId) -> bool {
        self.subs.owns(id)
    }

    pub fn handle_signal(&mut self, host: &dyn Shell, id: SubscriptionId, event: &HostEvent) -> bool {
        let Some(route) = self.subs.route(id) else {
            return false;
        };
        match (route, event) {
            (TrayRoute::Added, HostEvent::TraySummaryAdded) => self.label = '!',
            (TrayRoute::Removed, HostEvent::TraySummaryRemoved) => {
                if host.tray_summary_len() == 0 {
                    self.label = ' ';
                }
            }
            (route, event) => {
                tracing::warn!(?route, ?event, "delivery does not match subscription");
            }
        }
        true
    }

    pub fn click(&self, host: &mut dyn Shell) {
        compat::toggle_tray(host);
    }

    pub fn destroy(mut self, host: &mut dyn Shell) {
        self.subs.release_all(host);
    }

    pub fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect) {
        let width = MESSAGE_BUTTON_WIDTH.min(area.width);
        self.rect = Rect {
            x: area.x.saturating_add(area.width.saturating_sub(width)),
            y: area.y.saturating_add(area.height.saturating_sub(1)),
            width,
            height: area.height.min(1),
        };
        let style = Style::default()
            .fg(crate::theme::panel_fg())
            .add_modifier(Modifier::BOLD);
        let text = format!("{:^width$}", self.label, width = width as usize);
        safe_set_string(frame.buffer_mut(), self.rect, self.rect.x, self.rect.y, &text, style);
    }
}

fn label_for(count: usize) -> char {
    if count > 0 { '!' } else { ' ' }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimCommand, SimShell};

    fn pump(host: &mut SimShell, button: &mut MessageButton) {
        while let Some((id, event)) = host.next_delivery() {
            button.handle_signal(host, id, &event);
        }
    }

    #[test]
    fn label_tracks_tray_contents() {
        let mut host = SimShell::new(1);
        host.add_tray_item();
        host.clear_deliveries();
        let mut button = MessageButton::new(&mut host);
        assert_eq!(button.label(), '!');

        host.add_tray_item();
        host.remove_tray_item();
        pump(&mut host, &mut button);
        assert_eq!(button.label(), '!');

        host.remove_tray_item();
        pump(&mut host, &mut button);
        assert_eq!(button.label(), ' ');

        host.add_tray_item();
        pump(&mut host, &mut button);
        assert_eq!(button.label(), '!');
        button.destroy(&mut host);
        assert_eq!(host.live_subscriptions(), 0);
    }

    #[test]
    fn click_toggles_tray() {
        let mut host = SimShell::new(1);
        let button = MessageButton::new(&mut host);
        button.click(&mut host);
        button.click(&mut host);
        assert_eq!(
            host.take_commands(),
            vec![
                SimCommand::SetTraySummoned(true),
                SimCommand::SetTraySummoned(false)
            ]
        );
        button.destroy(&mut host);
    }
}
