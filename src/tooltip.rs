//! Hover-debounced tooltips.
//!
//! A container owns one [`HoverDebouncer`] and feeds it hover changes from
//! its children. The debouncer answers with [`TooltipCommand`]s which the
//! container applies to the child through the [`Tooltip`] capability.
//!
//! Moving the pointer straight from one child to the next skips the delay:
//! while a tooltip has been shown recently the next one appears at once.

use std::time::{Duration, Instant};

use crate::constants::{HOVER_TIMEOUT, TOOLTIP_EDGE_MARGIN};
use crate::timer::Deadline;

/// Something that can show and hide a tooltip.
pub trait Tooltip {
    fn show_tooltip(&mut self);
    fn hide_tooltip(&mut self);
    fn tooltip_text(&self) -> &str;
    fn tooltip_visible(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipCommand<K> {
    Show(K),
    Hide(K),
}

#[derive(Debug, Clone)]
pub struct HoverDebouncer<K: Copy + Eq> {
    timeout: Duration,
    pending: Option<K>,
    show: Deadline,
    reset: Deadline,
    recently_showing: bool,
}

impl<K: Copy + Eq> HoverDebouncer<K> {
    pub fn new() -> Self {
        Self::with_timeout(HOVER_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            pending: None,
            show: Deadline::new(),
            reset: Deadline::new(),
            recently_showing: false,
        }
    }

    pub fn pending(&self) -> Option<K> {
        self.pending
    }

    pub fn recently_showing(&self) -> bool {
        self.recently_showing
    }

    /// Pointer entered `key`.
    ///
    /// Returns `Show` straight away when a tooltip was up a moment ago;
    /// otherwise the show is deferred to [`HoverDebouncer::tick`].
    pub fn hover_enter(&mut self, key: K, now: Instant) -> Option<TooltipCommand<K>> {
        if self.pending.is_some() {
            return None;
        }
        self.reset.cancel();
        if self.recently_showing {
            return Some(TooltipCommand::Show(key));
        }
        self.pending = Some(key);
        self.show.arm(now, self.timeout);
        None
    }

    /// Pointer left `key`.
    pub fn hover_leave(&mut self, key: K, now: Instant) -> TooltipCommand<K> {
        self.show.cancel();
        self.pending = None;
        if self.recently_showing {
            self.reset.arm(now, self.timeout);
        }
        TooltipCommand::Hide(key)
    }

    pub fn hover_changed(
        &mut self,
        key: K,
        hovered: bool,
        now: Instant,
    ) -> Option<TooltipCommand<K>> {
        if hovered {
            self.hover_enter(key, now)
        } else {
            Some(self.hover_leave(key, now))
        }
    }

    /// Advance timers.
    pub fn tick(&mut self, now: Instant) -> Option<TooltipCommand<K>> {
        if self.reset.fire(now) {
            self.recently_showing = false;
        }
        if self.show.fire(now) {
            self.recently_showing = true;
            return self.pending.take().map(TooltipCommand::Show);
        }
        None
    }

    /// Drop a pending show aimed at `key`, e.g. because the child is going away.
    pub fn forget(&mut self, key: K) {
        if self.pending == Some(key) {
            self.pending = None;
            self.show.cancel();
        }
    }

    /// Cancel every timer. Used when the owning container is destroyed.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.show.cancel();
        self.reset.cancel();
        self.recently_showing = false;
    }

    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        match (self.show.remaining(now), self.reset.remaining(now)) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

impl<K: Copy + Eq> Default for HoverDebouncer<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDirection {
    LeftToRight,
    RightToLeft,
}

/// Horizontal position of a tooltip centred over an item and kept inside
/// its parent.
///
/// In left-to-right layouts the left margin wins when the tooltip is wider
/// than the parent; in right-to-left layouts the right margin wins.
pub fn tooltip_x(
    item_x: i32,
    item_width: i32,
    tooltip_width: i32,
    parent_width: i32,
    direction: TextDirection,
) -> i32 {
    let centred = item_x + item_width / 2 - tooltip_width / 2;
    let right_limit = parent_width - tooltip_width - TOOLTIP_EDGE_MARGIN;
    match direction {
        TextDirection::LeftToRight => centred.min(right_limit).max(TOOLTIP_EDGE_MARGIN),
        TextDirection::RightToLeft => centred.max(TOOLTIP_EDGE_MARGIN).min(right_limit),
    }
}
