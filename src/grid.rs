//! Workspace grid arithmetic.
//!
//! Workspaces are laid out row-major from the top-left corner, `columns`
//! per row, without wrapping. All navigation helpers return `None` when the
//! target would fall outside `[0, count)` so callers can treat "no target" as
//! a silent no-op.

use crate::config::Rows;
use crate::shell::MotionDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    /// Towards lower indices.
    Up,
    /// Towards higher indices.
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkspaceGrid {
    rows: usize,
    columns: usize,
    count: usize,
}

impl WorkspaceGrid {
    pub fn new(rows: Rows, count: usize) -> Self {
        let rows = rows.get();
        Self {
            rows,
            columns: count.div_ceil(rows).max(1),
            count,
        }
    }

    /// Same row count over a different number of workspaces.
    pub fn resized(&self, count: usize) -> Self {
        Self {
            rows: self.rows,
            columns: count.div_ceil(self.rows).max(1),
            count,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn contains(&self, index: usize) -> bool {
        index < self.count
    }

    pub fn row_of(&self, index: usize) -> usize {
        index / self.columns
    }

    pub fn column_of(&self, index: usize) -> usize {
        index % self.columns
    }

    /// First workspace index of the row holding `active`.
    pub fn first_in_row(&self, active: usize) -> usize {
        self.row_of(active) * self.columns
    }

    /// Workspace indices the switcher slots bind to while `active` is current.
    /// Entries past the last workspace are `None`.
    pub fn slot_indices(&self, active: usize) -> Vec<Option<usize>> {
        let first = self.first_in_row(active);
        (first..first + self.columns)
            .map(|index| self.contains(index).then_some(index))
            .collect()
    }

    fn checked(&self, index: Option<usize>) -> Option<usize> {
        index.filter(|i| self.contains(*i))
    }

    /// Step within the active row; never crosses a row boundary.
    pub fn scroll_step(&self, active: usize, direction: ScrollDirection) -> Option<usize> {
        let column = self.column_of(active);
        let target = match direction {
            ScrollDirection::Up if column > 0 => Some(active - 1),
            ScrollDirection::Down
                if active + 1 < self.count && column != self.columns - 1 =>
            {
                Some(active + 1)
            }
            _ => None,
        };
        self.checked(target)
    }

    /// Step to the adjacent row keeping the column.
    pub fn row_step(&self, active: usize, direction: ScrollDirection) -> Option<usize> {
        let row = self.row_of(active);
        let column = self.column_of(active);
        let target_row = match direction {
            ScrollDirection::Up => row.checked_sub(1),
            ScrollDirection::Down => Some(row + 1),
        };
        self.checked(target_row.map(|r| r * self.columns + column))
    }

    /// Jump to the row under a click at `y` within an indicator `height` tall.
    pub fn row_at(&self, active: usize, y: f64, height: f64) -> Option<usize> {
        if !height.is_finite() || height <= 0.0 || !y.is_finite() || y < 0.0 {
            return None;
        }
        let target_row = (self.rows as f64 * y / height).floor() as usize;
        if target_row == self.row_of(active) {
            return None;
        }
        self.checked(Some(target_row * self.columns + self.column_of(active)))
    }

    /// Grid neighbor in `direction`, or `None` at the grid edge.
    pub fn neighbor(&self, index: usize, direction: MotionDirection) -> Option<usize> {
        let column = self.column_of(index);
        let target = match direction {
            MotionDirection::Left if column > 0 => Some(index - 1),
            MotionDirection::Right if column + 1 < self.columns => Some(index + 1),
            MotionDirection::Up => index.checked_sub(self.columns),
            MotionDirection::Down => Some(index + self.columns),
            _ => None,
        };
        self.checked(target)
    }
}
