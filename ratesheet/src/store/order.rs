//! Column order controller.
//!
//! Reordering touches only the column list. Row data and validation state
//! are keyed by column name, so no move can change them.

use crate::error::{StoreError, StoreResult};

/// Move the column at `from` to position `to`, shifting the columns in
/// between. Moving a column onto itself is a no-op.
pub fn move_column(columns: &mut Vec<String>, from: usize, to: usize) -> StoreResult<()> {
    let len = columns.len();
    if from >= len {
        return Err(StoreError::ColumnOutOfRange { index: from, len });
    }
    if to >= len {
        return Err(StoreError::ColumnOutOfRange { index: to, len });
    }
    if from == to {
        return Ok(());
    }

    let column = columns.remove(from);
    columns.insert(to, column);
    Ok(())
}

/// One continuous drag of a column header.
///
/// Every hover over another position moves the column right away and the
/// drag keeps following it, so the displayed order tracks the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDrag {
    current: usize,
}

impl ColumnDrag {
    /// Start dragging the column at `index`.
    pub fn start(index: usize) -> Self {
        Self { current: index }
    }

    /// Position of the dragged column right now.
    pub fn current(&self) -> usize {
        self.current
    }

    /// The pointer is over position `over`.
    pub fn hover(&mut self, columns: &mut Vec<String>, over: usize) -> StoreResult<()> {
        if over == self.current {
            return Ok(());
        }
        move_column(columns, self.current, over)?;
        self.current = over;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_move_forward() {
        let mut c = cols(&["a", "b", "c", "d"]);
        move_column(&mut c, 0, 2).unwrap();
        assert_eq!(c, cols(&["b", "c", "a", "d"]));
    }

    #[test]
    fn test_move_backward() {
        let mut c = cols(&["a", "b", "c", "d"]);
        move_column(&mut c, 3, 1).unwrap();
        assert_eq!(c, cols(&["a", "d", "b", "c"]));
    }

    #[test]
    fn test_same_index_noop() {
        let mut c = cols(&["a", "b"]);
        move_column(&mut c, 1, 1).unwrap();
        assert_eq!(c, cols(&["a", "b"]));
    }

    #[test]
    fn test_out_of_range() {
        let mut c = cols(&["a", "b"]);
        assert_eq!(
            move_column(&mut c, 2, 0),
            Err(StoreError::ColumnOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(
            move_column(&mut c, 0, 5),
            Err(StoreError::ColumnOutOfRange { index: 5, len: 2 })
        );
        assert_eq!(c, cols(&["a", "b"]));
    }

    #[test]
    fn test_moves_are_permutations() {
        let original = cols(&["a", "b", "c", "d", "e"]);
        let mut c = original.clone();
        for (from, to) in [(0, 4), (3, 1), (2, 2), (4, 0), (1, 3)] {
            move_column(&mut c, from, to).unwrap();
        }
        let mut sorted = c.clone();
        sorted.sort();
        assert_eq!(sorted, original);
    }

    #[test]
    fn test_drag_tracks_pointer() {
        let mut c = cols(&["a", "b", "c", "d"]);
        let mut drag = ColumnDrag::start(0);

        drag.hover(&mut c, 1).unwrap();
        assert_eq!(c, cols(&["b", "a", "c", "d"]));
        drag.hover(&mut c, 2).unwrap();
        assert_eq!(c, cols(&["b", "c", "a", "d"]));
        drag.hover(&mut c, 2).unwrap();
        drag.hover(&mut c, 3).unwrap();

        assert_eq!(c, cols(&["b", "c", "d", "a"]));
        assert_eq!(drag.current(), 3);
    }
}
