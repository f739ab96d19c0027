/// Index into the candidate list, `None` meaning "no selection".
///
/// The cursor always satisfies `index < len`, and it's only `None` when the list is empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelectionCursor {
    index: Option<usize>,
    len: usize,
}

impl SelectionCursor {
    /// Resets the cursor for a freshly resolved list of the given length
    pub fn reset(&mut self, len: usize) {
        self.len = len;
        self.index = if len > 0 { Some(0) } else { None };
    }

    /// The selected index, if any
    pub fn selected(&self) -> Option<usize> {
        self.index
    }

    /// Signed view of the cursor, `-1` when nothing is selected
    pub fn position(&self) -> isize {
        self.index.map(|i| i as isize).unwrap_or(-1)
    }

    /// Length of the list the cursor points into
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Advances the cursor, wrapping to the first item past the end
    pub fn select_next(&mut self) {
        if self.len == 0 {
            return;
        }
        let i = match self.index {
            Some(selected) if selected + 1 < self.len => selected + 1,
            Some(_) => 0,
            None => 0,
        };
        self.index = Some(i);
    }

    /// Retreats the cursor, wrapping to the last item before the start
    pub fn select_prev(&mut self) {
        if self.len == 0 {
            return;
        }
        let i = match self.index {
            Some(0) | None => self.len - 1,
            Some(selected) => selected - 1,
        };
        self.index = Some(i);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_reset() {
        let mut cursor = SelectionCursor::default();
        assert_eq!(cursor.position(), -1);

        cursor.reset(3);
        assert_eq!(cursor.selected(), Some(0));

        cursor.select_next();
        cursor.reset(0);
        assert_eq!(cursor.selected(), None);
        assert_eq!(cursor.position(), -1);
    }

    #[test]
    fn test_wraps_both_ways() {
        let mut cursor = SelectionCursor::default();
        cursor.reset(3);

        cursor.select_prev();
        assert_eq!(cursor.selected(), Some(2));
        cursor.select_next();
        assert_eq!(cursor.selected(), Some(0));
        cursor.select_next();
        cursor.select_next();
        assert_eq!(cursor.selected(), Some(2));
    }

    #[test]
    fn test_never_leaves_bounds() {
        for len in 0..5 {
            let mut cursor = SelectionCursor::default();
            cursor.reset(len);
            for step in 0..12 {
                if step % 3 == 0 {
                    cursor.select_prev();
                } else {
                    cursor.select_next();
                }
                let pos = cursor.position();
                assert!(pos >= -1 && pos < len as isize, "out of bounds: {pos} for len {len}");
                assert_eq!(pos == -1, len == 0);
            }
        }
    }
}
