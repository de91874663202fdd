use std::collections::BTreeSet;

use tui::widgets::TableState;

/// Cursor plus a set of marked record ids for list screens with batch delete.
#[derive(Default)]
pub struct Selection {
    pub table_state: TableState,
    marked: BTreeSet<String>,
}

impl Selection {
    pub fn new(len: usize) -> Self {
        let mut selection = Self::default();
        selection.reset(len);
        selection
    }

    /// Put the cursor back on the first row and forget every mark.
    pub fn reset(&mut self, len: usize) {
        self.marked.clear();
        self.table_state.select(if len == 0 { None } else { Some(0) });
    }

    pub fn selected(&self) -> Option<usize> {
        self.table_state.selected()
    }

    pub fn next(&mut self, len: usize) {
        if len == 0 {
            return;
        }

        let i = match self.table_state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous(&mut self, len: usize) {
        if len == 0 {
            return;
        }

        let i = match self.table_state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn toggle(&mut self, id: &str) {
        if !self.marked.remove(id) {
            self.marked.insert(id.to_string());
        }
    }

    pub fn is_marked(&self, id: &str) -> bool {
        self.marked.contains(id)
    }

    /// Ids to delete: the marked rows, or the row under the cursor if none are marked.
    pub fn targets(&self, current: Option<&str>) -> Vec<String> {
        if self.marked.is_empty() {
            current
                .filter(|id| !id.is_empty())
                .map(|id| vec![id.to_string()])
                .unwrap_or_default()
        } else {
            self.marked.iter().cloned().collect()
        }
    }

    /// Drop marks for ids that are no longer listed and clamp the cursor.
    pub fn retain(&mut self, ids: &[&str], len: usize) {
        self.marked.retain(|id| ids.contains(&id.as_str()));
        match self.table_state.selected() {
            _ if len == 0 => self.table_state.select(None),
            Some(i) if i >= len => self.table_state.select(Some(len - 1)),
            None => self.table_state.select(Some(0)),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_wraps() {
        let mut selection = Selection::new(3);
        selection.previous(3);
        assert_eq!(selection.selected(), Some(2));
        selection.next(3);
        assert_eq!(selection.selected(), Some(0));
    }

    #[test]
    fn targets_prefer_marks_over_cursor() {
        let mut selection = Selection::new(3);
        assert_eq!(selection.targets(Some("a")), vec!["a".to_string()]);

        selection.toggle("c");
        selection.toggle("b");
        assert_eq!(selection.targets(Some("a")), vec!["b".to_string(), "c".to_string()]);

        selection.toggle("b");
        assert_eq!(selection.targets(Some("a")), vec!["c".to_string()]);
    }

    #[test]
    fn retain_forgets_deleted_rows() {
        let mut selection = Selection::new(3);
        selection.toggle("a");
        selection.toggle("b");
        selection.next(3);
        selection.next(3);
        selection.retain(&["b"], 1);
        assert!(!selection.is_marked("a"));
        assert!(selection.is_marked("b"));
        assert_eq!(selection.selected(), Some(0));
    }
}
