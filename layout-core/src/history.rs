//! Undo/redo stacks of reversible commands.

/// A reversible mutation of `T`.
///
/// Commands carry everything they need to apply and revert themselves; the
/// [`History`] never looks inside them.
pub trait Command<T> {
    /// Apply (or re-apply) the change.
    fn redo(&mut self, target: &mut T);

    /// Revert the change.
    fn undo(&mut self, target: &mut T);

    /// Short label for menus ("Move", "Edit text").
    fn name(&self) -> &str;
}

/// Linear undo history.
pub struct History<T> {
    undo_stack: Vec<Box<dyn Command<T>>>,
    redo_stack: Vec<Box<dyn Command<T>>>,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }
}

impl<T> std::fmt::Debug for History<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("History")
            .field("undo", &self.undo_stack.iter().map(|c| c.name()).collect::<Vec<_>>())
            .field("redo", &self.redo_stack.iter().map(|c| c.name()).collect::<Vec<_>>())
            .finish()
    }
}

impl<T> History<T> {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute a command and record it. Clears the redo stack.
    pub fn push(&mut self, target: &mut T, mut command: Box<dyn Command<T>>) {
        command.redo(target);
        tracing::debug!("History push: {}", command.name());
        self.undo_stack.push(command);
        self.redo_stack.clear();
    }

    /// Record a command whose effect has already been applied.
    pub fn record(&mut self, command: Box<dyn Command<T>>) {
        tracing::debug!("History record: {}", command.name());
        self.undo_stack.push(command);
        self.redo_stack.clear();
    }

    /// Revert the most recent command. Returns `false` when there is none.
    pub fn undo(&mut self, target: &mut T) -> bool {
        let Some(mut command) = self.undo_stack.pop() else {
            return false;
        };
        command.undo(target);
        tracing::debug!("Undo: {}", command.name());
        self.redo_stack.push(command);
        true
    }

    /// Re-apply the most recently undone command. Returns `false` when there
    /// is none.
    pub fn redo(&mut self, target: &mut T) -> bool {
        let Some(mut command) = self.redo_stack.pop() else {
            return false;
        };
        command.redo(target);
        tracing::debug!("Redo: {}", command.name());
        self.undo_stack.push(command);
        true
    }

    /// Whether there is anything to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether there is anything to redo.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Label of the command [`History::undo`] would revert.
    #[must_use]
    pub fn undo_name(&self) -> Option<&str> {
        self.undo_stack.last().map(|c| c.name())
    }

    /// Label of the command [`History::redo`] would re-apply.
    #[must_use]
    pub fn redo_name(&self) -> Option<&str> {
        self.redo_stack.last().map(|c| c.name())
    }

    /// Number of undoable commands.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of redoable commands.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drop both stacks.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Add(i32);

    impl Command<i32> for Add {
        fn redo(&mut self, target: &mut i32) {
            *target += self.0;
        }

        fn undo(&mut self, target: &mut i32) {
            *target -= self.0;
        }

        fn name(&self) -> &str {
            "Add"
        }
    }

    struct Double;

    impl Command<i32> for Double {
        fn redo(&mut self, target: &mut i32) {
            *target *= 2;
        }

        fn undo(&mut self, target: &mut i32) {
            *target /= 2;
        }

        fn name(&self) -> &str {
            "Double"
        }
    }

    #[test]
    fn test_push_executes() {
        let mut value = 1;
        let mut history = History::new();
        history.push(&mut value, Box::new(Add(4)));
        assert_eq!(value, 5);
        assert!(history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.undo_name(), Some("Add"));
    }

    #[test]
    fn test_undo_redo_order() {
        let mut value = 1;
        let mut history = History::new();
        history.push(&mut value, Box::new(Add(2)));
        history.push(&mut value, Box::new(Double));
        assert_eq!(value, 6);

        assert!(history.undo(&mut value));
        assert_eq!(value, 3);
        assert_eq!(history.redo_name(), Some("Double"));
        assert!(history.undo(&mut value));
        assert_eq!(value, 1);
        assert!(!history.undo(&mut value));

        assert!(history.redo(&mut value));
        assert!(history.redo(&mut value));
        assert_eq!(value, 6);
        assert!(!history.redo(&mut value));
    }

    #[test]
    fn test_push_clears_redo() {
        let mut value = 0;
        let mut history = History::new();
        history.push(&mut value, Box::new(Add(1)));
        history.undo(&mut value);
        assert!(history.can_redo());
        history.push(&mut value, Box::new(Add(10)));
        assert!(!history.can_redo());
        assert_eq!(value, 10);
    }

    #[test]
    fn test_record_does_not_execute() {
        let mut value = 7;
        let mut history = History::new();
        history.record(Box::new(Add(3)));
        assert_eq!(value, 7);
        history.undo(&mut value);
        assert_eq!(value, 4);
    }

    #[test]
    fn test_clear() {
        let mut value = 0;
        let mut history = History::new();
        history.push(&mut value, Box::new(Add(1)));
        history.push(&mut value, Box::new(Add(1)));
        history.undo(&mut value);
        history.clear();
        assert_eq!((history.undo_depth(), history.redo_depth()), (0, 0));
        assert!(history.undo_name().is_none());
    }
}
