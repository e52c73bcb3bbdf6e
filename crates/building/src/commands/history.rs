//! Undo/redo stacks for grid edits.

use crate::config::MAX_HISTORY;
use crate::objects::ObjectId;

use super::types::{CommandContext, PlacementCommand};

/// Stores undo and redo stacks of executed commands.
#[derive(Debug, Clone)]
pub struct CommandStack {
    pub undo_stack: Vec<PlacementCommand>,
    pub redo_stack: Vec<PlacementCommand>,
    limit: usize,
}

impl Default for CommandStack {
    fn default() -> Self {
        Self::with_limit(MAX_HISTORY)
    }
}

impl CommandStack {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Apply `command` and record it if it produced an object.
    /// A recorded command clears the redo stack.
    pub fn execute(
        &mut self,
        mut command: PlacementCommand,
        ctx: &mut CommandContext,
    ) -> Option<ObjectId> {
        let id = command.apply(ctx)?;
        self.redo_stack.clear();
        self.push_undo(command);
        Some(id)
    }

    /// Revert the most recent command. Returns the object it affected.
    pub fn undo(&mut self, ctx: &mut CommandContext) -> Option<ObjectId> {
        let mut command = self.undo_stack.pop()?;
        let id = command.revert(ctx);
        self.redo_stack.push(command);
        id
    }

    /// Re-apply the most recently undone command.
    pub fn redo(&mut self, ctx: &mut CommandContext) -> Option<ObjectId> {
        let mut command = self.redo_stack.pop()?;
        let id = command.apply(ctx)?;
        self.push_undo(command);
        Some(id)
    }

    /// Push onto the undo stack without touching redo, evicting the oldest
    /// entry past the limit.
    fn push_undo(&mut self, command: PlacementCommand) {
        self.undo_stack.push(command);
        if self.undo_stack.len() > self.limit {
            self.undo_stack.remove(0);
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
