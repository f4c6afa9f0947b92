//! Per-document capability checks.
//!
//! Every ownership decision goes through these functions: the in-memory store
//! filters with them and the handlers use them to tell "not visible" from
//! "visible but read-only". The Postgres queries encode the same predicates.

use uuid::Uuid;

use crate::models::{Goal, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    None,
    Read,
    ReadWrite,
}

impl Access {
    pub fn can_read(self) -> bool {
        matches!(self, Access::Read | Access::ReadWrite)
    }

    pub fn can_write(self) -> bool {
        matches!(self, Access::ReadWrite)
    }
}

/// Single-owner documents (expenses, savings).
pub fn owner_access(caller: Uuid, owner: Uuid) -> Access {
    if caller == owner {
        Access::ReadWrite
    } else {
        Access::None
    }
}

/// Tasks: creator and assignee may both read and write.
pub fn task_access(caller: Uuid, task: &Task) -> Access {
    if caller == task.created_by || caller == task.assigned_to {
        Access::ReadWrite
    } else {
        Access::None
    }
}

/// Goals: the creator writes, assignees only read.
pub fn goal_access(caller: Uuid, goal: &Goal) -> Access {
    if caller == goal.created_by {
        Access::ReadWrite
    } else if goal.assigned_to.contains(&caller) {
        Access::Read
    } else {
        Access::None
    }
}
