use crate::container::Capacity;
use crate::grid::GridPosition;
use crate::id::EntityId;
use crate::item::ItemStack;
use crate::specialization::Specialization;
use serde::{Deserialize, Serialize};

/// Which way items flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentKind {
    /// Collect from a full producer and store in a container.
    Deliver { capacity: Capacity },
    /// Withdraw from a container and fill an idle producer.
    Fetch,
}

/// One planned unit of work. A plan, not a commitment: nothing in the world
/// changes until a worker executes it, and it may turn out stale by then.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub specialization: Specialization,
    pub hub: EntityId,
    pub kind: AssignmentKind,
    /// Where the items are picked up.
    pub source: EntityId,
    pub source_tile: GridPosition,
    /// Where the items are dropped off.
    pub target: EntityId,
    pub target_tile: GridPosition,
    /// For a fetch, the shopping list withdrawn from the source container.
    /// For a delivery, the products expected from the source producer.
    pub items: Vec<ItemStack>,
}

impl Assignment {
    pub fn is_delivery(&self) -> bool {
        matches!(self.kind, AssignmentKind::Deliver { .. })
    }
}
