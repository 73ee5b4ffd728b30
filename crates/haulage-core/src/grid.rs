//! Tile coordinates, adjacency and the occupancy index.
//!
//! Provides a 2D grid-based spatial index that maps tiles to world entities,
//! supporting multi-tile footprints (hubs) alongside ordinary 1x1 occupants.

use crate::id::EntityId;
use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A position on the 2D grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The four orthogonal neighbors in N, E, S, W order.
    pub fn orthogonal_neighbors(&self) -> [GridPosition; 4] {
        Direction::all().map(|d| {
            let (dx, dy) = d.offset();
            self.offset(dx, dy)
        })
    }

    /// The four diagonal neighbors in NE, SE, SW, NW order.
    pub fn diagonal_neighbors(&self) -> [GridPosition; 4] {
        [
            self.offset(1, -1),
            self.offset(1, 1),
            self.offset(-1, 1),
            self.offset(-1, -1),
        ]
    }
}

/// Cardinal directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All four cardinal directions.
    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::East,
            Direction::South,
            Direction::West,
        ]
    }

    /// Offset for this direction.
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }
}

/// The footprint (size) of an entity on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    pub width: u32,
    pub height: u32,
}

impl Footprint {
    /// A 1x1 entity.
    pub fn single() -> Self {
        Self {
            width: 1,
            height: 1,
        }
    }

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Iterate over all tiles occupied by this footprint at the given origin.
    /// Origin is the top-left corner.
    pub fn tiles(&self, origin: GridPosition) -> impl Iterator<Item = GridPosition> {
        let w = self.width as i32;
        let h = self.height as i32;
        let ox = origin.x;
        let oy = origin.y;
        (0..h).flat_map(move |dy| (0..w).map(move |dx| GridPosition::new(ox + dx, oy + dy)))
    }
}

/// Errors from spatial operations.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SpatialError {
    #[error("tile {0:?} is occupied")]
    Occupied(GridPosition),
    #[error("entity is not placed on the grid")]
    NotPlaced,
    #[error("entity is already placed on the grid")]
    AlreadyPlaced,
}

// ---------------------------------------------------------------------------
// SpatialIndex
// ---------------------------------------------------------------------------

/// Maps tiles to the entities occupying them.
///
/// Maintains a bidirectional mapping:
/// - `tiles`: position -> entity (which entity occupies each tile)
/// - `positions`: entity -> origin position
/// - `footprints`: entity -> footprint
#[derive(Debug, Default, Clone)]
pub struct SpatialIndex {
    tiles: BTreeMap<GridPosition, EntityId>,
    positions: SecondaryMap<EntityId, GridPosition>,
    footprints: SecondaryMap<EntityId, Footprint>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place an entity on the grid. Origin is the top-left corner.
    pub fn place(
        &mut self,
        entity: EntityId,
        position: GridPosition,
        footprint: Footprint,
    ) -> Result<(), SpatialError> {
        if self.positions.contains_key(entity) {
            return Err(SpatialError::AlreadyPlaced);
        }
        if let Some(tile) = footprint.tiles(position).find(|t| self.tiles.contains_key(t)) {
            return Err(SpatialError::Occupied(tile));
        }

        for tile in footprint.tiles(position) {
            self.tiles.insert(tile, entity);
        }
        self.positions.insert(entity, position);
        self.footprints.insert(entity, footprint);
        Ok(())
    }

    /// Remove an entity from the grid. Returns its origin position.
    pub fn remove(&mut self, entity: EntityId) -> Result<GridPosition, SpatialError> {
        let position = self.positions.remove(entity).ok_or(SpatialError::NotPlaced)?;
        let footprint = self
            .footprints
            .remove(entity)
            .ok_or(SpatialError::NotPlaced)?;
        for tile in footprint.tiles(position) {
            self.tiles.remove(&tile);
        }
        Ok(position)
    }

    pub fn entity_at(&self, pos: GridPosition) -> Option<EntityId> {
        self.tiles.get(&pos).copied()
    }

    pub fn get_position(&self, entity: EntityId) -> Option<GridPosition> {
        self.positions.get(entity).copied()
    }

    pub fn is_occupied(&self, pos: GridPosition) -> bool {
        self.tiles.contains_key(&pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn make_entities(count: usize) -> (SlotMap<EntityId, ()>, Vec<EntityId>) {
        let mut sm = SlotMap::with_key();
        let ids: Vec<EntityId> = (0..count).map(|_| sm.insert(())).collect();
        (sm, ids)
    }

    #[test]
    fn neighbor_orders_are_fixed() {
        let p = GridPosition::new(5, 5);
        assert_eq!(
            p.orthogonal_neighbors(),
            [
                GridPosition::new(5, 4),
                GridPosition::new(6, 5),
                GridPosition::new(5, 6),
                GridPosition::new(4, 5),
            ]
        );
        assert_eq!(
            p.diagonal_neighbors(),
            [
                GridPosition::new(6, 4),
                GridPosition::new(6, 6),
                GridPosition::new(4, 6),
                GridPosition::new(4, 4),
            ]
        );
    }

    #[test]
    fn footprint_tiles_iteration() {
        let tiles: Vec<_> = Footprint::new(2, 3).tiles(GridPosition::new(10, 20)).collect();
        assert_eq!(tiles.len(), 6);
        assert!(tiles.contains(&GridPosition::new(11, 22)));
        assert_eq!(Footprint::single().tiles(GridPosition::new(1, 1)).count(), 1);
    }

    #[test]
    fn place_and_query_multi_tile() {
        let (_sm, ids) = make_entities(1);
        let mut index = SpatialIndex::new();
        index
            .place(ids[0], GridPosition::new(0, 0), Footprint::new(2, 2))
            .unwrap();
        assert_eq!(index.entity_at(GridPosition::new(1, 1)), Some(ids[0]));
        assert_eq!(index.entity_at(GridPosition::new(2, 0)), None);
        assert_eq!(index.get_position(ids[0]), Some(GridPosition::new(0, 0)));
    }

    #[test]
    fn place_overlapping_fails() {
        let (_sm, ids) = make_entities(2);
        let mut index = SpatialIndex::new();
        index
            .place(ids[0], GridPosition::new(0, 0), Footprint::new(2, 2))
            .unwrap();
        let err = index
            .place(ids[1], GridPosition::new(1, 1), Footprint::single())
            .unwrap_err();
        assert_eq!(err, SpatialError::Occupied(GridPosition::new(1, 1)));
        assert!(index.is_occupied(GridPosition::new(1, 0)));
    }

    #[test]
    fn place_twice_fails() {
        let (_sm, ids) = make_entities(1);
        let mut index = SpatialIndex::new();
        index
            .place(ids[0], GridPosition::new(0, 0), Footprint::single())
            .unwrap();
        assert_eq!(
            index.place(ids[0], GridPosition::new(5, 5), Footprint::single()),
            Err(SpatialError::AlreadyPlaced)
        );
    }

    #[test]
    fn remove_frees_all_tiles() {
        let (_sm, ids) = make_entities(1);
        let mut index = SpatialIndex::new();
        index
            .place(ids[0], GridPosition::new(3, 3), Footprint::new(2, 1))
            .unwrap();
        assert_eq!(index.remove(ids[0]), Ok(GridPosition::new(3, 3)));
        assert!(!index.is_occupied(GridPosition::new(4, 3)));
        assert_eq!(index.remove(ids[0]), Err(SpatialError::NotPlaced));
    }
}
