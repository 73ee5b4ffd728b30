//! Floor tokens and hub connectivity.
//!
//! A hub's flood-fill may only cross tiles whose floor token was found next
//! to its access point. Keying a hub to a floor material keeps unrelated rooms
//! and paths from bleeding into each other.

use crate::grid::GridPosition;
use crate::id::FlooringId;
use crate::world::{Environment, Terrain, WorldGrid};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The kind of floor a tile carries. Two tiles are the same floor iff their
/// tokens are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FloorToken {
    /// Synthetic token for open, unfloored interior ground.
    Bare,
    Flooring(FlooringId),
}

/// Floor token of a tile given its terrain and whether something stands on it.
///
/// Laid flooring always yields its token, even under an occupant. Otherwise
/// only an unoccupied, passable and placeable interior tile counts, as
/// [`FloorToken::Bare`].
pub fn floor_token(environment: Environment, terrain: &Terrain, occupied: bool) -> Option<FloorToken> {
    if let Some(flooring) = terrain.flooring {
        return Some(FloorToken::Flooring(flooring));
    }
    let bare = environment == Environment::Indoor
        && terrain.passable
        && terrain.placeable
        && !occupied;
    bare.then_some(FloorToken::Bare)
}

/// The floor tokens a hub's flood-fill may cross.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FloorSet(BTreeSet<FloorToken>);

impl FloorSet {
    pub fn contains(&self, token: FloorToken) -> bool {
        self.0.contains(&token)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = FloorToken> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<FloorToken> for FloorSet {
    fn from_iter<I: IntoIterator<Item = FloorToken>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Tokens found on the four orthogonal neighbors of `access_point`.
pub fn walkable_floor_set<G: WorldGrid + ?Sized>(grid: &G, access_point: GridPosition) -> FloorSet {
    access_point
        .orthogonal_neighbors()
        .into_iter()
        .filter_map(|tile| grid.floor_token_at(tile))
        .collect()
}

/// Whether a worker may walk across `tile` under `floors`.
pub fn is_walkable<G: WorldGrid + ?Sized>(grid: &G, tile: GridPosition, floors: &FloorSet) -> bool {
    grid.occupant_at(tile).is_none()
        && grid
            .floor_token_at(tile)
            .is_some_and(|token| floors.contains(token))
}
