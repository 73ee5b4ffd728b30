//! Haulage Core -- the work-discovery engine for hub-based logistics.
//!
//! Worker agents spawn from fixed hubs and move items between producers
//! (machines that turn inputs into outputs) and containers (chests). This
//! crate decides *what* a hub's workers should do next; rendering and
//! locomotion belong to the host.
//!
//! # Planning pipeline
//!
//! Each call to [`finder::WorkFinder::find_project`] is a pure function of
//! the current world:
//!
//! 1. **Connectivity** -- collect the floor tokens around the hub's access
//!    point ([`floor`]).
//! 2. **Sweep** -- breadth-first over walkable tiles of those floors.
//! 3. **Classify** -- turn each discovered occupant into a
//!    [`producer::Producer`] or [`container::Container`] view
//!    ([`classify`]).
//! 4. **Match** -- pair full producers with containers that can hold their
//!    product, and idle producers with containers that can supply a recipe.
//!    The first match wins.
//!
//! Nothing is cached between calls except facts that cannot change for the
//! life of a [`registry::Registry`] (machine-kind compatibility).
//!
//! # Key Types
//!
//! - [`world::World`] -- Entity arena, tile occupancy and terrain.
//! - [`registry::Registry`] -- Immutable item, machine and flooring
//!   definitions (frozen at startup).
//! - [`producer::Producer`] -- Four producer kinds: Machine, Trap, Pot and
//!   OutputBin.
//! - [`container::Container`] -- Capacity classes and all-or-nothing
//!   store/withdraw.
//! - [`assignment::Assignment`] -- One planned unit of work.
//! - [`worker::execute`] -- Carries out an assignment against the world.

pub mod assignment;
pub mod classify;
pub mod clock;
pub mod compat;
pub mod config;
pub mod container;
pub mod finder;
pub mod floor;
pub mod grid;
pub mod id;
pub mod item;
pub mod planner;
pub mod producer;
pub mod registry;
pub mod specialization;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod worker;
pub mod world;
