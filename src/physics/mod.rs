//! Rigid-body physics seam
//!
//! The game never integrates motion itself. It asks a [`PhysicsWorld`] to
//! create discs, flip them between kinematic and dynamic, and report
//! which pairs started touching during a step.

pub mod rapier;

#[cfg(test)]
pub(crate) mod scripted;

pub use rapier::RapierWorld;

use glam::Vec2;

/// Opaque handle to a disc owned by the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId(pub u32);

/// How a body responds to the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Moved only by explicit position updates (the held disc)
    Kinematic,
    /// Affected by gravity and contacts
    Dynamic,
}

/// Read-only view of a disc
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub pos: Vec2,
    pub vel: Vec2,
    pub angle: f32,
    pub radius: f32,
    pub kind: BodyKind,
}

/// Two discs that began touching during the last step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactStart {
    pub a: BodyId,
    pub b: BodyId,
}

/// Capabilities the game consumes from a physics engine
///
/// Coordinates are logical pixels with y growing downward.
pub trait PhysicsWorld {
    /// Add a circular body
    fn create_disc(&mut self, pos: Vec2, radius: f32, kind: BodyKind) -> BodyId;

    /// Remove a body; false if it was already gone
    fn remove(&mut self, id: BodyId) -> bool;

    fn contains(&self, id: BodyId) -> bool;

    fn set_kind(&mut self, id: BodyId, kind: BodyKind);

    /// Teleport a body (velocity is left untouched)
    fn set_position(&mut self, id: BodyId, pos: Vec2);

    fn body(&self, id: BodyId) -> Option<BodyState>;

    /// Ids of every disc, in ascending order
    fn body_ids(&self) -> Vec<BodyId>;

    /// Advance one fixed step, returning pairs that started touching
    fn step(&mut self) -> Vec<ContactStart>;

    /// Remove every disc (walls stay)
    fn clear(&mut self);
}
