//! Deterministic world double for controller tests
//!
//! Bodies never move on their own; tests place them, set velocities, and
//! queue the contacts the next step should report.

use std::collections::BTreeMap;

use glam::Vec2;

use super::{BodyId, BodyKind, BodyState, ContactStart, PhysicsWorld};

#[derive(Debug, Default)]
pub(crate) struct ScriptedWorld {
    bodies: BTreeMap<BodyId, BodyState>,
    queued: Vec<ContactStart>,
    next_id: u32,
    pub steps: u64,
}

impl ScriptedWorld {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    /// Contacts the next `step` will report
    pub fn queue_contact(&mut self, a: BodyId, b: BodyId) {
        self.queued.push(ContactStart { a, b });
    }

    pub fn set_velocity(&mut self, id: BodyId, vel: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.vel = vel;
        }
    }

    /// Set every body's velocity
    pub fn set_all_velocities(&mut self, vel: Vec2) {
        for body in self.bodies.values_mut() {
            body.vel = vel;
        }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }
}

impl PhysicsWorld for ScriptedWorld {
    fn create_disc(&mut self, pos: Vec2, radius: f32, kind: BodyKind) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        self.bodies.insert(
            id,
            BodyState {
                pos,
                vel: Vec2::ZERO,
                angle: 0.0,
                radius,
                kind,
            },
        );
        id
    }

    fn remove(&mut self, id: BodyId) -> bool {
        self.bodies.remove(&id).is_some()
    }

    fn contains(&self, id: BodyId) -> bool {
        self.bodies.contains_key(&id)
    }

    fn set_kind(&mut self, id: BodyId, kind: BodyKind) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.kind = kind;
        }
    }

    fn set_position(&mut self, id: BodyId, pos: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.pos = pos;
        }
    }

    fn body(&self, id: BodyId) -> Option<BodyState> {
        self.bodies.get(&id).copied()
    }

    fn body_ids(&self) -> Vec<BodyId> {
        self.bodies.keys().copied().collect()
    }

    fn step(&mut self) -> Vec<ContactStart> {
        self.steps += 1;
        std::mem::take(&mut self.queued)
    }

    fn clear(&mut self) {
        self.bodies.clear();
        self.queued.clear();
    }
}
