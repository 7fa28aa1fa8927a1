//! [`PhysicsWorld`] backed by rapier2d
//!
//! The container is three fixed cuboids (left, right, bottom). Discs are
//! ball colliders with collision events enabled; disc-vs-wall contacts are
//! filtered out before they reach the game.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use glam::Vec2;
use rapier2d::prelude::*;

use super::{BodyId, BodyKind, BodyState, ContactStart, PhysicsWorld};
use crate::config::{GameConfig, PhysicsConfig};
use crate::consts::SIM_DT;

/// A disc tracked by the adapter
#[derive(Debug, Clone, Copy)]
struct Disc {
    handle: RigidBodyHandle,
    radius: f32,
}

/// Collects collision-start events emitted during a step
#[derive(Default)]
struct ContactCollector {
    started: Mutex<Vec<(ColliderHandle, ColliderHandle)>>,
}

impl ContactCollector {
    fn drain(&self) -> Vec<(ColliderHandle, ColliderHandle)> {
        match self.started.lock() {
            Ok(mut started) => std::mem::take(&mut *started),
            Err(_) => Vec::new(),
        }
    }
}

impl EventHandler for ContactCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        if let CollisionEvent::Started(c1, c2, _) = event {
            if let Ok(mut started) = self.started.lock() {
                started.push((c1, c2));
            }
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

pub struct RapierWorld {
    gravity: Vector<Real>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    events: ContactCollector,
    material: PhysicsConfig,
    discs: BTreeMap<BodyId, Disc>,
    collider_owner: HashMap<ColliderHandle, BodyId>,
    next_id: u32,
}

impl RapierWorld {
    /// Build the container for the configured play field
    pub fn new(config: &GameConfig) -> Self {
        let mut params = IntegrationParameters::default();
        params.dt = SIM_DT;

        let mut world = Self {
            gravity: vector![0.0, config.physics.gravity],
            params,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            events: ContactCollector::default(),
            material: config.physics,
            discs: BTreeMap::new(),
            collider_owner: HashMap::new(),
            next_id: 1,
        };
        world.build_walls(config);
        world
    }

    fn build_walls(&mut self, config: &GameConfig) {
        let w = config.canvas_width;
        let h = config.canvas_height;
        let t = config.wall_thickness;

        // (centre, half extents)
        let walls = [
            (vector![t / 2.0, h / 2.0], vector![t / 2.0, h / 2.0]),
            (vector![w - t / 2.0, h / 2.0], vector![t / 2.0, h / 2.0]),
            (vector![w / 2.0, h - t / 2.0], vector![w / 2.0, t / 2.0]),
        ];

        for (center, half) in walls {
            let body = RigidBodyBuilder::fixed().translation(center).build();
            let handle = self.bodies.insert(body);
            let collider = ColliderBuilder::cuboid(half.x, half.y)
                .friction(self.material.wall_friction)
                .restitution(self.material.wall_restitution)
                .build();
            self.colliders
                .insert_with_parent(collider, handle, &mut self.bodies);
        }
    }

    fn handle(&self, id: BodyId) -> Option<RigidBodyHandle> {
        self.discs.get(&id).map(|d| d.handle)
    }

    fn body_type(kind: BodyKind) -> RigidBodyType {
        match kind {
            BodyKind::Kinematic => RigidBodyType::KinematicPositionBased,
            BodyKind::Dynamic => RigidBodyType::Dynamic,
        }
    }
}

impl PhysicsWorld for RapierWorld {
    fn create_disc(&mut self, pos: Vec2, radius: f32, kind: BodyKind) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;

        let body = RigidBodyBuilder::new(Self::body_type(kind))
            .translation(vector![pos.x, pos.y])
            .linear_damping(self.material.linear_damping)
            .angular_damping(self.material.angular_damping)
            .ccd_enabled(true)
            .build();
        let handle = self.bodies.insert(body);

        let collider = ColliderBuilder::ball(radius)
            .friction(self.material.friction)
            .restitution(self.material.restitution)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        let collider_handle = self
            .colliders
            .insert_with_parent(collider, handle, &mut self.bodies);

        self.discs.insert(id, Disc { handle, radius });
        self.collider_owner.insert(collider_handle, id);
        id
    }

    fn remove(&mut self, id: BodyId) -> bool {
        let Some(disc) = self.discs.remove(&id) else {
            return false;
        };
        self.collider_owner.retain(|_, owner| *owner != id);
        self.bodies
            .remove(
                disc.handle,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    fn contains(&self, id: BodyId) -> bool {
        self.discs.contains_key(&id)
    }

    fn set_kind(&mut self, id: BodyId, kind: BodyKind) {
        let Some(handle) = self.handle(id) else {
            return;
        };
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_body_type(Self::body_type(kind), true);
            // Mass is not rebuilt on a type switch; without it gravity does nothing
            body.recompute_mass_properties_from_colliders(&self.colliders);
            body.set_linvel(vector![0.0, 0.0], true);
            body.set_angvel(0.0, true);
        }
    }

    fn set_position(&mut self, id: BodyId, pos: Vec2) {
        let Some(handle) = self.handle(id) else {
            return;
        };
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_translation(vector![pos.x, pos.y], true);
        }
    }

    fn body(&self, id: BodyId) -> Option<BodyState> {
        let disc = self.discs.get(&id)?;
        let body = self.bodies.get(disc.handle)?;
        let t = body.translation();
        let v = body.linvel();
        Some(BodyState {
            pos: Vec2::new(t.x, t.y),
            vel: Vec2::new(v.x, v.y),
            angle: body.rotation().angle(),
            radius: disc.radius,
            kind: if body.is_dynamic() {
                BodyKind::Dynamic
            } else {
                BodyKind::Kinematic
            },
        })
    }

    fn body_ids(&self) -> Vec<BodyId> {
        self.discs.keys().copied().collect()
    }

    fn step(&mut self) -> Vec<ContactStart> {
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            None,
            &(),
            &self.events,
        );

        // Keep only disc-vs-disc pairs
        self.events
            .drain()
            .into_iter()
            .filter_map(|(c1, c2)| {
                let a = *self.collider_owner.get(&c1)?;
                let b = *self.collider_owner.get(&c2)?;
                Some(ContactStart { a, b })
            })
            .collect()
    }

    fn clear(&mut self) {
        for id in self.body_ids() {
            self.remove(id);
        }
    }
}
