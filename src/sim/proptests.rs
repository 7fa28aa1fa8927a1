//! Property tests for scoring and merge resolution

use std::collections::HashMap;

use glam::Vec2;
use proptest::prelude::*;

use super::{Controller, GameEvent, TickInput};
use crate::config::GameConfig;
use crate::consts::SIM_DT;
use crate::persistence::{SavedBody, Snapshot};
use crate::physics::scripted::ScriptedWorld;
use crate::physics::{BodyId, BodyKind, PhysicsWorld};
use crate::theme::{DEFAULT_THEME, ThemeCatalog};

fn pile(bodies: &[(f32, f32, u8)]) -> Controller<ScriptedWorld> {
    let catalog = ThemeCatalog::builtin();
    let tiers = catalog.tiers(DEFAULT_THEME).unwrap().to_vec();
    let snapshot = Snapshot {
        score: 0,
        next_tier: None,
        held_tier: None,
        bodies: bodies
            .iter()
            .map(|&(x, y, level)| SavedBody {
                x,
                y,
                tier: tiers[level as usize - 1].clone(),
            })
            .collect(),
        timestamp: 0.0,
        theme: DEFAULT_THEME.to_string(),
    };
    let mut controller = Controller::new(
        ScriptedWorld::new(),
        catalog,
        DEFAULT_THEME,
        GameConfig::default(),
        11,
    )
    .unwrap();
    controller.restore(&snapshot).unwrap();
    controller
}

/// Free discs by id: position and level
fn free_discs(controller: &Controller<ScriptedWorld>) -> HashMap<BodyId, (Vec2, u8)> {
    controller
        .bodies()
        .into_iter()
        .filter(|b| !b.held)
        .map(|b| (BodyId(b.id), (Vec2::new(b.x, b.y), b.tier.level)))
        .collect()
}

fn body_strategy() -> impl Strategy<Value = (f32, f32, u8)> {
    (60.0f32..340.0, 420.0f32..560.0, 1u8..=4)
}

proptest! {
    #[test]
    fn score_is_the_sum_of_merge_points(
        bodies in prop::collection::vec(body_strategy(), 2..16),
        contacts in prop::collection::vec(
            prop::collection::vec((any::<usize>(), any::<usize>()), 0..6),
            1..20,
        ),
    ) {
        let mut controller = pile(&bodies);
        let mut expected = 0u64;
        let mut last = 0u64;

        for batch in contacts {
            let ids: Vec<BodyId> = {
                let mut ids: Vec<_> = free_discs(&controller).into_keys().collect();
                ids.sort();
                ids
            };
            if ids.is_empty() {
                break;
            }
            for (a, b) in batch {
                controller
                    .world_mut()
                    .queue_contact(ids[a % ids.len()], ids[b % ids.len()]);
            }
            controller.tick(&TickInput::default(), SIM_DT).unwrap();

            for event in controller.drain_events() {
                if let GameEvent::Merged { points, .. } = event {
                    expected += points;
                }
            }
            prop_assert!(controller.score() >= last);
            prop_assert_eq!(controller.score(), expected);
            last = controller.score();
        }
    }

    #[test]
    fn merges_yield_one_next_tier_disc_at_the_midpoint(
        bodies in prop::collection::vec(body_strategy(), 2..16),
        pairs in prop::collection::vec((any::<usize>(), any::<usize>()), 1..12),
    ) {
        let mut controller = pile(&bodies);
        let before = free_discs(&controller);
        let mut ids: Vec<_> = before.keys().copied().collect();
        ids.sort();
        for (a, b) in pairs {
            controller
                .world_mut()
                .queue_contact(ids[a % ids.len()], ids[b % ids.len()]);
        }
        controller.tick(&TickInput::default(), SIM_DT).unwrap();
        let after = free_discs(&controller);

        let top = controller.catalog().tiers(DEFAULT_THEME).unwrap().len() as u8;
        let mut merges = 0;
        for event in controller.drain_events() {
            let GameEvent::Merged { consumed, created, level, points, pos } = event else {
                continue;
            };
            merges += 1;
            let (pa, la) = before[&consumed[0]];
            let (pb, lb) = before[&consumed[1]];
            prop_assert_ne!(consumed[0], consumed[1]);
            prop_assert_eq!(la, lb);
            prop_assert_eq!(level, la + 1);
            prop_assert!(level <= top);
            prop_assert_eq!(points, 10u64 << (level - 1));
            prop_assert!(pos.distance((pa + pb) / 2.0) < 1e-3);

            prop_assert!(!after.contains_key(&consumed[0]));
            prop_assert!(!after.contains_key(&consumed[1]));
            let (created_pos, created_level) = after[&created];
            prop_assert_eq!(created_level, level);
            prop_assert!(created_pos.distance(pos) < 1e-3);
        }
        // Each merge takes two discs and gives back one
        prop_assert_eq!(after.len() + merges, before.len());
    }

    #[test]
    fn at_most_one_kinematic_disc(
        bodies in prop::collection::vec(body_strategy(), 0..10),
        actions in prop::collection::vec((0u8..4, 0.0f32..400.0), 1..200),
    ) {
        let mut controller = pile(&bodies);
        for (action, x) in actions {
            let input = TickInput {
                aim_x: (action == 1).then_some(x),
                drop: action == 2,
                pause: false,
            };
            if action == 3 {
                let held = controller.held();
                let spawned = controller.spawn().unwrap();
                if held.is_some() {
                    prop_assert!(spawned.is_none());
                    prop_assert_eq!(controller.held(), held);
                }
            }
            controller.tick(&input, SIM_DT).unwrap();

            let world = controller.world();
            let kinematic = world
                .body_ids()
                .into_iter()
                .filter_map(|id| world.body(id))
                .filter(|body| body.kind == BodyKind::Kinematic)
                .count();
            prop_assert!(kinematic <= 1);
            prop_assert_eq!(kinematic, usize::from(controller.held().is_some()));
        }
    }
}
