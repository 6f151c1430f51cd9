#[cfg(test)]
mod property_tests {
    use glam::Vec2;
    use proptest::prelude::*;

    use crate::config::{LimbConfig, PhysicsConfig, SpawnConfig};
    use crate::physics::{BodyParams, BodyShape, PhysicsWorld};
    use crate::pose::{BodyPart, Keypoint, Pose};
    use crate::render::{Color, Viewport};
    use crate::sketch::{AgingPolicy, LimbTracker, NoBodies, PebbleStore, SpawnPolicy};

    proptest! {
        #[test]
        fn cap_is_never_exceeded(
            cap in 1usize..64,
            batches in prop::collection::vec(0usize..20, 1..30)
        ) {
            let mut store = PebbleStore::new();
            let mut born = 0u64;
            for batch in batches {
                for _ in 0..batch {
                    let oldest_before = store.oldest().map(|p| p.born_ms);
                    let evicted = store.make_room(cap, &mut NoBodies);
                    store.add(Vec2::ZERO, 10.0, Color::RED, born, None);
                    born += 1;

                    prop_assert!(store.len() <= cap);
                    if evicted > 0 {
                        // 淘汰的一定是最老的
                        let oldest_after = store.oldest().map(|p| p.born_ms);
                        prop_assert!(oldest_after > oldest_before);
                    }
                }
            }
            let born_order: Vec<u64> = store.iter().map(|p| p.born_ms).collect();
            prop_assert!(born_order.windows(2).all(|w| w[0] < w[1]));
        }

        #[test]
        fn spawn_batches_respect_debounce(
            debounce in 0u64..300,
            steps in prop::collection::vec(0u64..120, 1..80)
        ) {
            let mut spawner = SpawnPolicy::new(SpawnConfig {
                debounce_ms: debounce,
                seed: Some(1),
                ..SpawnConfig::default()
            });
            let poses = vec![Pose::new(vec![Keypoint::new(
                BodyPart::Nose,
                Vec2::new(10.0, 10.0),
                0.9,
            )])];

            let mut now = 0u64;
            let mut batches = Vec::new();
            for step in steps {
                now += step;
                if !spawner.collect(now, &poses).is_empty() {
                    batches.push(now);
                }
            }
            prop_assert!(batches.windows(2).all(|w| w[1] - w[0] >= debounce));
        }

        #[test]
        fn ttl_removes_exactly_expired(
            ttl in 1u64..20_000,
            births in prop::collection::vec(0u64..40_000, 0..50),
            now in 0u64..60_000
        ) {
            let aging = AgingPolicy::new(ttl);
            let mut store = PebbleStore::new();
            let mut sorted = births.clone();
            sorted.sort_unstable();
            for born in &sorted {
                store.add(Vec2::ZERO, 5.0, Color::WHITE, *born, None);
            }

            let expected = sorted.iter().filter(|b| now.saturating_sub(**b) > ttl).count();
            let retired = aging.apply(&mut store, now, &mut NoBodies);

            prop_assert_eq!(retired, expected);
            prop_assert!(store.iter().all(|p| p.age(now) <= ttl));
        }

        #[test]
        fn retirement_keeps_bodies_in_sync(
            ops in prop::collection::vec(0u8..3, 1..60)
        ) {
            let mut world = PhysicsWorld::new(&PhysicsConfig::default()).unwrap();
            let mut store = PebbleStore::new();
            let mut now = 0u64;
            for op in ops {
                now += 100;
                match op {
                    0 => {
                        let h = world.create_body(
                            BodyShape::Circle { radius: 5.0 },
                            BodyParams { position: Vec2::new(50.0, 50.0), ..BodyParams::default() },
                        );
                        store.add(Vec2::new(50.0, 50.0), 10.0, Color::WHITE, now, Some(h));
                    }
                    1 => {
                        store.retire_oldest(&mut world);
                    }
                    _ => {
                        store.retire_expired(now, 250, &mut world);
                    }
                }
                prop_assert_eq!(store.len(), world.body_count());
                prop_assert!(store.iter().all(|p| p.body.map_or(false, |h| world.contains(h))));
            }
        }

        #[test]
        fn limb_moves_iff_confident(
            scores in prop::collection::vec(0.0f32..1.0, 1..20),
            threshold in 0.1f32..0.95
        ) {
            let config = PhysicsConfig {
                limbs: vec![LimbConfig::hand(BodyPart::LeftWrist, 30.0, threshold)],
                ..PhysicsConfig::default()
            };
            let mut world = PhysicsWorld::new(&config).unwrap();
            let mut tracker = LimbTracker::new(&config, &mut world, Viewport::new(640, 480));

            for (i, score) in scores.into_iter().enumerate() {
                let before = tracker.limbs()[0].pose();
                let target = Vec2::new(10.0 + i as f32, 20.0 + i as f32);
                let pose = Pose::new(vec![Keypoint::new(BodyPart::LeftWrist, target, score)]);

                let moved = tracker.update(&[pose], &mut world);
                let after = tracker.limbs()[0].pose();

                if score > threshold {
                    prop_assert_eq!(moved, 1);
                    prop_assert_eq!(after.center, target);
                } else {
                    prop_assert_eq!(moved, 0);
                    prop_assert_eq!(after, before);
                }
            }
        }
    }
}
