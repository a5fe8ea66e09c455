use crate::body::Body;
use crate::bowl::Bowl;
use crate::collision::{self, Contact, Impact};
use crate::top::{inside_unit_sphere, SpinTop, StepContext, StepOutcome};
use glam::DVec3;
use rand::Rng;
use spintop_shared::config::ArenaConfig;
use std::collections::HashSet;

/// A top together with the body the reference host integrates for it.
#[derive(Debug, Clone)]
pub struct ArenaTop {
    pub top: SpinTop,
    pub body: Body,
}

/// Something viewers should hear about.
#[derive(Debug, Clone, PartialEq)]
pub enum ArenaEvent {
    Impact(Impact),
    KnockedOut { top_id: u32, owner_id: u32 },
}

/// Bowl full of spinning tops, stepped at a fixed rate.
pub struct Arena {
    config: ArenaConfig,
    bowl: Bowl,
    /// Kept sorted by id so stepping order is deterministic
    tops: Vec<ArenaTop>,
    /// Pairs (lower id, higher id) currently overlapping
    touching: HashSet<(u32, u32)>,
    next_top_id: u32,
    event_buffer: Vec<ArenaEvent>,
}

impl Arena {
    pub fn new(config: ArenaConfig) -> Self {
        Self {
            bowl: Bowl::new(&config.bowl),
            config,
            tops: Vec::new(),
            touching: HashSet::new(),
            next_top_id: 1,
            event_buffer: Vec::new(),
        }
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn bowl(&self) -> &Bowl {
        &self.bowl
    }

    /// Spawn a top somewhere in the lower half of the bowl and launch it.
    pub fn add_top(&mut self, owner_id: u32, rng: &mut impl Rng) -> u32 {
        let id = self.next_top_id;
        self.next_top_id = self.next_top_id.wrapping_add(1);

        let mut offset = inside_unit_sphere(rng);
        offset.y = -offset.y.abs();
        let position = self.bowl.center + offset * self.bowl.radii * self.config.spawn_fraction;

        let mut body = Body::new(position, &self.config.top);
        let mut top = SpinTop::new(id, owner_id, self.config.top);
        top.launch(&mut body, rng);

        let at = self.tops.partition_point(|t| t.top.id < id);
        self.tops.insert(at, ArenaTop { top, body });
        id
    }

    pub fn remove_top(&mut self, id: u32) -> Option<ArenaTop> {
        let idx = self.tops.iter().position(|t| t.top.id == id)?;
        self.touching.retain(|&(a, b)| a != id && b != id);
        Some(self.tops.remove(idx))
    }

    pub fn get_top(&self, id: u32) -> Option<&ArenaTop> {
        self.tops.iter().find(|t| t.top.id == id)
    }

    pub fn get_top_mut(&mut self, id: u32) -> Option<&mut ArenaTop> {
        self.tops.iter_mut().find(|t| t.top.id == id)
    }

    pub fn tops(&self) -> impl Iterator<Item = &ArenaTop> {
        self.tops.iter()
    }

    pub fn top_count(&self) -> usize {
        self.tops.len()
    }

    /// Replenish a top's spin. Returns false if there is no such top.
    pub fn add_spin(&mut self, top_id: u32, amount: f64) -> bool {
        match self.get_top_mut(top_id) {
            Some(entry) => {
                entry.top.add_spin(amount);
                true
            }
            None => false,
        }
    }

    /// Simulate one fixed step.
    pub fn tick(&mut self, dt: f64, rng: &mut impl Rng) -> Vec<ArenaEvent> {
        // Take buffer out of self to avoid borrow conflicts
        let mut events = std::mem::take(&mut self.event_buffer);
        events.clear();

        let gravity = self.config.gravity;
        let ctx = StepContext {
            dt,
            gravity,
            bowl: &self.bowl,
        };

        for entry in self.tops.iter_mut() {
            let outcome = entry.top.fixed_update(&mut entry.body, &ctx, rng);
            if outcome == StepOutcome::KnockedOut {
                events.push(ArenaEvent::KnockedOut {
                    top_id: entry.top.id,
                    owner_id: entry.top.owner_id,
                });
            }
        }

        for entry in self.tops.iter_mut() {
            entry.body.integrate(dt, gravity);
            self.bowl.contain(&mut entry.body);
        }

        self.detect_contacts(rng, &mut events);

        // Return buffer for reuse next tick
        let result = events.clone();
        self.event_buffer = events;
        result
    }

    /// Resolve contacts that started this step and push overlapping pairs
    /// apart. A pair only collides again after it has separated.
    fn detect_contacts(&mut self, rng: &mut impl Rng, events: &mut Vec<ArenaEvent>) {
        let radius = self.config.contact_radius;
        let min_dist = 2.0 * radius;

        for i in 0..self.tops.len() {
            let (head, tail) = self.tops.split_at_mut(i + 1);
            let a = &mut head[i];
            for b in tail.iter_mut() {
                let key = (a.top.id.min(b.top.id), a.top.id.max(b.top.id));
                let offset = a.body.position - b.body.position;
                let dist = offset.length();

                if dist >= min_dist {
                    self.touching.remove(&key);
                    continue;
                }

                let normal = if dist > 1e-9 { offset / dist } else { DVec3::X };

                if self.touching.insert(key) {
                    let contact = Contact {
                        point: b.body.position + normal * radius,
                        relative_velocity: a.body.velocity - b.body.velocity,
                    };
                    if let Some(impacts) = collision::resolve(
                        &mut a.top,
                        &mut a.body,
                        &mut b.top,
                        &mut b.body,
                        &contact,
                        rng,
                    ) {
                        events.extend(impacts.into_iter().map(ArenaEvent::Impact));
                    }
                }

                let push = normal * (min_dist - dist) * 0.5;
                a.body.position += push;
                b.body.position -= push;
                self.bowl.contain(&mut a.body);
                self.bowl.contain(&mut b.body);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const DT: f64 = 1.0 / 60.0;

    fn test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    fn place(arena: &mut Arena, id: u32, position: DVec3) {
        let entry = arena.get_top_mut(id).unwrap();
        entry.body.position = position;
        entry.body.velocity = DVec3::ZERO;
    }

    fn impacts(events: &[ArenaEvent]) -> Vec<&Impact> {
        events
            .iter()
            .filter_map(|e| match e {
                ArenaEvent::Impact(impact) => Some(impact),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn add_top_assigns_unique_ids() {
        let mut rng = test_rng();
        let mut arena = Arena::new(ArenaConfig::default());
        let a = arena.add_top(1, &mut rng);
        let b = arena.add_top(1, &mut rng);
        let c = arena.add_top(2, &mut rng);
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_eq!(arena.top_count(), 3);
        assert_eq!(arena.get_top(c).unwrap().top.owner_id, 2);
    }

    #[test]
    fn spawns_in_lower_half_of_bowl() {
        let mut rng = test_rng();
        let mut arena = Arena::new(ArenaConfig::default());
        for owner in 0..50 {
            let id = arena.add_top(owner, &mut rng);
            let position = arena.get_top(id).unwrap().body.position;
            assert!(position.y <= 0.0);
            assert!(arena.bowl().level(position) <= 0.25 + 1e-12);
        }
    }

    #[test]
    fn bodies_stay_inside_bowl() {
        let mut rng = test_rng();
        let mut arena = Arena::new(ArenaConfig::default());
        for owner in 0..4 {
            arena.add_top(owner, &mut rng);
        }
        for _ in 0..600 {
            arena.tick(DT, &mut rng);
            for entry in arena.tops() {
                assert!(arena.bowl().level(entry.body.position) <= 1.0 + 1e-9);
            }
        }
    }

    #[test]
    fn same_seed_same_trajectories() {
        let run = || {
            let mut rng = ChaCha8Rng::seed_from_u64(99);
            let mut arena = Arena::new(ArenaConfig::default());
            for owner in 0..3 {
                arena.add_top(owner, &mut rng);
            }
            for _ in 0..300 {
                arena.tick(DT, &mut rng);
            }
            arena
                .tops()
                .map(|t| (t.body.position, t.top.spin_speed()))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn overlapping_tops_collide() {
        let mut rng = test_rng();
        let mut arena = Arena::new(ArenaConfig::default());
        let a = arena.add_top(1, &mut rng);
        let b = arena.add_top(2, &mut rng);
        place(&mut arena, a, DVec3::new(5.0, -1990.0, 0.0));
        place(&mut arena, b, DVec3::new(-5.0, -1990.0, 0.0));

        let spin_before = arena.get_top(a).unwrap().top.spin_speed();
        let events = arena.tick(DT, &mut rng);
        let hits = impacts(&events);

        assert_eq!(hits.len(), 2);
        assert!(hits.iter().any(|i| i.top_id == a && i.other_id == b));
        assert!(hits.iter().any(|i| i.top_id == b && i.other_id == a));
        assert!(arena.get_top(a).unwrap().top.spin_speed() < spin_before);
    }

    #[test]
    fn contact_only_counts_on_enter() {
        let mut rng = test_rng();
        let mut arena = Arena::new(ArenaConfig::default());
        let a = arena.add_top(1, &mut rng);
        let b = arena.add_top(2, &mut rng);
        let overlap = |arena: &mut Arena| {
            place(arena, a, DVec3::new(3.0, -1990.0, 0.0));
            place(arena, b, DVec3::new(-3.0, -1990.0, 0.0));
        };

        let mut events = Vec::new();
        overlap(&mut arena);
        arena.detect_contacts(&mut rng, &mut events);
        assert_eq!(impacts(&events).len(), 2);

        events.clear();
        overlap(&mut arena);
        arena.detect_contacts(&mut rng, &mut events);
        assert!(events.is_empty(), "still touching, no new impact");

        place(&mut arena, a, DVec3::new(300.0, -1990.0, 0.0));
        arena.detect_contacts(&mut rng, &mut events);
        assert!(events.is_empty());

        overlap(&mut arena);
        arena.detect_contacts(&mut rng, &mut events);
        assert_eq!(impacts(&events).len(), 2, "collides again after separating");
    }

    #[test]
    fn overlapping_pair_is_pushed_apart() {
        let mut rng = test_rng();
        let mut arena = Arena::new(ArenaConfig::default());
        let a = arena.add_top(1, &mut rng);
        let b = arena.add_top(2, &mut rng);
        place(&mut arena, a, DVec3::new(2.0, -1990.0, 0.0));
        place(&mut arena, b, DVec3::new(-2.0, -1990.0, 0.0));

        let mut events = Vec::new();
        arena.detect_contacts(&mut rng, &mut events);
        let pa = arena.get_top(a).unwrap().body.position;
        let pb = arena.get_top(b).unwrap().body.position;
        assert!(((pa - pb).length() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn knocked_out_top_reported_once_and_never_collides() {
        let mut rng = test_rng();
        let mut arena = Arena::new(ArenaConfig::default());
        let a = arena.add_top(1, &mut rng);
        let b = arena.add_top(2, &mut rng);
        {
            let top = &mut arena.get_top_mut(a).unwrap().top;
            let spin = top.spin_speed();
            top.lose_spin(spin - 10.0);
        }

        let events = arena.tick(DT, &mut rng);
        assert!(events.contains(&ArenaEvent::KnockedOut {
            top_id: a,
            owner_id: 1
        }));

        place(&mut arena, a, DVec3::new(1.0, -1990.0, 0.0));
        place(&mut arena, b, DVec3::new(-1.0, -1990.0, 0.0));
        for _ in 0..10 {
            let events = arena.tick(DT, &mut rng);
            assert!(events.is_empty(), "unexpected events: {:?}", events);
        }
    }

    #[test]
    fn add_spin_targets_existing_tops() {
        let mut rng = test_rng();
        let mut arena = Arena::new(ArenaConfig::default());
        let id = arena.add_top(1, &mut rng);
        {
            let top = &mut arena.get_top_mut(id).unwrap().top;
            let spin = top.spin_speed();
            top.lose_spin(spin - 100.0);
        }
        assert!(arena.add_spin(id, 50.0));
        assert_eq!(arena.get_top(id).unwrap().top.spin_speed(), 150.0);
        assert!(!arena.add_spin(id + 100, 50.0));
    }

    #[test]
    fn remove_top_forgets_contacts() {
        let mut rng = test_rng();
        let mut arena = Arena::new(ArenaConfig::default());
        let a = arena.add_top(1, &mut rng);
        let b = arena.add_top(2, &mut rng);
        place(&mut arena, a, DVec3::new(1.0, -1990.0, 0.0));
        place(&mut arena, b, DVec3::new(-1.0, -1990.0, 0.0));
        let mut events = Vec::new();
        arena.detect_contacts(&mut rng, &mut events);

        assert!(arena.remove_top(a).is_some());
        assert!(arena.remove_top(a).is_none());
        assert!(arena.touching.is_empty());
        assert_eq!(arena.top_count(), 1);
    }
}
