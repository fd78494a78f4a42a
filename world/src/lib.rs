#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative run state for the Surge spawn engine.
//!
//! The world owns the simulation clock and the ledger of units spawned so
//! far. It mutates exclusively through [`apply`], which executes a single
//! [`Command`] and broadcasts the resulting [`Event`] values for systems to
//! consume. Read access goes through the [`query`] module.

use std::time::Duration;

use surge_core::{Command, Event, UnitCount, UnitId};

/// Record of a single spawned unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Unit {
    id: UnitId,
    spawned_at: Duration,
}

impl Unit {
    /// Identifier allocated to the unit by the world.
    #[must_use]
    pub const fn id(&self) -> UnitId {
        self.id
    }

    /// Simulation time at which the unit entered the world.
    #[must_use]
    pub const fn spawned_at(&self) -> Duration {
        self.spawned_at
    }
}

/// Authoritative state mutated exclusively through [`apply`].
#[derive(Debug, Default)]
pub struct World {
    elapsed: Duration,
    tick_index: u64,
    units: Vec<Unit>,
    total_spawned: UnitCount,
    next_unit_id: u32,
}

impl World {
    /// Creates a world with a zeroed clock and an empty unit ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.elapsed = world.elapsed.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SpawnUnits { count } => {
            if count.is_zero() {
                return;
            }

            for _ in 0..count.get() {
                let id = UnitId::new(world.next_unit_id);
                world.next_unit_id = world.next_unit_id.saturating_add(1);
                world.units.push(Unit {
                    id,
                    spawned_at: world.elapsed,
                });
            }

            world.total_spawned = world.total_spawned.saturating_add(count);
            out_events.push(Event::UnitsSpawned {
                count,
                total: world.total_spawned,
            });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use surge_core::UnitCount;

    use super::{Unit, World};

    /// Simulation time accumulated across all processed ticks.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Number of ticks the world has processed.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Total units spawned since the world was created.
    #[must_use]
    pub fn total_spawned(world: &World) -> UnitCount {
        world.total_spawned
    }

    /// Captures a read-only view of the units inhabiting the world.
    #[must_use]
    pub fn unit_view(world: &World) -> UnitView {
        UnitView::from_units(world.units.clone())
    }

    /// Read-only snapshot describing all spawned units in deterministic order.
    #[derive(Clone, Debug, Default)]
    pub struct UnitView {
        units: Vec<Unit>,
    }

    impl UnitView {
        /// Creates a new unit view from the provided records.
        #[must_use]
        pub fn from_units(mut units: Vec<Unit>) -> Self {
            units.sort_by_key(Unit::id);
            Self { units }
        }

        /// Iterator over the captured unit records in deterministic order.
        pub fn iter(&self) -> impl Iterator<Item = &Unit> {
            self.units.iter()
        }

        /// Number of units captured by the view.
        #[must_use]
        pub fn len(&self) -> usize {
            self.units.len()
        }

        /// Reports whether the view holds no units.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.units.is_empty()
        }

        /// Consumes the view, yielding the underlying records.
        #[must_use]
        pub fn into_vec(self) -> Vec<Unit> {
            self.units
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use surge_core::{Command, Event, UnitCount, UnitId};

    use super::{apply, query, World};

    #[test]
    fn tick_advances_clock_and_broadcasts() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        );

        assert_eq!(query::elapsed(&world), Duration::from_millis(16));
        assert_eq!(query::tick_index(&world), 1);
        assert_eq!(
            events,
            vec![Event::TimeAdvanced {
                dt: Duration::from_millis(16),
            }]
        );
    }

    #[test]
    fn spawning_allocates_sequential_identifiers() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnUnits {
                count: UnitCount::new(3),
            },
            &mut events,
        );

        let ids: Vec<UnitId> = query::unit_view(&world)
            .iter()
            .map(|unit| unit.id())
            .collect();
        assert_eq!(ids, vec![UnitId::new(0), UnitId::new(1), UnitId::new(2)]);
        assert_eq!(query::total_spawned(&world), UnitCount::new(3));
        assert_eq!(
            events,
            vec![Event::UnitsSpawned {
                count: UnitCount::new(3),
                total: UnitCount::new(3),
            }]
        );
    }

    #[test]
    fn spawning_zero_units_is_silent() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnUnits {
                count: UnitCount::ZERO,
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert!(query::unit_view(&world).is_empty());
    }

    #[test]
    fn spawn_times_follow_the_clock() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(2),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SpawnUnits {
                count: UnitCount::new(1),
            },
            &mut events,
        );

        let units = query::unit_view(&world).into_vec();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].spawned_at(), Duration::from_secs(2));
    }
}
