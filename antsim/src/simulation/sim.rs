use rand::SeedableRng;
use rand::rngs::StdRng;
use shared::video::EntityInsert;
use shared::{Coordinate, EntityKind, VideoError, VideoWriter};
use slotmap::SlotMap;
use std::io::Write;
use tracing::{debug, info, warn};

use crate::config::SimulationConfig;

use super::ant::{Ant, AntKey, Target};
use super::bug::{Bug, BugKey};
use super::sugar::{Sugar, SugarKey};
use super::{
    ANT_BITE_DAMAGE, ANT_RESPAWN_INTERVAL, BUG_BITE_DAMAGE, BUG_RESPAWN_INTERVAL, IdPool,
    NEST_RADIUS, Playground, SUGAR_AMOUNT, SUGAR_RESPAWN_INTERVAL, Timer,
};

/// An entity that left the playground during the mutate phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Removal {
    kind: EntityKind,
    id: u16,
    inserted: bool, // Whether a reader has seen it
}

/// Tick-based playground simulation.
///
/// Each tick runs a mutate phase ([`step`](Self::step)) for every entity,
/// then a record phase ([`record`](Self::record)) that flushes every entity
/// to the video exactly once.
pub struct Simulation {
    pub tick: u32,
    pub config: SimulationConfig,
    pub playground: Playground,
    pub nest: Coordinate,
    pub bugs: SlotMap<BugKey, Bug>,
    pub ants: SlotMap<AntKey, Ant>,
    pub sugar: SlotMap<SugarKey, Sugar>,
    pub sugar_collected: u32,

    bug_ids: IdPool,
    ant_ids: IdPool,
    sugar_ids: IdPool,
    pending_removals: Vec<Removal>,
    last_recorded: Option<u32>,

    bug_respawn_timer: Timer,
    ant_respawn_timer: Timer,
    sugar_respawn_timer: Timer,
    rng: StdRng,
}

impl Simulation {
    pub fn new(config: &SimulationConfig) -> Self {
        let playground = Playground::new(config.playground_width, config.playground_height);
        let nest = playground.center(NEST_RADIUS);

        let mut sim = Self {
            tick: 0,
            config: config.clone(),
            playground,
            nest,
            bugs: SlotMap::with_capacity_and_key(config.bug_count as usize),
            ants: SlotMap::with_capacity_and_key(config.ant_count as usize),
            sugar: SlotMap::with_capacity_and_key(config.sugar_count as usize),
            sugar_collected: 0,
            bug_ids: IdPool::new(),
            ant_ids: IdPool::new(),
            sugar_ids: IdPool::new(),
            pending_removals: Vec::new(),
            last_recorded: None,
            bug_respawn_timer: Timer::new(BUG_RESPAWN_INTERVAL, 0),
            ant_respawn_timer: Timer::new(ANT_RESPAWN_INTERVAL, 0),
            sugar_respawn_timer: Timer::new(SUGAR_RESPAWN_INTERVAL, 0),
            rng: StdRng::seed_from_u64(config.seed),
        };

        for _ in 0..config.sugar_count {
            sim.spawn_sugar();
        }
        for _ in 0..config.bug_count {
            sim.spawn_bug();
        }
        for _ in 0..config.ant_count {
            sim.spawn_ant();
        }
        sim
    }

    /// Records the initial population, then steps and records `ticks` times.
    pub fn run<W: Write>(
        &mut self,
        video: &mut VideoWriter<W>,
        ticks: u32,
    ) -> Result<(), VideoError> {
        if self.last_recorded.is_none() {
            self.record(video)?;
        }
        for _ in 0..ticks {
            self.step();
            self.record(video)?;
        }

        info!(
            tick = self.tick,
            frames = video.frames_written(),
            bugs = self.bugs.len(),
            ants = self.ants.len(),
            sugar_heaps = self.sugar.len(),
            sugar_collected = self.sugar_collected,
            "simulation finished"
        );
        Ok(())
    }

    /// Mutate phase of one tick.
    pub fn step(&mut self) {
        self.tick += 1;

        for bug in self.bugs.values_mut() {
            bug.update(&self.playground, &mut self.rng);
        }

        let mut delivered = 0u32;
        for ant in self.ants.values_mut() {
            let carried = ant.update(
                &self.nest,
                &mut self.sugar,
                &self.playground,
                &mut self.rng,
            );
            delivered += u32::from(carried);
        }
        if delivered > 0 {
            self.sugar_collected += delivered;
            debug!(
                tick = self.tick,
                delivered,
                total = self.sugar_collected,
                "sugar delivered"
            );
        }

        self.resolve_fights();
        self.despawn();
        self.respawn();
    }

    /// Bugs bite every ant they touch; the ants bite back.
    fn resolve_fights(&mut self) {
        for (bug_key, bug) in self.bugs.iter_mut() {
            for ant in self.ants.values_mut() {
                if bug.is_dead() {
                    break;
                }
                if ant.is_dead() || bug.coordinate.distance(&ant.coordinate) > 0 {
                    continue;
                }
                ant.take_damage(BUG_BITE_DAMAGE);
                bug.take_damage(ANT_BITE_DAMAGE);
                ant.set_target(Target::Bug(bug_key), &bug.coordinate);
            }
        }
    }

    fn despawn(&mut self) {
        let tick = self.tick;
        let removals = &mut self.pending_removals;

        self.bugs.retain(|_, bug| {
            if bug.is_dead() {
                debug!(tick, id = bug.id, "bug died");
                removals.push(Removal {
                    kind: EntityKind::Bug,
                    id: bug.id,
                    inserted: bug.is_inserted(),
                });
            }
            !bug.is_dead()
        });
        self.ants.retain(|_, ant| {
            if ant.is_dead() {
                debug!(tick, id = ant.id, load = ant.load, "ant died");
                removals.push(Removal {
                    kind: EntityKind::Ant,
                    id: ant.id,
                    inserted: ant.is_inserted(),
                });
            }
            !ant.is_dead()
        });
        self.sugar.retain(|_, heap| {
            if heap.is_empty() {
                debug!(tick, id = heap.id, "sugar heap used up");
                removals.push(Removal {
                    kind: EntityKind::Sugar,
                    id: heap.id,
                    inserted: heap.is_inserted(),
                });
            }
            !heap.is_empty()
        });
    }

    /// Refills each population by at most one entity per interval.
    fn respawn(&mut self) {
        if self.bugs.len() < self.config.bug_count as usize {
            self.bug_respawn_timer.update(1);
            if self.bug_respawn_timer.is_ready() {
                self.bug_respawn_timer.wrap();
                self.spawn_bug();
            }
        }

        if self.ants.len() < self.config.ant_count as usize {
            self.ant_respawn_timer.update(1);
            if self.ant_respawn_timer.is_ready() {
                self.ant_respawn_timer.wrap();
                self.spawn_ant();
            }
        }

        if self.sugar.len() < self.config.sugar_count as usize {
            self.sugar_respawn_timer.update(1);
            if self.sugar_respawn_timer.is_ready() {
                self.sugar_respawn_timer.wrap();
                self.spawn_sugar();
            }
        }
    }

    pub fn spawn_bug(&mut self) -> Option<BugKey> {
        let Some(id) = self.bug_ids.allocate() else {
            warn!(tick = self.tick, "no free bug id, bug not spawned");
            return None;
        };
        let bug = Bug::new(id, &self.playground, &mut self.rng);
        Some(self.bugs.insert(bug))
    }

    pub fn spawn_ant(&mut self) -> Option<AntKey> {
        let Some(id) = self.ant_ids.allocate() else {
            warn!(tick = self.tick, "no free ant id, ant not spawned");
            return None;
        };
        let ant = Ant::new(id, &self.nest, &mut self.rng);
        Some(self.ants.insert(ant))
    }

    pub fn spawn_sugar(&mut self) -> Option<SugarKey> {
        let Some(id) = self.sugar_ids.allocate() else {
            warn!(tick = self.tick, "no free sugar id, heap not spawned");
            return None;
        };
        let heap = Sugar::new(id, SUGAR_AMOUNT, &self.playground, &mut self.rng);
        Some(self.sugar.insert(heap))
    }

    /// Record phase: writes this tick's frame.
    ///
    /// Ids of removed entities are released only after their `Remove` block
    /// is staged, so no id is reused within a frame. A removal that fails to
    /// stage stays pending along with every removal after it.
    pub fn record<W: Write>(&mut self, video: &mut VideoWriter<W>) -> Result<(), VideoError> {
        video.begin_frame(self.tick)?;

        let removals = std::mem::take(&mut self.pending_removals);
        for (index, removal) in removals.iter().enumerate() {
            if removal.inserted {
                if let Err(error) = video.remove(removal.kind, removal.id) {
                    self.pending_removals = removals[index..].to_vec();
                    return Err(error);
                }
            }
            match removal.kind {
                EntityKind::Bug => self.bug_ids.release(removal.id),
                EntityKind::Ant => self.ant_ids.release(removal.id),
                EntityKind::Sugar => self.sugar_ids.release(removal.id),
            }
        }

        for heap in self.sugar.values_mut() {
            if !heap.is_inserted() {
                video.insert(EntityKind::Sugar, heap.id, &heap.coordinate)?;
                heap.inserted();
            }
            video.update(heap.id, &heap.take_update())?;
        }

        for bug in self.bugs.values_mut() {
            if !bug.is_inserted() {
                video.insert(EntityKind::Bug, bug.id, &bug.coordinate)?;
                bug.inserted(&EntityInsert::from_coordinate(&bug.coordinate));
            }
            video.update(bug.id, &bug.take_update())?;
        }

        for ant in self.ants.values_mut() {
            if !ant.is_inserted() {
                video.insert(EntityKind::Ant, ant.id, &ant.coordinate)?;
                ant.inserted(&EntityInsert::from_coordinate(&ant.coordinate));
            }
            video.update(ant.id, &ant.take_update())?;
        }

        video.end_frame()?;
        self.last_recorded = Some(self.tick);
        Ok(())
    }
}
