use anyhow::{Context, Result, bail, ensure};
use shared::coordinate::normalize_direction;
use shared::update::{AntField, BugField, SugarField};
use shared::video::{EntityInsert, UpdateRecord};
use shared::{Block, EntityKind, VideoReader};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Entity state rebuilt from a video, in steps.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaybackEntity {
    pub x: i32,
    pub y: i32,
    pub radius: i32,
    pub direction: i32,
    pub vitality: u16,
    pub load: u8,
    pub amount: u16,
}

impl PlaybackEntity {
    fn from_insert(pose: &EntityInsert) -> Self {
        Self {
            x: pose.x.into(),
            y: pose.y.into(),
            radius: pose.radius.into(),
            direction: pose.direction.into(),
            ..Default::default()
        }
    }

    fn move_by(&mut self, delta_x: i8, delta_y: i8, delta_direction: i16) {
        self.x += delta_x as i32;
        self.y += delta_y as i32;
        self.direction = normalize_direction(self.direction + delta_direction as i32);
    }

    fn apply(&mut self, record: &UpdateRecord) {
        match record {
            UpdateRecord::Bug(update) => {
                self.move_by(
                    update.delta_x(),
                    update.delta_y(),
                    update.delta_direction(),
                );
                if update.has_changed(BugField::Vitality) {
                    self.vitality = update.vitality();
                }
            }
            UpdateRecord::Ant(update) => {
                self.move_by(
                    update.delta_x(),
                    update.delta_y(),
                    update.delta_direction(),
                );
                if update.has_changed(AntField::Vitality) {
                    self.vitality = update.vitality();
                }
                if update.has_changed(AntField::Load) {
                    self.load = update.load();
                }
            }
            UpdateRecord::Sugar(update) => {
                if update.has_changed(SugarField::Amount) {
                    self.amount = update.amount();
                }
                if update.has_changed(SugarField::Radius) {
                    self.radius = update.radius().into();
                }
            }
        }
    }
}

/// Applies decoded blocks to a table of live entities.
#[derive(Debug, Default)]
pub struct Playback {
    pub tick: Option<u32>,
    pub frames: u32,
    pub entities: BTreeMap<(EntityKind, u16), PlaybackEntity>,
    in_frame: bool,
}

impl Playback {
    pub fn apply(&mut self, block: Block) -> Result<()> {
        if let Block::FrameStart { tick } = block {
            ensure!(!self.in_frame, "frame {tick} starts inside another frame");
            self.tick = Some(tick);
            self.in_frame = true;
            return Ok(());
        }
        ensure!(
            self.in_frame,
            "{} block outside of a frame",
            block.block_type()
        );

        match block {
            Block::FrameStart { .. } => {}
            Block::FrameEnd => {
                self.in_frame = false;
                self.frames += 1;
            }
            Block::Insert { kind, id, pose } => {
                let entity = PlaybackEntity::from_insert(&pose);
                if self.entities.insert((kind, id), entity).is_some() {
                    bail!("{kind} {id} inserted while still alive");
                }
            }
            Block::Update { id, record } => {
                let kind = record.kind();
                self.entities
                    .get_mut(&(kind, id))
                    .with_context(|| format!("update for unknown {kind} {id}"))?
                    .apply(&record);
            }
            Block::Remove { kind, id } => {
                if self.entities.remove(&(kind, id)).is_none() {
                    bail!("removal of unknown {kind} {id}");
                }
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn get(&self, kind: EntityKind, id: u16) -> Option<&PlaybackEntity> {
        self.entities.get(&(kind, id))
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.entities.keys().filter(|(k, _)| *k == kind).count()
    }
}

/// Decodes a complete video. Any decode error ends the replay.
pub fn replay_bytes(bytes: &[u8]) -> Result<Playback> {
    let mut reader = VideoReader::new(bytes).context("not a playable video")?;
    let mut playback = Playback::default();

    while let Some(block) = reader.next() {
        let block =
            block.with_context(|| format!("corrupt block before byte {}", reader.position()))?;
        playback.apply(block)?;
    }
    ensure!(!playback.in_frame, "video ends inside a frame");
    Ok(playback)
}

/// Replays the video at `path` and logs what it contains.
pub fn run(path: &Path) -> Result<()> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read video '{}'", path.display()))?;
    let playback = replay_bytes(&bytes)?;

    info!(
        path = %path.display(),
        frames = playback.frames,
        last_tick = ?playback.tick,
        bugs = playback.count(EntityKind::Bug),
        ants = playback.count(EntityKind::Ant),
        sugar_heaps = playback.count(EntityKind::Sugar),
        "replayed video"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::simulation::Simulation;
    use shared::VideoWriter;
    use shared::update::BugUpdate;

    #[test]
    fn test_replay_matches_final_simulation_state() {
        let config = SimulationConfig {
            seed: 9,
            playground_width: 200,
            playground_height: 150,
            bug_count: 4,
            ant_count: 12,
            sugar_count: 3,
            ..SimulationConfig::default()
        };
        let mut sim = Simulation::new(&config);
        let mut video = VideoWriter::new(Vec::new()).unwrap();
        sim.run(&mut video, 300).unwrap();

        let playback = replay_bytes(&video.into_inner()).unwrap();
        assert_eq!(playback.frames, 301);
        assert_eq!(playback.tick, Some(300));

        assert_eq!(playback.count(EntityKind::Bug), sim.bugs.len());
        for bug in sim.bugs.values() {
            let entity = playback.get(EntityKind::Bug, bug.id).unwrap();
            let pose = (entity.x, entity.y, entity.direction);
            let expected = (
                bug.coordinate.x_steps(),
                bug.coordinate.y_steps(),
                bug.coordinate.direction(),
            );
            assert_eq!(pose, expected, "bug {}", bug.id);
            assert_eq!(entity.vitality, bug.vitality, "bug {}", bug.id);
        }

        assert_eq!(playback.count(EntityKind::Ant), sim.ants.len());
        for ant in sim.ants.values() {
            let entity = playback.get(EntityKind::Ant, ant.id).unwrap();
            let pose = (entity.x, entity.y, entity.direction);
            let expected = (
                ant.coordinate.x_steps(),
                ant.coordinate.y_steps(),
                ant.coordinate.direction(),
            );
            assert_eq!(pose, expected, "ant {}", ant.id);
            assert_eq!(entity.vitality, ant.vitality, "ant {}", ant.id);
            assert_eq!(entity.load, ant.load, "ant {}", ant.id);
        }

        assert_eq!(playback.count(EntityKind::Sugar), sim.sugar.len());
        for heap in sim.sugar.values() {
            let entity = playback.get(EntityKind::Sugar, heap.id).unwrap();
            assert_eq!(entity.amount, heap.amount);
            assert_eq!(entity.radius, heap.coordinate.radius_steps());
        }
    }

    #[test]
    fn test_update_for_unknown_entity_fails() {
        let mut video = VideoWriter::new(Vec::new()).unwrap();
        video.begin_frame(0).unwrap();
        let mut bug = BugUpdate::new();
        bug.set_delta_x(1);
        video.update(4, &bug).unwrap();
        video.end_frame().unwrap();

        let error = replay_bytes(&video.into_inner()).unwrap_err();
        assert!(error.to_string().contains("unknown bug 4"), "{error}");
    }

    #[test]
    fn test_unfinished_frame_fails() {
        let mut video = VideoWriter::new(Vec::new()).unwrap();
        video.begin_frame(0).unwrap();
        video.end_frame().unwrap();
        let mut bytes = video.into_inner();
        bytes.pop();

        assert!(replay_bytes(&bytes).is_err());
    }

    #[test]
    fn test_garbage_is_not_a_video() {
        let error = replay_bytes(b"RIFF\x00\x00").unwrap_err();
        assert!(format!("{error:#}").contains("not a video stream"));
    }
}
