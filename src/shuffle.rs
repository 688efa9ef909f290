//! Timed random scrambles.
//!
//! A shuffle is a short run of slice turns played one per tick so it reads as
//! a series of moves. The sequencer is a two-state machine driven by explicit
//! frame deltas; it never schedules anything on its own.

use std::time::Duration;

use rand::Rng;

use crate::cube::CubeGrid;
use crate::slice::{SliceTurn, TurnMode};

/// Supplies the length of a shuffle and the turns that make it up.
pub(crate) trait MoveSource {
    fn move_count(&mut self) -> u32;
    fn next_move(&mut self) -> SliceTurn;
}

/// Uniformly random moves.
///
/// Indices are drawn from `1..=4`, so a quarter of the draws address a slice
/// past the last one and turn nothing.
#[derive(Debug)]
pub(crate) struct RandomMoves<R> {
    rng: R,
    min_moves: u32,
    max_moves: u32,
}

impl<R: Rng> RandomMoves<R> {
    pub(crate) fn new(rng: R, min_moves: u32, max_moves: u32) -> Self {
        Self {
            rng,
            min_moves,
            max_moves,
        }
    }
}

impl<R: Rng> MoveSource for RandomMoves<R> {
    fn move_count(&mut self) -> u32 {
        self.rng.gen_range(self.min_moves..=self.max_moves)
    }

    fn next_move(&mut self) -> SliceTurn {
        let index = self.rng.gen_range(1..=4);
        let clockwise = self.rng.gen_bool(0.5);
        if self.rng.gen_bool(0.5) {
            SliceTurn::row(index, clockwise)
        } else {
            SliceTurn::column(index, clockwise)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShuffleState {
    Idle,
    Running {
        remaining: u32,
        /// Time left before the next move fires.
        until_next: Duration,
    },
}

#[derive(Debug)]
pub(crate) struct ShuffleSequencer<S> {
    source: S,
    state: ShuffleState,
    delay: Duration,
    mode: TurnMode,
}

impl<S: MoveSource> ShuffleSequencer<S> {
    pub(crate) fn new(source: S, delay: Duration, mode: TurnMode) -> Self {
        Self {
            source,
            state: ShuffleState::Idle,
            delay,
            mode,
        }
    }

    pub(crate) fn state(&self) -> ShuffleState {
        self.state
    }

    pub(crate) fn is_running(&self) -> bool {
        matches!(self.state, ShuffleState::Running { .. })
    }

    pub(crate) fn remaining(&self) -> u32 {
        match self.state {
            ShuffleState::Idle => 0,
            ShuffleState::Running { remaining, .. } => remaining,
        }
    }

    /// Arm a new shuffle. The first move fires on the next [`advance`].
    ///
    /// Returns `false` without touching anything while a shuffle is in flight.
    ///
    /// [`advance`]: ShuffleSequencer::advance
    pub(crate) fn start(&mut self) -> bool {
        if self.is_running() {
            log::warn!("shuffle already running, {} moves left", self.remaining());
            return false;
        }

        let count = self.source.move_count();
        log::info!("shuffling with {count} moves");
        self.state = if count == 0 {
            ShuffleState::Idle
        } else {
            ShuffleState::Running {
                remaining: count,
                until_next: Duration::ZERO,
            }
        };
        true
    }

    /// Stop at the current tick boundary; moves already played stay applied.
    pub(crate) fn cancel(&mut self) {
        if let ShuffleState::Running { remaining, .. } = self.state {
            log::info!("shuffle cancelled with {remaining} moves left");
            self.state = ShuffleState::Idle;
        }
    }

    /// Let `dt` pass, playing every move that falls due. Returns how many moves were played.
    pub(crate) fn advance(&mut self, dt: Duration, grid: &mut CubeGrid) -> u32 {
        let ShuffleState::Running {
            mut remaining,
            until_next,
        } = self.state
        else {
            return 0;
        };

        let mut budget = dt;
        let mut wait = until_next;
        let mut played = 0;
        while remaining > 0 && wait <= budget {
            budget -= wait;
            let turn = self.source.next_move();
            log::trace!("shuffle tick {turn:?}");
            grid.apply_turn(turn, self.mode);
            remaining -= 1;
            played += 1;
            wait = self.delay;
        }

        self.state = if remaining == 0 {
            log::info!("shuffle finished");
            ShuffleState::Idle
        } else {
            ShuffleState::Running {
                remaining,
                until_next: wait - budget,
            }
        };
        played
    }
}

/// Plays back a fixed list of moves.
#[cfg(test)]
pub(crate) struct ScriptedMoves(pub(crate) std::collections::VecDeque<SliceTurn>);

#[cfg(test)]
impl MoveSource for ScriptedMoves {
    fn move_count(&mut self) -> u32 {
        self.0.len() as u32
    }

    fn next_move(&mut self) -> SliceTurn {
        self.0.pop_front().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::UnitQuaternion;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::config::CubeSettings;
    use crate::slice::SliceAxis;

    const DELAY: Duration = Duration::from_millis(100);

    fn grid() -> CubeGrid {
        CubeGrid::new(&CubeSettings::default())
    }

    fn orientations(grid: &CubeGrid) -> Vec<UnitQuaternion<f32>> {
        grid.cubelets.iter().map(|c| c.orientation).collect()
    }

    fn random_sequencer(seed: u64) -> ShuffleSequencer<RandomMoves<StdRng>> {
        ShuffleSequencer::new(
            RandomMoves::new(StdRng::seed_from_u64(seed), 10, 29),
            DELAY,
            TurnMode::InPlace,
        )
    }

    #[test]
    fn random_moves_use_shuffle_ranges() {
        let mut moves = RandomMoves::new(StdRng::seed_from_u64(3), 10, 29);
        let mut rows = 0;
        let mut columns = 0;
        for _ in 0..400 {
            let turn = moves.next_move();
            assert!((1..=4).contains(&turn.index));
            match turn.axis {
                SliceAxis::Row => rows += 1,
                SliceAxis::Column => columns += 1,
            }
        }
        assert!(rows > 0 && columns > 0);
    }

    #[test]
    fn first_move_fires_immediately_then_every_delay() {
        let turns = [
            SliceTurn::row(0, true),
            SliceTurn::row(1, true),
            SliceTurn::row(2, true),
        ];
        let mut sequencer =
            ShuffleSequencer::new(ScriptedMoves(turns.into()), DELAY, TurnMode::InPlace);
        let mut grid = grid();

        assert!(sequencer.start());
        assert_eq!(sequencer.remaining(), 3);
        assert_eq!(sequencer.advance(Duration::ZERO, &mut grid), 1);
        assert_eq!(sequencer.advance(Duration::from_millis(99), &mut grid), 0);
        assert_eq!(sequencer.advance(Duration::from_millis(1), &mut grid), 1);
        assert!(sequencer.is_running());
        assert_eq!(sequencer.advance(Duration::from_millis(100), &mut grid), 1);
        assert_eq!(sequencer.state(), ShuffleState::Idle);
        assert_eq!(sequencer.advance(Duration::from_secs(1), &mut grid), 0);
    }

    #[test]
    fn long_frame_catches_up() {
        let mut sequencer = random_sequencer(11);
        let mut grid = grid();
        sequencer.start();
        let total = sequencer.remaining();

        // Move 1 at t=0, then one more per 250ms / 100ms = 2 full delays.
        assert_eq!(sequencer.advance(Duration::from_millis(250), &mut grid), 3);
        assert_eq!(sequencer.remaining(), total - 3);
        // 50ms already elapsed toward the next move.
        assert_eq!(sequencer.advance(Duration::from_millis(50), &mut grid), 1);
    }

    #[test]
    fn start_is_ignored_while_running() {
        let mut sequencer = random_sequencer(5);
        let mut grid = grid();
        assert!(sequencer.start());
        sequencer.advance(Duration::ZERO, &mut grid);
        let remaining = sequencer.remaining();

        assert!(!sequencer.start());
        assert_eq!(sequencer.remaining(), remaining);
    }

    #[test]
    fn cancel_stops_at_tick_boundary() {
        let mut sequencer = random_sequencer(9);
        let mut grid = grid();
        sequencer.start();
        sequencer.advance(Duration::ZERO, &mut grid);
        let snapshot = orientations(&grid);

        sequencer.cancel();
        assert_eq!(sequencer.state(), ShuffleState::Idle);
        assert_eq!(sequencer.advance(Duration::from_secs(10), &mut grid), 0);
        assert_eq!(orientations(&grid), snapshot);
        assert!(sequencer.start());
    }

    #[test]
    fn scripted_shuffle_matches_direct_turns() {
        let script = [SliceTurn::row(2, true), SliceTurn::column(4, false)];
        let mut sequencer =
            ShuffleSequencer::new(ScriptedMoves(script.into()), DELAY, TurnMode::InPlace);
        let mut shuffled = grid();
        sequencer.start();
        sequencer.advance(Duration::ZERO, &mut shuffled);
        sequencer.advance(DELAY, &mut shuffled);
        assert!(!sequencer.is_running());

        let mut direct = grid();
        direct.rotate_row(2, true, TurnMode::InPlace);
        direct.rotate_column(4, false, TurnMode::InPlace);

        assert_eq!(orientations(&shuffled), orientations(&direct));
    }

    proptest! {
        #[test]
        fn shuffle_length_and_termination(seed in any::<u64>()) {
            let mut sequencer = random_sequencer(seed);
            let mut grid = grid();
            prop_assert!(sequencer.start());
            let total = sequencer.remaining();
            prop_assert!((10..=29).contains(&total));

            let mut played = sequencer.advance(Duration::ZERO, &mut grid);
            let mut ticks = 1;
            while sequencer.is_running() {
                prop_assert_eq!(sequencer.advance(DELAY - Duration::from_millis(1), &mut grid), 0);
                played += sequencer.advance(Duration::from_millis(1), &mut grid);
                ticks += 1;
                prop_assert!(ticks <= 29);
            }
            prop_assert_eq!(played, total);
            prop_assert_eq!(ticks, total);
        }
    }
}
