//! Input glue between the viewport and the cube.
//!
//! The controller owns everything that input mutates apart from the scene
//! itself: the selection, the drag gesture and the shuffle in flight. The
//! scene is passed in on every call.

use std::time::Duration;

use nalgebra::{Point2, UnitQuaternion, Vector2, Vector3};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::CubeSettings;
use crate::ray_casting::pointer_to_ndc;
use crate::scene::SceneHost;
use crate::selection::{Selected, SelectionState};
use crate::shuffle::{MoveSource, RandomMoves, ShuffleSequencer, ShuffleState};

/// Keyboard shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyAction {
    ZoomIn,
    ZoomOut,
    RandomizeSelection,
    Shuffle,
}

impl KeyAction {
    pub(crate) fn from_key(key: &str) -> Option<Self> {
        match key {
            "x" => Some(KeyAction::ZoomIn),
            "z" => Some(KeyAction::ZoomOut),
            "r" => Some(KeyAction::RandomizeSelection),
            "k" => Some(KeyAction::Shuffle),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct DragState {
    pub(crate) dragging: bool,
    /// Last pointer position seen, dragging or not.
    pub(crate) last_position: Option<Point2<f32>>,
}

pub(crate) struct InteractionController<S> {
    settings: CubeSettings,
    selection: SelectionState,
    drag: DragState,
    shuffle: ShuffleSequencer<S>,
    rng: StdRng,
}

impl InteractionController<RandomMoves<StdRng>> {
    /// Controller with randomness seeded from the OS.
    pub(crate) fn new(settings: &CubeSettings) -> Self {
        Self::seeded(settings, rand::random())
    }

    /// Controller whose shuffles and random selections are reproducible.
    pub(crate) fn seeded(settings: &CubeSettings, seed: u64) -> Self {
        let moves = RandomMoves::new(
            StdRng::seed_from_u64(seed),
            settings.shuffle_min_moves,
            settings.shuffle_max_moves,
        );
        Self::with_moves(settings, moves, StdRng::seed_from_u64(seed.wrapping_add(1)))
    }
}

impl<S: MoveSource> InteractionController<S> {
    pub(crate) fn with_moves(settings: &CubeSettings, moves: S, rng: StdRng) -> Self {
        Self {
            settings: settings.clone(),
            selection: SelectionState::default(),
            drag: DragState::default(),
            shuffle: ShuffleSequencer::new(moves, settings.shuffle_delay(), settings.turn_mode),
            rng,
        }
    }

    pub(crate) fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub(crate) fn drag(&self) -> &DragState {
        &self.drag
    }

    pub(crate) fn shuffle_state(&self) -> ShuffleState {
        self.shuffle.state()
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.drag.dragging || self.shuffle.is_running()
    }

    /// Primary button went down: start dragging and select under the pointer.
    pub(crate) fn pointer_pressed(
        &mut self,
        scene: &mut impl SceneHost,
        position: Point2<f32>,
        viewport: Vector2<f32>,
    ) -> Option<Selected> {
        self.drag.dragging = true;
        self.drag.last_position = Some(position);
        self.select(&*scene, position, viewport)
    }

    /// Pointer moved. While dragging, the whole grid follows the pointer and
    /// the selection is re-resolved afterwards.
    pub(crate) fn pointer_moved(
        &mut self,
        scene: &mut impl SceneHost,
        position: Point2<f32>,
        viewport: Vector2<f32>,
    ) -> Option<Selected> {
        let previous = self.drag.last_position.replace(position);
        if !self.drag.dragging {
            return None;
        }

        if let Some(previous) = previous {
            let delta = position - previous;
            let pitch = (delta.y * self.settings.drag_sensitivity).to_radians();
            let yaw = (delta.x * self.settings.drag_sensitivity).to_radians();
            // Intrinsic XYZ order: pitch about X first, then yaw about the new Y.
            let rotation = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), pitch)
                * UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw);

            let aggregate = &mut scene.grid_mut().aggregate;
            aggregate.orientation = rotation * aggregate.orientation;
            aggregate.orientation.renormalize();
        }

        self.select(&*scene, position, viewport)
    }

    pub(crate) fn pointer_released(&mut self) {
        self.drag.dragging = false;
    }

    /// Scroll with the browser sign convention: positive is toward the user.
    ///
    /// Scrolling down turns the selected row, scrolling up the selected column.
    pub(crate) fn wheel(&mut self, scene: &mut impl SceneHost, delta_y: f32) -> usize {
        let mode = self.settings.turn_mode;
        if delta_y > 0.0 {
            scene.grid_mut().rotate_row(self.selection.row, true, mode)
        } else {
            scene.grid_mut().rotate_column(self.selection.column, true, mode)
        }
    }

    pub(crate) fn key_pressed(&mut self, scene: &mut impl SceneHost, action: KeyAction) {
        log::debug!("key action {action:?}");
        let (step, min, max) = (
            self.settings.zoom_step,
            self.settings.min_distance,
            self.settings.max_distance,
        );
        match action {
            KeyAction::ZoomIn => scene.camera_mut().dolly(-step, min, max),
            KeyAction::ZoomOut => scene.camera_mut().dolly(step, min, max),
            KeyAction::RandomizeSelection => self.selection.randomize(&mut self.rng),
            KeyAction::Shuffle => {
                self.request_shuffle();
            }
        }
    }

    /// Start a shuffle unless one is already playing.
    pub(crate) fn request_shuffle(&mut self) -> bool {
        self.shuffle.start()
    }

    pub(crate) fn cancel_shuffle(&mut self) {
        self.shuffle.cancel();
    }

    /// Per-frame tick. Returns the number of shuffle moves played.
    pub(crate) fn frame(&mut self, scene: &mut impl SceneHost, dt: Duration) -> u32 {
        self.shuffle.advance(dt, scene.grid_mut())
    }

    fn select(
        &mut self,
        scene: &impl SceneHost,
        position: Point2<f32>,
        viewport: Vector2<f32>,
    ) -> Option<Selected> {
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return None;
        }
        let ndc = pointer_to_ndc(position.x, position.y, viewport.x, viewport.y);
        self.selection.resolve(scene, ndc)
    }
}
