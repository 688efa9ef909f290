//! iced shader widget hosting the cubelet viewport.
//!
//! The widget keeps the scene and the interaction controller in its own
//! state, turns iced events into controller calls, and reports selection and
//! shuffle progress back to the application as messages.

use std::time::{Duration, Instant};

use iced::widget::shader::{self, wgpu};
use iced::{Rectangle, event, mouse, window};
use nalgebra::{Point2, Vector2};
use rand::rngs::StdRng;

use crate::Message;
use crate::camera::CameraUniform;
use crate::config::CubeSettings;
use crate::controller::{InteractionController, KeyAction};
use crate::renderer::{InstanceRaw, Renderer, generate_instances};
use crate::scene::{CubeScene, SceneHost};
use crate::selection::SelectionState;
use crate::shuffle::{RandomMoves, ShuffleState};

/// What the control pane shows about the viewport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ViewStatus {
    pub(crate) selection: SelectionState,
    /// Shuffle moves still to play, zero when idle.
    pub(crate) shuffle_remaining: u32,
}

/// Frame data handed to the renderer
#[derive(Debug, Clone)]
pub(crate) struct CubePrimitive {
    /// Per-cubelet model matrices for this frame
    instances: Vec<InstanceRaw>,
    /// Camera matrices for this frame
    camera_uniform: CameraUniform,
}

impl shader::Primitive for CubePrimitive {
    fn prepare(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        storage: &mut shader::Storage,
        _bounds: &Rectangle,
        viewport: &shader::Viewport,
    ) {
        if !storage.has::<Renderer>() {
            storage.store(Renderer::new(device, format, viewport.physical_size()));
        }
        let Some(renderer) = storage.get_mut::<Renderer>() else {
            return;
        };
        renderer.resize(device, viewport.physical_size());
        renderer.update_instances(device, queue, &self.instances);
        renderer.update_camera(queue, &self.camera_uniform);
    }

    fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        storage: &shader::Storage,
        target: &wgpu::TextureView,
        clip_bounds: &Rectangle<u32>,
    ) {
        if let Some(renderer) = storage.get::<Renderer>() {
            renderer.render(encoder, target, clip_bounds);
        }
    }
}

/// Scene plus everything input mutates, created on the first event.
struct Session {
    /// Grid, camera and intro animation
    scene: CubeScene,
    /// Selection, drag and shuffle state
    controller: InteractionController<RandomMoves<StdRng>>,
    /// Time of the previous animated frame; `None` while nothing animates
    last_frame: Option<Instant>,
    /// Shuffle button presses already acted on
    shuffle_requests_seen: u64,
    /// Stop button presses already acted on
    cancel_requests_seen: u64,
    /// Last status sent to the control pane
    reported: ViewStatus,
}

impl Session {
    fn new(program: &CubeShaderProgram) -> Self {
        Self {
            scene: CubeScene::new(&program.settings),
            controller: InteractionController::new(&program.settings),
            last_frame: None,
            shuffle_requests_seen: program.shuffle_requests,
            cancel_requests_seen: program.cancel_requests,
            reported: ViewStatus::default(),
        }
    }

    /// Pick up button presses from the control pane.
    fn sync_requests(&mut self, program: &CubeShaderProgram) {
        if program.shuffle_requests != self.shuffle_requests_seen {
            self.shuffle_requests_seen = program.shuffle_requests;
            self.controller.request_shuffle();
        }
        if program.cancel_requests != self.cancel_requests_seen {
            self.cancel_requests_seen = program.cancel_requests;
            self.controller.cancel_shuffle();
        }
    }

    fn needs_frames(&self) -> bool {
        self.scene.is_animating() || self.controller.is_busy()
    }

    fn tick(&mut self, now: Instant) {
        let dt = self
            .last_frame
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.scene.advance_frame(dt);
        self.controller.frame(&mut self.scene, dt);
        self.last_frame = self.needs_frames().then_some(now);
    }

    fn status(&self) -> ViewStatus {
        ViewStatus {
            selection: self.controller.selection().clone(),
            shuffle_remaining: match self.controller.shuffle_state() {
                ShuffleState::Idle => 0,
                ShuffleState::Running { remaining, .. } => remaining,
            },
        }
    }

    /// Status message when something the control pane shows has changed.
    fn take_status_change(&mut self) -> Option<Message> {
        let status = self.status();
        if status == self.reported {
            return None;
        }
        self.reported = status.clone();
        Some(Message::Status(status))
    }
}

#[derive(Default)]
pub(crate) struct CubeShaderState {
    session: Option<Session>,
}

pub(crate) struct CubeShaderProgram {
    /// Settings the session is built from
    settings: CubeSettings,
    shuffle_requests: u64,
    cancel_requests: u64,
}

impl CubeShaderProgram {
    /// `shuffle_requests` and `cancel_requests` are press counters; each
    /// change since the last event is one request.
    pub(crate) fn new(settings: CubeSettings, shuffle_requests: u64, cancel_requests: u64) -> Self {
        Self {
            settings,
            shuffle_requests,
            cancel_requests,
        }
    }
}

impl shader::Program<Message> for CubeShaderProgram {
    type State = CubeShaderState;
    type Primitive = CubePrimitive;

    fn update(
        &self,
        state: &mut Self::State,
        event: shader::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
        shell: &mut iced::advanced::Shell<'_, Message>,
    ) -> (event::Status, Option<Message>) {
        let session = state.session.get_or_insert_with(|| Session::new(self));
        session.scene.projection.set_viewport(bounds.width, bounds.height);
        session.sync_requests(self);

        let status = match event {
            shader::Event::Mouse(mouse_event) => {
                Self::handle_mouse_event(session, mouse_event, bounds, cursor)
            }
            shader::Event::Keyboard(keyboard_event) => {
                Self::handle_keyboard_event(session, keyboard_event)
            }
            shader::Event::RedrawRequested(now) => {
                session.tick(now);
                event::Status::Ignored
            }
            _ => event::Status::Ignored,
        };

        if session.needs_frames() || status == event::Status::Captured {
            shell.request_redraw(window::RedrawRequest::NextFrame);
        }

        (status, session.take_status_change())
    }

    fn draw(
        &self,
        state: &Self::State,
        _cursor: mouse::Cursor,
        bounds: Rectangle,
    ) -> Self::Primitive {
        let primitive = |scene: &CubeScene| {
            let mut camera_uniform = CameraUniform::new();
            camera_uniform.update_view_proj(&scene.camera, &scene.projection);
            CubePrimitive {
                instances: generate_instances(scene.grid()),
                camera_uniform,
            }
        };

        match &state.session {
            Some(session) => primitive(&session.scene),
            None => {
                let mut scene = CubeScene::new(&self.settings);
                scene.projection.set_viewport(bounds.width, bounds.height);
                primitive(&scene)
            }
        }
    }
}

impl CubeShaderProgram {
    fn handle_mouse_event(
        session: &mut Session,
        mouse_event: mouse::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> event::Status {
        let viewport = Vector2::new(bounds.width, bounds.height);
        let Session {
            scene, controller, ..
        } = session;

        match mouse_event {
            mouse::Event::CursorMoved { .. } => {
                let Some(position) = cursor.position_in(bounds) else {
                    return event::Status::Ignored;
                };
                let dragging = controller.drag().dragging;
                controller.pointer_moved(scene, Point2::new(position.x, position.y), viewport);
                if dragging {
                    return event::Status::Captured;
                }
            }
            mouse::Event::ButtonPressed(mouse::Button::Left) => {
                if let Some(position) = cursor.position_in(bounds) {
                    controller.pointer_pressed(scene, Point2::new(position.x, position.y), viewport);
                    return event::Status::Captured;
                }
            }
            mouse::Event::ButtonReleased(mouse::Button::Left) => {
                if controller.drag().dragging {
                    controller.pointer_released();
                    return event::Status::Captured;
                }
            }
            mouse::Event::WheelScrolled { delta } => {
                if cursor.position_in(bounds).is_some() {
                    let y = match delta {
                        mouse::ScrollDelta::Lines { y, .. } => y,
                        mouse::ScrollDelta::Pixels { y, .. } => y,
                    };
                    // iced reports scrolling up as positive; the controller
                    // expects positive for scrolling down.
                    controller.wheel(scene, -y);
                    return event::Status::Captured;
                }
            }
            _ => {}
        }

        event::Status::Ignored
    }

    fn handle_keyboard_event(
        session: &mut Session,
        keyboard_event: iced::keyboard::Event,
    ) -> event::Status {
        use iced::keyboard::{Event, Key};

        if let Event::KeyPressed {
            key: Key::Character(character),
            ..
        } = keyboard_event
        {
            if let Some(action) = KeyAction::from_key(character.as_str()) {
                session.controller.key_pressed(&mut session.scene, action);
                return event::Status::Captured;
            }
        }

        event::Status::Ignored
    }
}
