//! 4×4×4 cubelet puzzle viewer with iced UI.
//!
//! Sixty-four cubelets rendered with wgpu inside an iced shader widget. Rows
//! and columns are picked with the pointer and turned with the mouse wheel;
//! a shuffle button scrambles the cube with a timed series of random turns.

use iced::widget::{Column, Row, Shader, button, container, text};
use iced::{Background, Color, Element, Length, Settings, Task, Theme};

mod camera;
mod config;
mod controller;
mod cube;
mod error;
mod ray_casting;
mod renderer;
mod scene;
mod selection;
mod shader_widget;
mod shuffle;
mod slice;
mod tween;

use config::CubeSettings;
use shader_widget::{CubeShaderProgram, ViewStatus};

/// Environment variable naming a settings file when no path argument is given.
const SETTINGS_ENV: &str = "CUBELET_SETTINGS";

const INDICATOR_ON: Color = Color::from_rgb(1.0, 0.6, 0.0);
const INDICATOR_OFF: Color = Color::from_rgb(0.0, 0.6, 1.0);

/// Main application state - handles the control pane only
#[derive(Debug)]
pub(crate) struct CubeletApp {
    settings: CubeSettings,
    shuffle_requests: u64,
    cancel_requests: u64,
    status: ViewStatus,
}

#[derive(Debug, Clone)]
pub(crate) enum Message {
    Shuffle,
    CancelShuffle,
    /// Selection or shuffle progress changed inside the viewport.
    Status(ViewStatus),
}

impl CubeletApp {
    pub(crate) fn new(settings: CubeSettings) -> Self {
        Self {
            settings,
            shuffle_requests: 0,
            cancel_requests: 0,
            status: ViewStatus::default(),
        }
    }

    pub(crate) fn title(&self) -> &'static str {
        "Cubelet"
    }

    pub(crate) fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Shuffle => {
                self.shuffle_requests += 1;
            }
            Message::CancelShuffle => {
                self.cancel_requests += 1;
            }
            Message::Status(status) => {
                self.status = status;
            }
        }

        Task::none()
    }

    pub(crate) fn view(&self) -> Element<Message> {
        let shuffling = self.status.shuffle_remaining > 0;
        let selection = &self.status.selection;

        let indicator = |label: &str, index: i32, active: bool| {
            let color = if active { INDICATOR_ON } else { INDICATOR_OFF };
            text(format!("{label} {index}")).size(20).color(color)
        };

        let progress = if shuffling {
            format!("{} moves left", self.status.shuffle_remaining)
        } else {
            String::from("Idle")
        };

        let controls = Column::new()
            .spacing(20)
            .width(250)
            .push(
                Row::new()
                    .spacing(10)
                    .push(button("Shuffle").on_press_maybe((!shuffling).then_some(Message::Shuffle)))
                    .push(button("Stop").on_press_maybe(shuffling.then_some(Message::CancelShuffle))),
            )
            .push(text(progress))
            .push(
                Column::new()
                    .spacing(5)
                    .push(text("Selection"))
                    .push(indicator("Row", selection.row, selection.row_indicator))
                    .push(indicator("Column", selection.column, selection.column_indicator)),
            )
            .push(
                Column::new()
                    .spacing(2)
                    .push(text("Click a cubelet to pick a row or column"))
                    .push(text("Drag to spin, wheel to turn"))
                    .push(text("x / z  zoom in / out"))
                    .push(text("r  random selection"))
                    .push(text("k  shuffle")),
            );

        let viewport = container(
            Shader::new(CubeShaderProgram::new(
                self.settings.clone(),
                self.shuffle_requests,
                self.cancel_requests,
            ))
            .width(Length::Fill)
            .height(Length::Fill),
        )
        .style(|_theme: &Theme| container::Style {
            background: Some(Background::Color(Color::BLACK)),
            ..container::Style::default()
        });

        Row::new()
            .spacing(10)
            .padding(10)
            .push(container(controls).width(Length::Shrink).height(Length::Fill))
            .push(viewport)
            .into()
    }
}

/// Settings from the path given as the first argument, else from
/// `CUBELET_SETTINGS`, else the defaults.
fn load_settings() -> CubeSettings {
    let Some(path) = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(SETTINGS_ENV).ok())
    else {
        return CubeSettings::default();
    };

    match CubeSettings::load(&path) {
        Ok(settings) => {
            log::info!("loaded settings from {path}");
            settings
        }
        Err(err) => {
            log::warn!("ignoring settings file {path}: {err}");
            CubeSettings::default()
        }
    }
}

fn main() -> iced::Result {
    env_logger::builder().format_timestamp(None).init();

    let app = CubeletApp::new(load_settings());
    iced::application(app.title(), CubeletApp::update, CubeletApp::view)
        .settings(Settings {
            antialiasing: true,
            ..Settings::default()
        })
        .run_with(move || (app, Task::none()))
}
