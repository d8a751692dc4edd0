//! Main application state and UI.

use egui::{CentralPanel, RichText, SidePanel, TopBottomPanel};

use crate::camera::CameraMode;
use crate::renderer::{FrameParams, WaveMode};
use crate::settings::Settings;
use crate::track::{Track, MIN_POINTS};
use crate::viewport::Viewport;

/// The viewer application: widget panel on the right, 3D viewport in the
/// center, status bar at the bottom.
pub struct TrackViewApp {
    viewport: Viewport,
    track: Track,
    settings: Settings,
    selection: Option<usize>,
    status: String,
    _trace_guard: Option<tracing_chrome::FlushGuard>,
}

impl TrackViewApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        trace_guard: Option<tracing_chrome::FlushGuard>,
    ) -> Self {
        let settings = Settings::load();
        let mut viewport = Viewport::new();
        viewport.orbit.set_distance(settings.camera_distance);
        viewport.orbit.set_angles(settings.camera_yaw, settings.camera_pitch);
        Self {
            viewport,
            track: Track::new(),
            settings,
            selection: None,
            status: "Ready".into(),
            _trace_guard: trace_guard,
        }
    }

    fn side_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Scene");
        ui.separator();

        ui.label(RichText::new("Camera").strong());
        ui.radio_value(&mut self.settings.camera_mode, CameraMode::World, "World");
        ui.radio_value(&mut self.settings.camera_mode, CameraMode::Top, "Top");
        ui.radio_value(&mut self.settings.camera_mode, CameraMode::Train, "Train");
        if ui.button("Reset camera").clicked() {
            self.viewport.orbit.reset();
        }

        ui.separator();
        ui.label(RichText::new("Water").strong());
        ui.radio_value(&mut self.settings.wave_mode, WaveMode::Sine, "Sine wave");
        ui.radio_value(&mut self.settings.wave_mode, WaveMode::HeightMap, "Height map");
        ui.add(egui::Slider::new(&mut self.settings.amplitude, 0.0..=10.0).text("Amplitude"));
        ui.add(egui::Slider::new(&mut self.settings.speed, 0.0..=5.0).text("Speed"));
        ui.add(egui::Slider::new(&mut self.settings.wave_length, 1.0..=50.0).text("Wavelength"));
        if ui.button("Drop ripple").clicked() {
            if let Some(renderer) = &mut self.viewport.renderer {
                renderer.add_drop();
                self.status = "Ripple armed".into();
            }
        }

        ui.separator();
        ui.label(RichText::new("Display").strong());
        ui.checkbox(&mut self.settings.pixelate, "Pixelate");

        ui.separator();
        ui.label(RichText::new("Track").strong());
        match self.selection.and_then(|i| self.track.points.get(i).map(|p| (i, *p))) {
            Some((i, p)) => {
                ui.label(format!("Point {} of {}", i, self.track.len()));
                ui.label(format!("({:.1}, {:.1}, {:.1})", p.pos.x, p.pos.y, p.pos.z));
            }
            None => {
                ui.label(format!("{} points, none selected", self.track.len()));
            }
        }
        ui.horizontal(|ui| {
            if ui.button("Add point").clicked() {
                let after = self.selection.unwrap_or(self.track.len() - 1);
                if let Some(idx) = self.track.add_point_after(after) {
                    self.selection = Some(idx);
                    self.status = format!("Added point {idx}");
                }
            }
            if ui.button("Delete point").clicked() {
                if let Some(i) = self.selection {
                    if self.track.delete_point(i) {
                        self.selection = None;
                        self.status = format!("Deleted point {i}");
                    } else {
                        self.status = format!("Track keeps at least {MIN_POINTS} points");
                    }
                }
            }
        });
    }

    fn status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(&self.status);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("FPS: {:.0}", ui.ctx().input(|i| 1.0 / i.stable_dt)));
                if let Some(i) = self.selection {
                    ui.label(format!("selected: {i}"));
                }
            });
        });
    }

    /// Debug dump of the current selection, bound to the `P` key.
    fn log_selection(&self) {
        match self.selection.and_then(|i| self.track.points.get(i).map(|p| (i, *p))) {
            Some((i, p)) => {
                log::info!(
                    "selected({}) ({} {} {}) ({} {} {})",
                    i,
                    p.pos.x,
                    p.pos.y,
                    p.pos.z,
                    p.orient.x,
                    p.orient.y,
                    p.orient.z
                );
            }
            None => log::info!("nothing selected"),
        }
    }
}

impl eframe::App for TrackViewApp {
    fn on_exit(&mut self) {
        self.settings.camera_distance = self.viewport.orbit.distance();
        let (yaw, pitch) = self.viewport.orbit.angles();
        self.settings.camera_yaw = yaw;
        self.settings.camera_pitch = pitch;
        self.settings.save();
    }

    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        // Initialize renderer once the wgpu context is available. A missing
        // asset leaves nothing sensible to render: report and exit.
        if self.viewport.renderer.is_none() {
            if let Some(render_state) = frame.wgpu_render_state() {
                if let Err(e) = self.viewport.init_renderer(
                    &render_state.device,
                    &render_state.queue,
                    render_state.target_format,
                ) {
                    log::error!("{e}");
                    eprintln!("trackview: {e}");
                    std::process::exit(1);
                }
                self.status = "Scene loaded".into();
            }
        }

        if ctx.input(|i| i.key_pressed(egui::Key::P)) {
            self.log_selection();
        }

        TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.status_bar(ui);
        });

        SidePanel::right("side_panel")
            .default_width(220.0)
            .show(ctx, |ui| {
                self.side_panel(ui);
            });

        // the knobs are read exactly once per frame; the renderer sees one
        // consistent snapshot
        let params = FrameParams {
            camera_mode: self.settings.camera_mode,
            wave_mode: self.settings.wave_mode,
            amplitude: self.settings.amplitude,
            speed: self.settings.speed,
            wave_length: self.settings.wave_length,
            pixelate: self.settings.pixelate,
        };

        CentralPanel::default().show(ctx, |ui| {
            let render_state = frame.wgpu_render_state();
            self.viewport
                .show(ui, render_state, &mut self.track, &mut self.selection, params);
        });

        // track window size for saving on exit
        ctx.input(|i| {
            if let Some(rect) = i.viewport().inner_rect {
                self.settings.window_width = rect.width();
                self.settings.window_height = rect.height();
            }
        });

        // continuous repaint: the water animates every frame
        ctx.request_repaint();
    }
}
