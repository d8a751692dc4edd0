//! 3D viewport widget embedded in the egui window.
//!
//! Owns the cameras and the renderer, registers the render texture with
//! egui, and turns pointer input into picking, dragging and orbiting.

use egui::{Response, Sense, Ui, Vec2};
use glam::Mat4;

use crate::camera::{self, CameraMode, OrbitCamera};
use crate::error::Result;
use crate::renderer::{self, FrameParams, Renderer};
use crate::track::{Track, TrainCamera};

/// 3D viewport state.
pub struct Viewport {
    pub orbit: OrbitCamera,
    pub train: TrainCamera,
    pub renderer: Option<Renderer>,
    texture_id: Option<egui::TextureId>,
    render_texture: Option<RenderTexture>,
}

struct RenderTexture {
    #[allow(dead_code)]
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: (u32, u32),
}

impl Viewport {
    pub fn new() -> Self {
        Self {
            orbit: OrbitCamera::default(),
            train: TrainCamera::default(),
            renderer: None,
            texture_id: None,
            render_texture: None,
        }
    }

    /// Create the renderer once the wgpu context exists. Asset failures
    /// propagate to the caller, which treats them as fatal.
    pub fn init_renderer(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
    ) -> Result<()> {
        self.renderer = Some(Renderer::new(
            std::sync::Arc::new(device.clone()),
            std::sync::Arc::new(queue.clone()),
            format,
        )?);
        Ok(())
    }

    /// Show the viewport, handle input and render the frame.
    pub fn show(
        &mut self,
        ui: &mut Ui,
        wgpu_render_state: Option<&egui_wgpu::RenderState>,
        track: &mut Track,
        selection: &mut Option<usize>,
        params: FrameParams,
    ) -> Response {
        let _span = tracing::info_span!("viewport_show").entered();
        let available = ui.available_size();
        let size = Vec2::new(available.x.max(64.0), available.y.max(64.0));
        let (rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());

        let Some(render_state) = wgpu_render_state else {
            ui.painter()
                .rect_filled(rect, 0.0, egui::Color32::from_rgb(30, 30, 35));
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "Initializing...",
                egui::FontId::default(),
                egui::Color32::GRAY,
            );
            return response;
        };

        let width = size.x as u32;
        let height = size.y as u32;
        if width == 0 || height == 0 || self.renderer.is_none() {
            return response;
        }

        let dt = ui.input(|i| i.stable_dt);
        self.orbit.update(dt);
        if params.camera_mode == CameraMode::Train {
            // ride faster when the waves do
            self.train.advance(dt, 0.25 + params.speed * 0.25);
        }

        let aspect = size.x / size.y;
        let (projection, view) =
            camera::matrices(params.camera_mode, aspect, &self.orbit, &self.train, track);

        self.handle_input(
            ui,
            &response,
            rect,
            (width, height),
            projection,
            view,
            track,
            selection,
            params.camera_mode,
        );

        self.ensure_render_texture(render_state, width, height);

        if let (Some(renderer), Some(rt)) = (&mut self.renderer, &self.render_texture) {
            renderer.render(&rt.view, width, height, projection, view, track, *selection, &params);
        }

        if let Some(tex_id) = self.texture_id {
            ui.painter().image(
                tex_id,
                rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }

        response
    }

    #[allow(clippy::too_many_arguments)]
    fn handle_input(
        &mut self,
        ui: &Ui,
        response: &Response,
        rect: egui::Rect,
        texture_size: (u32, u32),
        projection: Mat4,
        view: Mat4,
        track: &mut Track,
        selection: &mut Option<usize>,
        mode: CameraMode,
    ) {
        let viewport = (texture_size.0 as f32, texture_size.1 as f32);
        let to_pixels = |pos: egui::Pos2| -> (f32, f32) {
            (
                (pos.x - rect.left()) / rect.width() * viewport.0,
                (pos.y - rect.top()) / rect.height() * viewport.1,
            )
        };

        // left press: pick the control point under the cursor
        if response.drag_started_by(egui::PointerButton::Primary) || response.clicked() {
            if let (Some(pos), Some(renderer)) = (response.interact_pointer_pos(), &self.renderer) {
                *selection = renderer.pick(to_pixels(pos), viewport, projection, view, track);
                match *selection {
                    Some(i) => log::debug!("selected control point {i}"),
                    None => log::debug!("selection cleared"),
                }
            }
        }

        // left drag: move the selected point; Ctrl switches to vertical
        if response.dragged_by(egui::PointerButton::Primary) {
            if let (Some(i), Some(pos)) = (*selection, response.interact_pointer_pos()) {
                if let Some(point) = track.points.get_mut(i) {
                    let (origin, dir) = renderer::mouse_ray(to_pixels(pos), viewport, projection, view);
                    if ui.input(|inp| inp.modifiers.ctrl) {
                        point.pos = renderer::drag_vertical(origin, dir, point.pos);
                    } else if let Some(moved) = renderer::drag_horizontal(origin, dir, point.pos) {
                        point.pos = moved;
                    }
                }
                // a point drag never doubles as camera input
                return;
            }
        }

        // orbit input only applies in world view
        if mode == CameraMode::World {
            if response.dragged_by(egui::PointerButton::Secondary) {
                let delta = response.drag_delta();
                self.orbit.orbit(delta.x, delta.y);
            }
            if response.hovered() {
                let scroll = ui.input(|i| i.raw_scroll_delta.y);
                if scroll.abs() > 0.0 {
                    self.orbit.zoom(scroll * 0.1);
                }
            }
        }
    }

    fn ensure_render_texture(&mut self, render_state: &egui_wgpu::RenderState, width: u32, height: u32) {
        let needs_recreate = match &self.render_texture {
            Some(rt) => rt.size != (width, height),
            None => true,
        };
        if !needs_recreate {
            return;
        }

        let device = &render_state.device;
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("viewport_render_texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: render_state.target_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let tex_id = render_state
            .renderer
            .write()
            .register_native_texture(device, &view, wgpu::FilterMode::Linear);
        if let Some(old_id) = self.texture_id.take() {
            render_state.renderer.write().free_texture(&old_id);
        }

        self.texture_id = Some(tex_id);
        self.render_texture = Some(RenderTexture {
            texture,
            view,
            size: (width, height),
        });
    }

    /// Current render texture size in pixels.
    pub fn texture_size(&self) -> Option<(u32, u32)> {
        self.render_texture.as_ref().map(|rt| rt.size)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}
