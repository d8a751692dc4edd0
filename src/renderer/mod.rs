//! wgpu renderer for the track-editing scene.
//!
//! The renderer owns every GPU resource for the lifetime of the process:
//! pipelines, geometry, the cubemaps, the 200-frame height-map cycle, the
//! ripple field and the shared matrix block are created once in
//! [`Renderer::new`]; only the viewport-sized targets are re-provisioned,
//! and only when the viewport size changes. One call to [`Renderer::render`]
//! runs the frame plan: ripple update, scene color, shadow overlay, post
//! composite.

use std::path::PathBuf;
use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use wgpu::util::DeviceExt;

mod passes;
mod picking;
mod pipelines;
mod resources;
mod shaders;
mod textures;
mod uniforms;

pub use passes::{frame_plan, planar_shadow_matrix, point_instances, shadow_instances, Pass};
pub use picking::{drag_horizontal, drag_vertical, first_hit, mouse_ray, pick_projection, PickContext, PICK_REGION};
pub use resources::{
    size_mismatch, PickInstance, PointInstance, RippleTargets, SceneTargets, ShadowInstance,
    RIPPLE_SIZE, SCENE_FORMAT,
};
pub use uniforms::{matrices_layout, MatrixBlock, PublishedMatrices, SharedMatrices};

use crate::camera::CameraMode;
use crate::error::Result;
use crate::mesh;
use crate::track::Track;

use pipelines::{create_pipelines, Pipelines};
use resources::{DropParams, PostParams, SceneLights, SkyParams, TileParams, WaterParams};

/// Length of the height-map texture cycle.
pub const HEIGHT_MAP_FRAMES: usize = 200;

/// Half extent of a control-point cube in world units.
pub const POINT_HALF_SIZE: f32 = 2.5;

/// Upper bound on drawable/pickable control points.
pub const MAX_CONTROL_POINTS: usize = 256;

/// World scale of the water surface and the tile cube.
const ENVIRONMENT_SCALE: f32 = 100.0;
/// World scale of the skybox cube.
const SKYBOX_SCALE: f32 = 600.0;

/// Time added to the animation clock each frame.
const TIME_STEP: f32 = 1.0 / 60.0;

/// Water displacement selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaveMode {
    /// Travelling sine wave
    Sine,
    /// Pre-baked height-map cycle plus the ripple field
    HeightMap,
}

/// Widget-panel knobs, snapshotted once per frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameParams {
    pub camera_mode: CameraMode,
    pub wave_mode: WaveMode,
    pub amplitude: f32,
    pub speed: f32,
    pub wave_length: f32,
    pub pixelate: bool,
}

/// Monotone time plus the cyclic height-map frame index, advanced exactly
/// once per rendered frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnimationClock {
    pub time: f32,
    pub frame: usize,
}

impl AnimationClock {
    pub fn advance(&mut self) {
        self.time += TIME_STEP;
        self.frame = (self.frame + 1) % HEIGHT_MAP_FRAMES;
    }
}

/// Where the next ripple drop lands. The origin doubles as the "no drop"
/// sentinel: taking the state always resets it, so an armed drop perturbs
/// the field exactly once.
#[derive(Clone, Copy, Debug, Default)]
pub struct RippleState {
    drop_point: Vec2,
}

impl RippleState {
    pub fn arm(&mut self, uv: Vec2) {
        self.drop_point = uv;
    }

    pub fn take(&mut self) -> Vec2 {
        std::mem::take(&mut self.drop_point)
    }

    pub fn pending(&self) -> Vec2 {
        self.drop_point
    }
}

/// Root of the asset tree, overridable for packaged installs.
pub fn asset_root() -> PathBuf {
    std::env::var_os("TRACKVIEW_ASSETS")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("assets"))
}

/// Main renderer state.
pub struct Renderer {
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,

    pipelines: Pipelines,
    shared: SharedMatrices,

    // static geometry
    skybox_vb: wgpu::Buffer,
    tile_vb: wgpu::Buffer,
    cube_vb: wgpu::Buffer,
    cube_vertex_count: u32,
    water_vb: wgpu::Buffer,
    water_vertex_count: u32,

    // textures
    ripple: RippleTargets,
    #[allow(dead_code)]
    water_color: wgpu::Texture,
    #[allow(dead_code)]
    sky_cube: wgpu::Texture,
    #[allow(dead_code)]
    tile_cube: wgpu::Texture,
    #[allow(dead_code)]
    height_frames: Vec<wgpu::Texture>,

    // per-draw uniform buffers
    skybox_params_buf: wgpu::Buffer,
    tile_params_buf: wgpu::Buffer,
    water_params_buf: wgpu::Buffer,
    lights_buf: wgpu::Buffer,
    drop_params_buf: wgpu::Buffer,
    post_params_buf: wgpu::Buffer,

    // instance streams
    point_instance_buf: wgpu::Buffer,
    shadow_instance_buf: wgpu::Buffer,

    // bind groups (one per height-map frame where the frame texture is bound)
    skybox_params_bg: wgpu::BindGroup,
    skybox_tex_bg: wgpu::BindGroup,
    tile_params_bg: wgpu::BindGroup,
    tile_tex_bgs: Vec<wgpu::BindGroup>,
    water_params_bg: wgpu::BindGroup,
    water_sine_tex_bg: wgpu::BindGroup,
    water_height_tex_bgs: Vec<wgpu::BindGroup>,
    ripple_bg: wgpu::BindGroup,
    post_bg: Option<wgpu::BindGroup>,
    clamp_sampler: wgpu::Sampler,

    // viewport-sized targets
    targets: Option<SceneTargets>,

    pick_ctx: PickContext,
    ripple_state: RippleState,
    clock: AnimationClock,
}

impl Renderer {
    /// Create the renderer and load every scene asset. Any missing or
    /// undecodable asset is a fatal error.
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        output_format: wgpu::TextureFormat,
    ) -> Result<Self> {
        let root = asset_root();
        let images = root.join("images");

        let water_mesh = mesh::load_water_mesh(&root.join("water.obj"))?;
        let water_vertex_count = water_mesh.len() as u32;

        let water_color = textures::load_texture_2d(&device, &queue, &images.join("water_top.jpg"), true)?;
        let ripple_field = textures::load_ripple_field(&device, &queue, &images.join("ripple.jpg"))?;
        let ripple = RippleTargets::with_field(&device, ripple_field);

        let sky_faces: [PathBuf; 6] = ["right", "left", "top", "bottom", "back", "front"]
            .map(|face| images.join("skybox").join(format!("{face}.jpg")));
        let sky_cube = textures::load_cubemap(&device, &queue, &sky_faces)?;

        // one tile image repeated on every face
        let tile_face = images.join("tile.jpg");
        let tile_faces: [PathBuf; 6] = std::array::from_fn(|_| tile_face.clone());
        let tile_cube = textures::load_cubemap(&device, &queue, &tile_faces)?;

        let height_frames = textures::load_height_sequence(&device, &queue, &images.join("waves"))?;
        let height_views: Vec<wgpu::TextureView> = height_frames
            .iter()
            .map(|t| t.create_view(&wgpu::TextureViewDescriptor::default()))
            .collect();

        log::info!(
            "scene resources ready: {} water vertices, {} height-map frames",
            water_vertex_count,
            height_frames.len()
        );

        let shared = SharedMatrices::new(&device);
        let pipelines = create_pipelines(&device, shared.layout(), output_format);

        let skybox_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("skybox_vertex_buffer"),
            contents: bytemuck::cast_slice(&resources::skybox_vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let tile_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tile_vertex_buffer"),
            contents: bytemuck::cast_slice(&resources::tile_vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let cube = resources::cube_vertices();
        let cube_vertex_count = cube.len() as u32;
        let cube_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("point_cube_vertex_buffer"),
            contents: bytemuck::cast_slice(&cube),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let water_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("water_vertex_buffer"),
            contents: bytemuck::cast_slice(&water_mesh),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let uniform = wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST;
        let skybox_params_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("skybox_params"),
            contents: bytemuck::bytes_of(&SkyParams { model: Mat4::IDENTITY.to_cols_array_2d() }),
            usage: uniform,
        });
        let tile_params_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tile_params"),
            contents: bytemuck::bytes_of(&TileParams {
                model: Mat4::IDENTITY.to_cols_array_2d(),
                camera_pos: [0.0; 3],
                amplitude: 0.0,
            }),
            usage: uniform,
        });
        let water_params_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("water_params"),
            contents: bytemuck::bytes_of(&WaterParams {
                model: Mat4::IDENTITY.to_cols_array_2d(),
                camera_pos: [0.0; 3],
                time: 0.0,
                amplitude: 0.0,
                speed: 0.0,
                wave_length: 1.0,
                shininess: 32.0,
            }),
            usage: uniform,
        });
        let lights_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("scene_lights"),
            contents: bytemuck::bytes_of(&SceneLights::sine()),
            usage: uniform,
        });
        let drop_params_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("drop_params"),
            contents: bytemuck::bytes_of(&DropParams {
                center: [0.0, 0.0],
                radius: 0.09,
                strength: 0.5,
            }),
            usage: uniform,
        });
        let post_params_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("post_params"),
            contents: bytemuck::bytes_of(&PostParams {
                width: 1.0,
                height: 1.0,
                pixelate: 0.0,
                _pad: 0.0,
            }),
            usage: uniform,
        });

        let instance = wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST;
        let point_instance_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("point_instances"),
            size: (MAX_CONTROL_POINTS * std::mem::size_of::<PointInstance>()) as u64,
            usage: instance,
            mapped_at_creation: false,
        });
        let shadow_instance_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("shadow_instances"),
            size: (MAX_CONTROL_POINTS * std::mem::size_of::<ShadowInstance>()) as u64,
            usage: instance,
            mapped_at_creation: false,
        });

        let repeat_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("repeat_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let clamp_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("clamp_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let water_color_view = water_color.create_view(&wgpu::TextureViewDescriptor::default());
        let sky_cube_view = textures::cube_view(&sky_cube);
        let tile_cube_view = textures::cube_view(&tile_cube);

        let skybox_params_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("skybox_params_bg"),
            layout: &pipelines.params_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: skybox_params_buf.as_entire_binding(),
            }],
        });
        let skybox_tex_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("skybox_tex_bg"),
            layout: &pipelines.skybox_tex_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&sky_cube_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&clamp_sampler),
                },
            ],
        });
        let tile_params_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tile_params_bg"),
            layout: &pipelines.params_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: tile_params_buf.as_entire_binding(),
            }],
        });
        let tile_tex_bgs = height_views
            .iter()
            .map(|height_view| {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("tile_tex_bg"),
                    layout: &pipelines.tile_tex_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(&tile_cube_view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(&sky_cube_view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::TextureView(height_view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 3,
                            resource: wgpu::BindingResource::Sampler(&clamp_sampler),
                        },
                    ],
                })
            })
            .collect();
        let water_params_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("water_params_bg"),
            layout: &pipelines.water_params_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: water_params_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lights_buf.as_entire_binding(),
                },
            ],
        });
        let water_sine_tex_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("water_sine_tex_bg"),
            layout: &pipelines.water_sine_tex_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&water_color_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&repeat_sampler),
                },
            ],
        });
        let water_height_tex_bgs = height_views
            .iter()
            .map(|height_view| {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("water_height_tex_bg"),
                    layout: &pipelines.water_height_tex_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(&water_color_view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(height_view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::TextureView(&ripple.tex_view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 3,
                            resource: wgpu::BindingResource::TextureView(&tile_cube_view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 4,
                            resource: wgpu::BindingResource::TextureView(&sky_cube_view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 5,
                            resource: wgpu::BindingResource::Sampler(&repeat_sampler),
                        },
                    ],
                })
            })
            .collect();
        let ripple_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ripple_bg"),
            layout: &pipelines.ripple_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&ripple.tex_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&clamp_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: drop_params_buf.as_entire_binding(),
                },
            ],
        });

        let pick_ctx = PickContext::new(&device);

        Ok(Self {
            device,
            queue,
            pipelines,
            shared,
            skybox_vb,
            tile_vb,
            cube_vb,
            cube_vertex_count,
            water_vb,
            water_vertex_count,
            ripple,
            water_color,
            sky_cube,
            tile_cube,
            height_frames,
            skybox_params_buf,
            tile_params_buf,
            water_params_buf,
            lights_buf,
            drop_params_buf,
            post_params_buf,
            point_instance_buf,
            shadow_instance_buf,
            skybox_params_bg,
            skybox_tex_bg,
            tile_params_bg,
            tile_tex_bgs,
            water_params_bg,
            water_sine_tex_bg,
            water_height_tex_bgs,
            ripple_bg,
            post_bg: None,
            clamp_sampler,
            targets: None,
            pick_ctx,
            ripple_state: RippleState::default(),
            clock: AnimationClock::default(),
        })
    }

    /// Re-provision the viewport-sized targets when the size changed.
    /// After this returns, every target matches the viewport exactly.
    pub fn ensure_targets(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if !size_mismatch(self.targets.as_ref().map(|t| t.size), (width, height)) {
            return;
        }
        let targets = SceneTargets::create(&self.device, width, height);
        self.post_bg = Some(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("post_bg"),
            layout: &self.pipelines.post_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&targets.color_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.clamp_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.post_params_buf.as_entire_binding(),
                },
            ],
        }));
        self.targets = Some(targets);
    }

    /// Arm a ripple drop at the center of the water surface.
    pub fn add_drop(&mut self) {
        self.ripple_state.arm(Vec2::new(0.5, 0.5));
    }

    pub fn clock(&self) -> AnimationClock {
        self.clock
    }

    pub fn ripple_state(&self) -> RippleState {
        self.ripple_state
    }

    /// Render one frame into `dst_view` (the egui-registered viewport
    /// texture of `width` x `height` pixels).
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        dst_view: &wgpu::TextureView,
        width: u32,
        height: u32,
        projection: Mat4,
        view: Mat4,
        track: &Track,
        selection: Option<usize>,
        params: &FrameParams,
    ) {
        let _span = tracing::info_span!("render_frame").entered();

        self.ensure_targets(width, height);
        if self.targets.is_none() {
            return;
        }
        self.clock.advance();
        let frame = self.clock.frame;

        // viewer position is the translation column of the inverse view
        let viewer_pos = view.inverse().w_axis.truncate();
        self.write_frame_uniforms(viewer_pos, width, height, params);

        let mut points = point_instances(track, selection, params.camera_mode);
        let mut shadows = shadow_instances(track, params.camera_mode);
        if points.len() > MAX_CONTROL_POINTS {
            log::warn!(
                "track has {} points; drawing only the first {}",
                points.len(),
                MAX_CONTROL_POINTS
            );
            points.truncate(MAX_CONTROL_POINTS);
            shadows.truncate(MAX_CONTROL_POINTS);
        }
        if !points.is_empty() {
            self.queue
                .write_buffer(&self.point_instance_buf, 0, bytemuck::cast_slice(&points));
        }
        if !shadows.is_empty() {
            self.queue
                .write_buffer(&self.shadow_instance_buf, 0, bytemuck::cast_slice(&shadows));
        }

        let drop = self.ripple_state.take();

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        // the shared block is published once, lazily, right before the
        // first pass that consumes it; the ripple pass never observes it
        let mut published: Option<PublishedMatrices<'_>> = None;
        for pass in frame_plan(params.camera_mode) {
            match pass {
                Pass::Ripple => self.ripple_pass(&mut encoder, drop),
                Pass::Scene => {
                    let p = published
                        .get_or_insert_with(|| self.shared.publish(&self.queue, projection, view));
                    self.scene_pass(&mut encoder, p, params.wave_mode, frame, points.len() as u32);
                }
                Pass::Shadow => {
                    if let Some(p) = &published {
                        self.shadow_pass(&mut encoder, p, shadows.len() as u32);
                    }
                }
                Pass::Post => self.post_pass(&mut encoder, dst_view),
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn write_frame_uniforms(&self, viewer_pos: Vec3, width: u32, height: u32, params: &FrameParams) {
        let skybox_model =
            Mat4::from_translation(viewer_pos) * Mat4::from_scale(Vec3::splat(SKYBOX_SCALE));
        self.queue.write_buffer(
            &self.skybox_params_buf,
            0,
            bytemuck::bytes_of(&SkyParams {
                model: skybox_model.to_cols_array_2d(),
            }),
        );

        let env_model = Mat4::from_scale(Vec3::splat(ENVIRONMENT_SCALE));
        self.queue.write_buffer(
            &self.tile_params_buf,
            0,
            bytemuck::bytes_of(&TileParams {
                model: env_model.to_cols_array_2d(),
                camera_pos: viewer_pos.to_array(),
                amplitude: params.amplitude,
            }),
        );

        let (shininess, lights) = match params.wave_mode {
            WaveMode::Sine => (32.0, SceneLights::sine()),
            WaveMode::HeightMap => (100.0, SceneLights::height_map()),
        };
        self.queue.write_buffer(
            &self.water_params_buf,
            0,
            bytemuck::bytes_of(&WaterParams {
                model: env_model.to_cols_array_2d(),
                camera_pos: viewer_pos.to_array(),
                time: self.clock.time,
                amplitude: params.amplitude,
                speed: params.speed,
                wave_length: params.wave_length,
                shininess,
            }),
        );
        self.queue
            .write_buffer(&self.lights_buf, 0, bytemuck::bytes_of(&lights));

        self.queue.write_buffer(
            &self.post_params_buf,
            0,
            bytemuck::bytes_of(&PostParams {
                width: width as f32,
                height: height as f32,
                pixelate: if params.pixelate { 1.0 } else { 0.0 },
                _pad: 0.0,
            }),
        );
    }

    /// Map a cursor position to the control point under it, if any.
    /// Synchronous: blocks on the GPU readback.
    pub fn pick(
        &self,
        cursor: (f32, f32),
        viewport: (f32, f32),
        projection: Mat4,
        view: Mat4,
        track: &Track,
    ) -> Option<usize> {
        self.pick_ctx.pick(
            &self.device,
            &self.queue,
            &self.pipelines.pick,
            &self.cube_vb,
            self.cube_vertex_count,
            track,
            projection,
            view,
            cursor,
            viewport,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_advances_one_frame_per_tick() {
        let mut clock = AnimationClock::default();
        for expected in 1..=5 {
            clock.advance();
            assert_eq!(clock.frame, expected);
        }
    }

    #[test]
    fn test_clock_wraps_at_sequence_length() {
        let mut clock = AnimationClock::default();
        let mut seen = Vec::new();
        for _ in 0..HEIGHT_MAP_FRAMES {
            clock.advance();
            seen.push(clock.frame);
        }
        // cycles through every frame exactly once, then back to 0
        assert_eq!(seen.len(), HEIGHT_MAP_FRAMES);
        assert_eq!(clock.frame, 0);
        let mut sorted = seen.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), HEIGHT_MAP_FRAMES);
    }

    #[test]
    fn test_clock_time_is_monotone() {
        let mut clock = AnimationClock::default();
        let mut last = clock.time;
        for _ in 0..500 {
            clock.advance();
            assert!(clock.time > last);
            last = clock.time;
        }
    }

    #[test]
    fn test_ripple_drop_fires_exactly_once() {
        let mut state = RippleState::default();
        state.arm(Vec2::new(0.5, 0.5));
        assert_eq!(state.take(), Vec2::new(0.5, 0.5));
        // back at the origin sentinel until re-armed
        assert_eq!(state.take(), Vec2::ZERO);
        assert_eq!(state.pending(), Vec2::ZERO);
    }
}
