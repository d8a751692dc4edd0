//! Frame pass sequencing and the per-pass encoders.
//!
//! A frame is an explicit ordered plan, not a convention: [`frame_plan`]
//! yields the pass list for the active camera mode and the renderer walks
//! it in order. The scene and shadow passes require the published-matrices
//! token, so they cannot run before the shared block is uploaded.

use glam::{Mat4, Vec2, Vec3};

use crate::camera::CameraMode;
use crate::track::Track;

use super::resources::{DropParams, PointInstance, ShadowInstance, RIPPLE_SIZE};
use super::uniforms::PublishedMatrices;
use super::{Renderer, WaveMode, POINT_HALF_SIZE};

/// One stage of the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pass {
    /// Perturb the persistent ripple field and copy it back
    Ripple,
    /// Scene color into the offscreen target
    Scene,
    /// Control-point shadows over the scene color
    Shadow,
    /// Composite the offscreen color to the viewport
    Post,
}

/// Ordered pass list for one frame. The shadow pass is absent in the
/// top-down view.
pub fn frame_plan(mode: CameraMode) -> &'static [Pass] {
    match mode {
        CameraMode::Top => &[Pass::Ripple, Pass::Scene, Pass::Post],
        CameraMode::World | CameraMode::Train => {
            &[Pass::Ripple, Pass::Scene, Pass::Shadow, Pass::Post]
        }
    }
}

const SELECTED_COLOR: [f32; 4] = [240.0 / 255.0, 240.0 / 255.0, 30.0 / 255.0, 1.0];
const POINT_COLOR: [f32; 4] = [240.0 / 255.0, 60.0 / 255.0, 60.0 / 255.0, 1.0];

/// Direction of the light that casts the planar point shadows.
const SHADOW_LIGHT_DIR: Vec3 = Vec3::new(0.0, -1.0, -1.0);
/// Shadows land just above the resting water surface.
const SHADOW_PLANE_Y: f32 = 0.2;

/// Instance data for the control-point cubes. Points are hidden while
/// riding the train, and the selected point is highlighted.
pub fn point_instances(track: &Track, selection: Option<usize>, mode: CameraMode) -> Vec<PointInstance> {
    if mode == CameraMode::Train {
        return Vec::new();
    }
    track
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| PointInstance {
            model: p.model_matrix(POINT_HALF_SIZE).to_cols_array_2d(),
            color: if selection == Some(i) { SELECTED_COLOR } else { POINT_COLOR },
        })
        .collect()
}

/// Instance data for the shadow pass: the same cubes flattened onto the
/// water plane. Carries no color by construction.
pub fn shadow_instances(track: &Track, mode: CameraMode) -> Vec<ShadowInstance> {
    if mode == CameraMode::Train {
        return Vec::new();
    }
    let flatten = planar_shadow_matrix(SHADOW_LIGHT_DIR, SHADOW_PLANE_Y);
    track
        .points
        .iter()
        .map(|p| ShadowInstance {
            model: (flatten * p.model_matrix(POINT_HALF_SIZE)).to_cols_array_2d(),
        })
        .collect()
}

/// Projection of the scene onto the horizontal plane `y = plane_y` along a
/// directional light.
pub fn planar_shadow_matrix(light_dir: Vec3, plane_y: f32) -> Mat4 {
    // p' = p - ((p.y - plane_y) / d.y) * d, which is affine in p
    let d = light_dir;
    let sx = d.x / d.y;
    let sz = d.z / d.y;
    Mat4::from_cols(
        glam::Vec4::new(1.0, 0.0, 0.0, 0.0),
        glam::Vec4::new(-sx, 0.0, -sz, 0.0),
        glam::Vec4::new(0.0, 0.0, 1.0, 0.0),
        glam::Vec4::new(plane_y * sx, plane_y, plane_y * sz, 1.0),
    )
}

impl Renderer {
    /// Ripple update: one fullscreen perturbation of the persistent field,
    /// then a copy back so the next frame (and the water shader) sees it.
    /// Runs before the matrix publish and does not read the shared block.
    pub(super) fn ripple_pass(&self, encoder: &mut wgpu::CommandEncoder, drop: Vec2) {
        self.queue.write_buffer(
            &self.drop_params_buf,
            0,
            bytemuck::bytes_of(&DropParams {
                center: drop.to_array(),
                radius: 0.09,
                strength: 0.5,
            }),
        );
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("ripple_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.ripple.target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.pipelines.ripple_drop);
            pass.set_bind_group(0, &self.ripple_bg, &[]);
            pass.draw(0..3, 0..1);
        }
        // read-after-write: fold the rendered result back into the field
        encoder.copy_texture_to_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.ripple.target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyTextureInfo {
                texture: &self.ripple.tex,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::Extent3d {
                width: RIPPLE_SIZE,
                height: RIPPLE_SIZE,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Scene color: control points, skybox, tile cube, water surface.
    pub(super) fn scene_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        published: &PublishedMatrices<'_>,
        wave_mode: WaveMode,
        frame: usize,
        point_count: u32,
    ) {
        let Some(targets) = &self.targets else { return };
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &targets.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: 0.0,
                        g: 0.0,
                        b: 0.3,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &targets.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_bind_group(0, published.bind_group(), &[]);

        if point_count > 0 {
            pass.set_pipeline(&self.pipelines.points);
            pass.set_vertex_buffer(0, self.cube_vb.slice(..));
            pass.set_vertex_buffer(1, self.point_instance_buf.slice(..));
            pass.draw(0..self.cube_vertex_count, 0..point_count);
        }

        pass.set_pipeline(&self.pipelines.skybox);
        pass.set_bind_group(1, &self.skybox_params_bg, &[]);
        pass.set_bind_group(2, &self.skybox_tex_bg, &[]);
        pass.set_vertex_buffer(0, self.skybox_vb.slice(..));
        pass.draw(0..36, 0..1);

        pass.set_pipeline(&self.pipelines.tile);
        pass.set_bind_group(1, &self.tile_params_bg, &[]);
        pass.set_bind_group(2, &self.tile_tex_bgs[frame], &[]);
        pass.set_vertex_buffer(0, self.tile_vb.slice(..));
        pass.draw(0..30, 0..1);

        match wave_mode {
            WaveMode::Sine => {
                pass.set_pipeline(&self.pipelines.water_sine);
                pass.set_bind_group(2, &self.water_sine_tex_bg, &[]);
            }
            WaveMode::HeightMap => {
                pass.set_pipeline(&self.pipelines.water_height);
                pass.set_bind_group(2, &self.water_height_tex_bgs[frame], &[]);
            }
        }
        pass.set_bind_group(1, &self.water_params_bg, &[]);
        pass.set_vertex_buffer(0, self.water_vb.slice(..));
        pass.draw(0..self.water_vertex_count, 0..1);
    }

    /// Shadow overlay: the same control-point geometry flattened onto the
    /// water plane, drawn colorless over the scene color.
    pub(super) fn shadow_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        published: &PublishedMatrices<'_>,
        shadow_count: u32,
    ) {
        if shadow_count == 0 {
            return;
        }
        let Some(targets) = &self.targets else { return };
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("shadow_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &targets.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &targets.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.pipelines.point_shadow);
        pass.set_bind_group(0, published.bind_group(), &[]);
        pass.set_vertex_buffer(0, self.cube_vb.slice(..));
        pass.set_vertex_buffer(1, self.shadow_instance_buf.slice(..));
        pass.draw(0..self.cube_vertex_count, 0..shadow_count);
    }

    /// Composite the offscreen scene color into the viewport texture.
    pub(super) fn post_pass(&self, encoder: &mut wgpu::CommandEncoder, dst_view: &wgpu::TextureView) {
        let Some(post_bg) = &self.post_bg else { return };
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("post_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: dst_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.pipelines.post);
        pass.set_bind_group(0, post_bg, &[]);
        pass.draw(0..3, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_starts_with_ripple_and_ends_with_post() {
        for mode in [CameraMode::World, CameraMode::Top, CameraMode::Train] {
            let plan = frame_plan(mode);
            assert_eq!(plan.first(), Some(&Pass::Ripple));
            assert_eq!(plan.last(), Some(&Pass::Post));
        }
    }

    #[test]
    fn test_top_view_skips_shadow_pass() {
        assert!(!frame_plan(CameraMode::Top).contains(&Pass::Shadow));
        assert!(frame_plan(CameraMode::World).contains(&Pass::Shadow));
        assert!(frame_plan(CameraMode::Train).contains(&Pass::Shadow));
    }

    #[test]
    fn test_scene_precedes_shadow() {
        let plan = frame_plan(CameraMode::World);
        let scene = plan.iter().position(|p| *p == Pass::Scene).unwrap();
        let shadow = plan.iter().position(|p| *p == Pass::Shadow).unwrap();
        assert!(scene < shadow);
    }

    #[test]
    fn test_selected_point_is_highlighted() {
        let track = Track::new();
        let instances = point_instances(&track, Some(2), CameraMode::World);
        assert_eq!(instances.len(), track.len());
        assert_eq!(instances[2].color, SELECTED_COLOR);
        assert_eq!(instances[0].color, POINT_COLOR);
    }

    #[test]
    fn test_points_hidden_while_riding() {
        let track = Track::new();
        assert!(point_instances(&track, None, CameraMode::Train).is_empty());
        assert!(shadow_instances(&track, CameraMode::Train).is_empty());
    }

    #[test]
    fn test_shadow_count_matches_point_count() {
        let track = Track::new();
        let shadows = shadow_instances(&track, CameraMode::World);
        assert_eq!(shadows.len(), track.len());
    }

    #[test]
    fn test_planar_shadow_lands_on_plane() {
        let m = planar_shadow_matrix(Vec3::new(0.0, -1.0, -1.0), 0.0);
        let p = m.transform_point3(Vec3::new(10.0, 5.0, 0.0));
        assert!((p.y - 0.0).abs() < 1e-5);
        assert!((p.x - 10.0).abs() < 1e-5);
        assert!((p.z - -5.0).abs() < 1e-5);

        // points already on the plane do not move
        let m = planar_shadow_matrix(Vec3::new(0.0, -1.0, -1.0), 2.0);
        let p = m.transform_point3(Vec3::new(3.0, 2.0, 7.0));
        assert!((p - Vec3::new(3.0, 2.0, 7.0)).length() < 1e-5);
    }
}
