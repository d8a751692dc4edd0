//! GPU object picking and the drag math that goes with it.
//!
//! Picking re-renders every control point into a tiny ID target: a
//! projection matrix maps the few pixels around the cursor onto the whole
//! clip volume, each point writes its 1-based index, and the target is read
//! back synchronously. The first non-zero texel in scan order wins — draw
//! order, not depth, breaks ties, which matches the historical behavior of
//! this editor. The module is the only place that knows how selection is
//! implemented; callers just see `pick() -> Option<usize>`.

use glam::{Mat4, Vec2, Vec3};
use wgpu::util::DeviceExt;

use crate::track::Track;

use super::resources::{PickInstance, DEPTH_FORMAT};
use super::uniforms::{matrices_layout, MatrixBlock};
use super::{MAX_CONTROL_POINTS, POINT_HALF_SIZE};

/// Side length, in pixels, of the selection window around the cursor.
pub const PICK_REGION: u32 = 5;

const BYTES_PER_ROW: u32 = 256; // PICK_REGION * 4 rounded up to the copy alignment

/// Build the selection projection: the `region x region` pixel window
/// centered at `cursor` (top-left origin) fills the entire clip volume.
/// This is the classic pick-matrix construction layered in front of the
/// scene projection.
pub fn pick_projection(projection: Mat4, cursor: (f32, f32), viewport: (f32, f32)) -> Mat4 {
    let (w, h) = viewport;
    let (cx, cy_top) = cursor;
    // flip to the bottom-up convention the construction assumes
    let cy = h - cy_top;
    let del = PICK_REGION as f32;
    let translate = Mat4::from_translation(Vec3::new((w - 2.0 * cx) / del, (h - 2.0 * cy) / del, 0.0));
    let scale = Mat4::from_scale(Vec3::new(w / del, h / del, 1.0));
    translate * scale * projection
}

/// Scan the readback rows for the first non-zero ID and return the 0-based
/// point index it encodes. Rows are padded to the copy alignment.
pub fn first_hit(data: &[u8], width: u32, height: u32, bytes_per_row: u32) -> Option<u32> {
    for row in 0..height {
        for col in 0..width {
            let offset = (row * bytes_per_row + col * 4) as usize;
            let texel = data.get(offset..offset + 4)?;
            let id = u32::from_le_bytes([texel[0], texel[1], texel[2], texel[3]]);
            if id != 0 {
                return Some(id - 1);
            }
        }
    }
    None
}

/// Persistent GPU state for the selection pass. Created once; the tiny
/// targets never resize.
pub struct PickContext {
    id_texture: wgpu::Texture,
    id_view: wgpu::TextureView,
    #[allow(dead_code)]
    depth: wgpu::Texture,
    depth_view: wgpu::TextureView,
    readback: wgpu::Buffer,
    matrices_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
}

impl PickContext {
    pub fn new(device: &wgpu::Device) -> Self {
        let extent = wgpu::Extent3d {
            width: PICK_REGION,
            height: PICK_REGION,
            depth_or_array_layers: 1,
        };
        let id_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("pick_id_texture"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R32Uint,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("pick_depth_texture"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pick_readback_buffer"),
            size: (BYTES_PER_ROW * PICK_REGION) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        // the selection pass uses its own matrix block so a pick never
        // disturbs the frame's published snapshot
        let layout = matrices_layout(device);
        let matrices_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("pick_matrices_buffer"),
            contents: bytemuck::bytes_of(&MatrixBlock::new(Mat4::IDENTITY, Mat4::IDENTITY)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("pick_matrices_bind_group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: matrices_buffer.as_entire_binding(),
            }],
        });
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pick_instance_buffer"),
            size: (MAX_CONTROL_POINTS * std::mem::size_of::<PickInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let id_view = id_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            id_texture,
            id_view,
            depth,
            depth_view,
            readback,
            matrices_buffer,
            bind_group,
            instance_buffer,
        }
    }

    /// Render the selection pass and block until the result is read back.
    #[allow(clippy::too_many_arguments)]
    pub fn pick(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipeline: &wgpu::RenderPipeline,
        cube_vertices: &wgpu::Buffer,
        cube_vertex_count: u32,
        track: &Track,
        projection: Mat4,
        view: Mat4,
        cursor: (f32, f32),
        viewport: (f32, f32),
    ) -> Option<usize> {
        if track.is_empty() || viewport.0 < 1.0 || viewport.1 < 1.0 {
            return None;
        }
        let _span = tracing::info_span!("pick").entered();

        let proj = pick_projection(projection, cursor, viewport);
        queue.write_buffer(
            &self.matrices_buffer,
            0,
            bytemuck::bytes_of(&MatrixBlock::new(proj, view)),
        );

        if track.len() > MAX_CONTROL_POINTS {
            log::warn!(
                "track has {} points; only the first {} are pickable",
                track.len(),
                MAX_CONTROL_POINTS
            );
        }
        let instances: Vec<PickInstance> = track
            .points
            .iter()
            .take(MAX_CONTROL_POINTS)
            .enumerate()
            .map(|(i, p)| PickInstance {
                model: p.model_matrix(POINT_HALF_SIZE).to_cols_array_2d(),
                id: (i + 1) as u32,
                _pad: [0; 3],
            })
            .collect();
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("pick_encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("pick_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.id_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.set_vertex_buffer(0, cube_vertices.slice(..));
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            pass.draw(0..cube_vertex_count, 0..instances.len() as u32);
        }
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.id_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(BYTES_PER_ROW),
                    rows_per_image: Some(PICK_REGION),
                },
            },
            wgpu::Extent3d {
                width: PICK_REGION,
                height: PICK_REGION,
                depth_or_array_layers: 1,
            },
        );
        queue.submit(std::iter::once(encoder.finish()));

        // synchronous by design: click-to-select wants the answer this frame
        let slice = self.readback.slice(..);
        slice.map_async(wgpu::MapMode::Read, |_| {});
        let _ = device.poll(wgpu::PollType::wait_indefinitely());
        let hit = {
            let data = slice.get_mapped_range();
            first_hit(&data, PICK_REGION, PICK_REGION, BYTES_PER_ROW)
        };
        self.readback.unmap();

        hit.map(|id| id as usize)
    }
}

// ---------------------------------------------------------------------------
// Drag math
// ---------------------------------------------------------------------------

/// Unproject the cursor to a world-space ray through the scene.
pub fn mouse_ray(cursor: (f32, f32), viewport: (f32, f32), projection: Mat4, view: Mat4) -> (Vec3, Vec3) {
    let nx = 2.0 * cursor.0 / viewport.0 - 1.0;
    let ny = 1.0 - 2.0 * cursor.1 / viewport.1;
    let inv = (projection * view).inverse();
    let near = inv.project_point3(Vec3::new(nx, ny, 0.0));
    let far = inv.project_point3(Vec3::new(nx, ny, 1.0));
    let dir = (far - near).normalize_or_zero();
    (near, dir)
}

/// Move a point within the horizontal plane through its current height.
/// Returns `None` when the ray runs parallel to the plane.
pub fn drag_horizontal(origin: Vec3, dir: Vec3, point: Vec3) -> Option<Vec3> {
    if dir.y.abs() < 1e-6 {
        return None;
    }
    let s = (point.y - origin.y) / dir.y;
    if s < 0.0 {
        return None;
    }
    let hit = origin + dir * s;
    Some(Vec3::new(hit.x, point.y, hit.z))
}

/// Move a point along the vertical axis through its current x/z: the new
/// height is where the ray passes closest to that axis.
pub fn drag_vertical(origin: Vec3, dir: Vec3, point: Vec3) -> Vec3 {
    let d = Vec2::new(dir.x, dir.z);
    let denom = d.length_squared();
    if denom < 1e-9 {
        // looking straight down the axis; leave the point alone
        return point;
    }
    let to_axis = Vec2::new(point.x - origin.x, point.z - origin.z);
    let s = to_axis.dot(d) / denom;
    Vec3::new(point.x, origin.y + dir.y * s, point.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_hit_takes_scan_order_not_depth() {
        let mut data = vec![0u8; (BYTES_PER_ROW * PICK_REGION) as usize];
        // row 1 holds id 7, row 3 holds id 2: scan order wins
        data[(BYTES_PER_ROW + 8) as usize..(BYTES_PER_ROW + 12) as usize]
            .copy_from_slice(&7u32.to_le_bytes());
        data[(3 * BYTES_PER_ROW) as usize..(3 * BYTES_PER_ROW + 4) as usize]
            .copy_from_slice(&2u32.to_le_bytes());
        assert_eq!(first_hit(&data, PICK_REGION, PICK_REGION, BYTES_PER_ROW), Some(6));
    }

    #[test]
    fn test_first_hit_ids_are_one_based() {
        let mut data = vec![0u8; (BYTES_PER_ROW * PICK_REGION) as usize];
        data[0..4].copy_from_slice(&1u32.to_le_bytes());
        assert_eq!(first_hit(&data, PICK_REGION, PICK_REGION, BYTES_PER_ROW), Some(0));
    }

    #[test]
    fn test_first_hit_empty_region_is_none() {
        let data = vec![0u8; (BYTES_PER_ROW * PICK_REGION) as usize];
        assert_eq!(first_hit(&data, PICK_REGION, PICK_REGION, BYTES_PER_ROW), None);
    }

    #[test]
    fn test_pick_projection_centers_cursor() {
        let (w, h) = (800.0f32, 600.0f32);
        // a point whose NDC position corresponds to this pixel...
        let ndc = glam::Vec3::new(0.25, -0.5, 0.5);
        let cx = (ndc.x + 1.0) * 0.5 * w;
        let cy_top = (1.0 - ndc.y) * 0.5 * h;
        // ...lands at the center of the pick window
        let m = pick_projection(Mat4::IDENTITY, (cx, cy_top), (w, h));
        let out = m.project_point3(ndc);
        assert!(out.x.abs() < 1e-4, "x = {}", out.x);
        assert!(out.y.abs() < 1e-4, "y = {}", out.y);
    }

    #[test]
    fn test_pick_projection_scales_window_to_clip() {
        let (w, h) = (500.0f32, 500.0f32);
        let center = (250.0, 250.0);
        let m = pick_projection(Mat4::IDENTITY, center, (w, h));
        // a point one pick-window width away from center leaves clip space
        let ndc_offset = 2.0 * PICK_REGION as f32 / w;
        let out = m.project_point3(glam::Vec3::new(ndc_offset, 0.0, 0.5));
        assert!(out.x > 1.5);
    }

    #[test]
    fn test_drag_horizontal_keeps_height() {
        let origin = Vec3::new(0.0, 100.0, 0.0);
        let dir = Vec3::new(1.0, -1.0, 0.0).normalize();
        let point = Vec3::new(50.0, 5.0, 10.0);
        let moved = drag_horizontal(origin, dir, point).unwrap();
        assert!((moved.y - 5.0).abs() < 1e-5);
        assert!((moved.x - 95.0).abs() < 1e-3);
    }

    #[test]
    fn test_drag_horizontal_parallel_ray_is_none() {
        let origin = Vec3::new(0.0, 100.0, 0.0);
        let dir = Vec3::X;
        assert_eq!(drag_horizontal(origin, dir, Vec3::ZERO), None);
    }

    #[test]
    fn test_drag_vertical_keeps_xz() {
        let point = Vec3::new(10.0, 5.0, 0.0);
        // ray passing over the axis at height 20
        let origin = Vec3::new(0.0, 20.0, 0.0);
        let dir = Vec3::X;
        let moved = drag_vertical(origin, dir, point);
        assert_eq!(moved.x, 10.0);
        assert_eq!(moved.z, 0.0);
        assert!((moved.y - 20.0).abs() < 1e-5);
    }

    #[test]
    fn test_mouse_ray_points_into_scene() {
        let proj = Mat4::perspective_rh(1.0, 1.0, 1.0, 100.0);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
        let (origin, dir) = mouse_ray((400.0, 300.0), (800.0, 600.0), proj, view);
        // center of the screen: straight toward the origin
        assert!(dir.z < -0.9);
        assert!(origin.z < 10.0);
    }
}
