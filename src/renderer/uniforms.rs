//! Shared projection/view uniform block.
//!
//! One GPU buffer holds the frame's projection and view matrices; every
//! scene-pass shader binds it at group 0. The block is published exactly
//! once per frame and the publish returns a token that the consuming passes
//! require, so "publish before consume" holds by construction.

use glam::Mat4;
use wgpu::util::DeviceExt;

/// The block's exact contents: projection then view.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MatrixBlock {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
}

impl MatrixBlock {
    pub fn new(projection: Mat4, view: Mat4) -> Self {
        Self {
            projection: projection.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
        }
    }
}

/// Bind group layout for the shared block (group 0 in every scene shader).
pub fn matrices_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("scene_matrices_layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: std::num::NonZeroU64::new(
                    std::mem::size_of::<MatrixBlock>() as u64
                ),
            },
            count: None,
        }],
    })
}

/// Owner of the shared block buffer.
pub struct SharedMatrices {
    buffer: wgpu::Buffer,
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl SharedMatrices {
    pub fn new(device: &wgpu::Device) -> Self {
        let layout = matrices_layout(device);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("scene_matrices_buffer"),
            contents: bytemuck::bytes_of(&MatrixBlock::new(Mat4::IDENTITY, Mat4::IDENTITY)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_matrices_bind_group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self {
            buffer,
            layout,
            bind_group,
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    /// Upload this frame's snapshot and hand out the consumption token.
    /// Passes that read the block take a `&PublishedMatrices`, so they
    /// cannot be encoded before the publish.
    pub fn publish(&self, queue: &wgpu::Queue, projection: Mat4, view: Mat4) -> PublishedMatrices<'_> {
        queue.write_buffer(
            &self.buffer,
            0,
            bytemuck::bytes_of(&MatrixBlock::new(projection, view)),
        );
        PublishedMatrices {
            bind_group: &self.bind_group,
        }
    }
}

/// Proof that the shared block was published this frame.
pub struct PublishedMatrices<'a> {
    bind_group: &'a wgpu::BindGroup,
}

impl<'a> PublishedMatrices<'a> {
    pub fn bind_group(&self) -> &'a wgpu::BindGroup {
        self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_is_exactly_two_matrices() {
        assert_eq!(std::mem::size_of::<MatrixBlock>(), 128);
    }

    #[test]
    fn test_block_stores_both_matrices() {
        let proj = Mat4::from_scale(glam::Vec3::splat(2.0));
        let view = Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0));
        let block = MatrixBlock::new(proj, view);
        assert_eq!(block.projection, proj.to_cols_array_2d());
        assert_eq!(block.view, view.to_cols_array_2d());
    }
}
