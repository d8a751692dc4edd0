//! GPU-side resources: render targets, POD uniform/instance types and the
//! static scene geometry.

/// Depth format used by every depth attachment.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Offscreen color format for the scene pass; the post pass samples it.
pub const SCENE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Edge length of the persistent ripple field.
pub const RIPPLE_SIZE: u32 = 400;

/// True when a cached target size no longer matches the viewport.
pub fn size_mismatch(cached: Option<(u32, u32)>, want: (u32, u32)) -> bool {
    match cached {
        Some(size) => size != want,
        None => true,
    }
}

/// Viewport-sized scene targets: the color texture the scene and shadow
/// passes render into, and its depth buffer. Re-provisioned whenever the
/// viewport size changes.
pub struct SceneTargets {
    #[allow(dead_code)]
    pub color: wgpu::Texture,
    pub color_view: wgpu::TextureView,
    #[allow(dead_code)]
    pub depth: wgpu::Texture,
    pub depth_view: wgpu::TextureView,
    pub size: (u32, u32),
}

impl SceneTargets {
    pub fn create(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("scene_color_target"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SCENE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("scene_depth_target"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            color,
            color_view,
            depth,
            depth_view,
            size: (width, height),
        }
    }
}

/// The ripple field pair: the persistent texture the water shader samples,
/// and the render target the drop shader writes. After the ripple pass the
/// target is copied back into the persistent texture.
pub struct RippleTargets {
    pub tex: wgpu::Texture,
    pub tex_view: wgpu::TextureView,
    pub target: wgpu::Texture,
    pub target_view: wgpu::TextureView,
}

impl RippleTargets {
    /// `tex` must already exist (it is seeded from the ripple image asset);
    /// this creates the matching render target.
    pub fn with_field(device: &wgpu::Device, tex: wgpu::Texture) -> Self {
        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("ripple_render_target"),
            size: wgpu::Extent3d {
                width: RIPPLE_SIZE,
                height: RIPPLE_SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let tex_view = tex.create_view(&wgpu::TextureViewDescriptor::default());
        let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            tex,
            tex_view,
            target,
            target_view,
        }
    }
}

// ---------------------------------------------------------------------------
// POD uniform and instance types
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SkyParams {
    pub model: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TileParams {
    pub model: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub amplitude: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct WaterParams {
    pub model: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub time: f32,
    pub amplitude: f32,
    pub speed: f32,
    pub wave_length: f32,
    pub shininess: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DirLight {
    pub direction: [f32; 3],
    pub _pad0: f32,
    pub ambient: [f32; 3],
    pub _pad1: f32,
    pub diffuse: [f32; 3],
    pub _pad2: f32,
    pub specular: [f32; 3],
    pub _pad3: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLight {
    pub position: [f32; 3],
    pub _pad0: f32,
    pub ambient: [f32; 3],
    pub _pad1: f32,
    pub diffuse: [f32; 3],
    pub _pad2: f32,
    pub specular: [f32; 3],
    pub _pad3: f32,
    pub attenuation: [f32; 3],
    pub _pad4: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneLights {
    pub sun: DirLight,
    pub lamp: PointLight,
}

impl SceneLights {
    /// Light rig for the sine-wave water.
    pub fn sine() -> Self {
        Self {
            sun: DirLight {
                direction: [-0.2, -1.0, -0.3],
                ambient: [0.0, 0.0, 0.0],
                diffuse: [0.1, 0.1, 0.1],
                specular: [0.5, 0.5, 0.5],
                ..Default::default()
            },
            lamp: PointLight {
                position: [0.0, 10.0, 0.0],
                ambient: [0.0, 0.0, 0.0],
                diffuse: [0.8, 0.8, 0.8],
                specular: [1.0, 1.0, 1.0],
                attenuation: [1.0, 0.09, 0.032],
                ..Default::default()
            },
        }
    }

    /// Light rig for the height-map water.
    pub fn height_map() -> Self {
        Self {
            sun: DirLight {
                direction: [0.0, -20.0, 0.0],
                ambient: [0.0, 0.0, 0.0],
                diffuse: [0.5, 0.5, 0.5],
                specular: [1.0, 1.0, 1.0],
                ..Default::default()
            },
            lamp: PointLight {
                position: [0.0, 10.0, 0.0],
                ambient: [0.05, 0.05, 0.05],
                diffuse: [0.8, 0.8, 0.8],
                specular: [1.0, 1.0, 1.0],
                attenuation: [1.0, 0.09, 0.032],
                ..Default::default()
            },
        }
    }
}

impl Default for DirLight {
    fn default() -> Self {
        bytemuck::Zeroable::zeroed()
    }
}

impl Default for PointLight {
    fn default() -> Self {
        bytemuck::Zeroable::zeroed()
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DropParams {
    pub center: [f32; 2],
    pub radius: f32,
    pub strength: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PostParams {
    pub width: f32,
    pub height: f32,
    pub pixelate: f32,
    pub _pad: f32,
}

/// Per-instance data for a control-point cube in the color pass.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointInstance {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

/// Per-instance data for a control-point shadow. Shadow draws must never
/// set per-object color, so the layout has no color at all.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShadowInstance {
    pub model: [[f32; 4]; 4],
}

/// Per-instance data for the selection pass; `id` is the 1-based point index.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PickInstance {
    pub model: [[f32; 4]; 4],
    pub id: u32,
    pub _pad: [u32; 3],
}

// ---------------------------------------------------------------------------
// Static geometry
// ---------------------------------------------------------------------------

/// Position + normal vertex for the environment cubes and point cubes.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CubeVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Full unit cube, 36 position-only vertices, for the skybox.
pub fn skybox_vertices() -> Vec<[f32; 3]> {
    let faces: [[[f32; 3]; 4]; 6] = [
        // -Z
        [[-1.0, 1.0, -1.0], [-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, 1.0, -1.0]],
        // -X
        [[-1.0, -1.0, 1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0]],
        // +X
        [[1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0]],
        // +Z
        [[-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, -1.0, 1.0]],
        // +Y
        [[-1.0, 1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]],
        // -Y
        [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, -1.0, -1.0]],
    ];
    let mut verts = Vec::with_capacity(36);
    for quad in &faces {
        for &i in &[0usize, 1, 2, 0, 2, 3] {
            verts.push(quad[i]);
        }
    }
    verts
}

/// The tiled environment cube: five faces with inward normals, no top —
/// the skybox shows through the opening.
pub fn tile_vertices() -> Vec<CubeVertex> {
    let faces: [([[f32; 3]; 4], [f32; 3]); 5] = [
        (
            [[-1.0, 1.0, -1.0], [-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, 1.0, -1.0]],
            [0.0, 0.0, -1.0],
        ),
        (
            [[-1.0, -1.0, 1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0]],
            [-1.0, 0.0, 0.0],
        ),
        (
            [[1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0]],
            [1.0, 0.0, 0.0],
        ),
        (
            [[-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, -1.0, 1.0]],
            [0.0, 0.0, 1.0],
        ),
        (
            [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, -1.0, -1.0]],
            [0.0, -1.0, 0.0],
        ),
    ];
    let mut verts = Vec::with_capacity(30);
    for (quad, normal) in &faces {
        for &i in &[0usize, 1, 2, 0, 2, 3] {
            verts.push(CubeVertex {
                position: quad[i],
                normal: *normal,
            });
        }
    }
    verts
}

/// Unit cube with outward normals for the control points.
pub fn cube_vertices() -> Vec<CubeVertex> {
    let faces: [([[f32; 3]; 4], [f32; 3]); 6] = [
        (
            [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]],
            [0.0, 0.0, 1.0],
        ),
        (
            [[1.0, -1.0, -1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0]],
            [0.0, 0.0, -1.0],
        ),
        (
            [[1.0, -1.0, 1.0], [1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0]],
            [1.0, 0.0, 0.0],
        ),
        (
            [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0]],
            [-1.0, 0.0, 0.0],
        ),
        (
            [[-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0], [-1.0, 1.0, -1.0]],
            [0.0, 1.0, 0.0],
        ),
        (
            [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0]],
            [0.0, -1.0, 0.0],
        ),
    ];
    let mut verts = Vec::with_capacity(36);
    for (quad, normal) in &faces {
        for &i in &[0usize, 1, 2, 0, 2, 3] {
            verts.push(CubeVertex {
                position: quad[i],
                normal: *normal,
            });
        }
    }
    verts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_mismatch() {
        assert!(size_mismatch(None, (800, 600)));
        assert!(size_mismatch(Some((800, 600)), (801, 600)));
        assert!(!size_mismatch(Some((800, 600)), (800, 600)));
    }

    #[test]
    fn test_uniform_layouts_match_wgsl() {
        use std::mem::size_of;
        // two mat4s
        assert_eq!(size_of::<WaterParams>(), 96);
        assert_eq!(size_of::<TileParams>(), 80);
        assert_eq!(size_of::<SkyParams>(), 64);
        assert_eq!(size_of::<DirLight>(), 64);
        assert_eq!(size_of::<PointLight>(), 80);
        assert_eq!(size_of::<SceneLights>(), 144);
        assert_eq!(size_of::<DropParams>(), 16);
        assert_eq!(size_of::<PostParams>(), 16);
    }

    #[test]
    fn test_instance_layouts() {
        use std::mem::size_of;
        assert_eq!(size_of::<PointInstance>(), 80);
        // a shadow instance is just a matrix; no color can sneak in
        assert_eq!(size_of::<ShadowInstance>(), 64);
        assert_eq!(size_of::<PickInstance>(), 80);
    }

    #[test]
    fn test_geometry_counts() {
        assert_eq!(skybox_vertices().len(), 36);
        // no top face on the tile cube
        assert_eq!(tile_vertices().len(), 30);
        assert_eq!(cube_vertices().len(), 36);
    }

    #[test]
    fn test_tile_cube_has_no_top_face() {
        for v in tile_vertices() {
            assert_ne!(v.normal, [0.0, 1.0, 0.0]);
        }
    }
}
