//! Render pipeline construction for every frame pass.

use super::resources::{CubeVertex, PickInstance, PointInstance, ShadowInstance, DEPTH_FORMAT, SCENE_FORMAT};
use super::shaders;
use crate::mesh::WaterVertex;

/// All pipelines plus the bind group layouts the renderer needs to build
/// its bind groups. Created once; immutable afterwards.
pub struct Pipelines {
    pub skybox: wgpu::RenderPipeline,
    pub tile: wgpu::RenderPipeline,
    pub water_sine: wgpu::RenderPipeline,
    pub water_height: wgpu::RenderPipeline,
    pub points: wgpu::RenderPipeline,
    pub point_shadow: wgpu::RenderPipeline,
    pub pick: wgpu::RenderPipeline,
    pub ripple_drop: wgpu::RenderPipeline,
    pub post: wgpu::RenderPipeline,

    pub params_layout: wgpu::BindGroupLayout,
    pub water_params_layout: wgpu::BindGroupLayout,
    pub skybox_tex_layout: wgpu::BindGroupLayout,
    pub tile_tex_layout: wgpu::BindGroupLayout,
    pub water_sine_tex_layout: wgpu::BindGroupLayout,
    pub water_height_tex_layout: wgpu::BindGroupLayout,
    pub ripple_layout: wgpu::BindGroupLayout,
    pub post_layout: wgpu::BindGroupLayout,
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32, dim: wgpu::TextureViewDimension) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: dim,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn depth_state(write: bool, compare: wgpu::CompareFunction) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: write,
        depth_compare: compare,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

fn position_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
    wgpu::VertexBufferLayout {
        array_stride: 12,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRS,
    }
}

fn cube_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<CubeVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRS,
    }
}

fn water_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRS: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<WaterVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRS,
    }
}

fn point_instance_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        2 => Float32x4, 3 => Float32x4, 4 => Float32x4, 5 => Float32x4, 6 => Float32x4
    ];
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<PointInstance>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &ATTRS,
    }
}

fn shadow_instance_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        2 => Float32x4, 3 => Float32x4, 4 => Float32x4, 5 => Float32x4
    ];
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<ShadowInstance>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &ATTRS,
    }
}

fn pick_instance_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        2 => Float32x4, 3 => Float32x4, 4 => Float32x4, 5 => Float32x4, 6 => Uint32
    ];
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<PickInstance>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &ATTRS,
    }
}

struct ScenePipelineDesc<'a> {
    label: &'a str,
    source: String,
    layouts: Vec<&'a wgpu::BindGroupLayout>,
    buffers: Vec<wgpu::VertexBufferLayout<'static>>,
    front_face: wgpu::FrontFace,
    cull_mode: Option<wgpu::Face>,
    depth: wgpu::DepthStencilState,
    target: wgpu::ColorTargetState,
}

fn scene_pipeline(device: &wgpu::Device, desc: ScenePipelineDesc<'_>) -> wgpu::RenderPipeline {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(desc.label),
        source: wgpu::ShaderSource::Wgsl(desc.source.into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(desc.label),
        bind_group_layouts: &desc.layouts,
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &desc.buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(desc.target)],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: desc.front_face,
            cull_mode: desc.cull_mode,
            ..Default::default()
        },
        depth_stencil: Some(desc.depth),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn fullscreen_pipeline(
    device: &wgpu::Device,
    label: &str,
    source: String,
    fs_entry: &str,
    layout: &wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: Some("vs_fullscreen"),
            compilation_options: Default::default(),
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: Some(fs_entry),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn opaque_target() -> wgpu::ColorTargetState {
    wgpu::ColorTargetState {
        format: SCENE_FORMAT,
        blend: None,
        write_mask: wgpu::ColorWrites::ALL,
    }
}

/// Build every pipeline. `matrices_layout` is the shared block's group-0
/// layout; `output_format` is the egui-registered viewport texture format
/// the post pass writes to.
pub fn create_pipelines(
    device: &wgpu::Device,
    matrices_layout: &wgpu::BindGroupLayout,
    output_format: wgpu::TextureFormat,
) -> Pipelines {
    // group 1 for skybox/tile: a single params uniform
    let params_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("scene_params_layout"),
        entries: &[uniform_entry(0)],
    });
    // group 1 for water: params + light rig
    let water_params_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("water_params_layout"),
        entries: &[uniform_entry(0), uniform_entry(1)],
    });

    let skybox_tex_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("skybox_tex_layout"),
        entries: &[
            texture_entry(0, wgpu::TextureViewDimension::Cube),
            sampler_entry(1),
        ],
    });
    let tile_tex_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("tile_tex_layout"),
        entries: &[
            texture_entry(0, wgpu::TextureViewDimension::Cube),
            texture_entry(1, wgpu::TextureViewDimension::Cube),
            texture_entry(2, wgpu::TextureViewDimension::D2),
            sampler_entry(3),
        ],
    });
    let water_sine_tex_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("water_sine_tex_layout"),
        entries: &[
            texture_entry(0, wgpu::TextureViewDimension::D2),
            sampler_entry(1),
        ],
    });
    let water_height_tex_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("water_height_tex_layout"),
        entries: &[
            texture_entry(0, wgpu::TextureViewDimension::D2),
            texture_entry(1, wgpu::TextureViewDimension::D2),
            texture_entry(2, wgpu::TextureViewDimension::D2),
            texture_entry(3, wgpu::TextureViewDimension::Cube),
            texture_entry(4, wgpu::TextureViewDimension::Cube),
            sampler_entry(5),
        ],
    });
    let ripple_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("ripple_layout"),
        entries: &[
            texture_entry(0, wgpu::TextureViewDimension::D2),
            sampler_entry(1),
            uniform_entry(2),
        ],
    });
    let post_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("post_layout"),
        entries: &[
            texture_entry(0, wgpu::TextureViewDimension::D2),
            sampler_entry(1),
            uniform_entry(2),
        ],
    });

    let skybox = scene_pipeline(
        device,
        ScenePipelineDesc {
            label: "skybox_pipeline",
            source: [shaders::SCENE_COMMON, shaders::SKYBOX_SHADER].join("\n"),
            layouts: vec![matrices_layout, &params_layout, &skybox_tex_layout],
            buffers: vec![position_layout()],
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            // the skybox sits at maximum depth; allow equal so it fills
            // everything the scene left untouched
            depth: depth_state(true, wgpu::CompareFunction::LessEqual),
            target: opaque_target(),
        },
    );

    let tile = scene_pipeline(
        device,
        ScenePipelineDesc {
            label: "tile_pipeline",
            source: [shaders::SCENE_COMMON, shaders::TILE_SHADER].join("\n"),
            layouts: vec![matrices_layout, &params_layout, &tile_tex_layout],
            buffers: vec![cube_layout()],
            // the cube is viewed from inside: clockwise winding, cull the front
            front_face: wgpu::FrontFace::Cw,
            cull_mode: Some(wgpu::Face::Front),
            depth: depth_state(true, wgpu::CompareFunction::LessEqual),
            target: opaque_target(),
        },
    );

    let water_sine = scene_pipeline(
        device,
        ScenePipelineDesc {
            label: "water_sine_pipeline",
            source: [shaders::SCENE_COMMON, shaders::LIGHTING, shaders::WATER_SINE_SHADER].join("\n"),
            layouts: vec![matrices_layout, &water_params_layout, &water_sine_tex_layout],
            buffers: vec![water_layout()],
            front_face: wgpu::FrontFace::Ccw,
            // the surface is visible from above and below
            cull_mode: None,
            depth: depth_state(true, wgpu::CompareFunction::Less),
            target: opaque_target(),
        },
    );

    let water_height = scene_pipeline(
        device,
        ScenePipelineDesc {
            label: "water_height_pipeline",
            source: [shaders::SCENE_COMMON, shaders::LIGHTING, shaders::WATER_HEIGHT_SHADER].join("\n"),
            layouts: vec![matrices_layout, &water_params_layout, &water_height_tex_layout],
            buffers: vec![water_layout()],
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            depth: depth_state(true, wgpu::CompareFunction::Less),
            target: opaque_target(),
        },
    );

    let points = scene_pipeline(
        device,
        ScenePipelineDesc {
            label: "points_pipeline",
            source: [shaders::SCENE_COMMON, shaders::POINTS_SHADER].join("\n"),
            layouts: vec![matrices_layout],
            buffers: vec![cube_layout(), point_instance_layout()],
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            depth: depth_state(true, wgpu::CompareFunction::Less),
            target: opaque_target(),
        },
    );

    let point_shadow = scene_pipeline(
        device,
        ScenePipelineDesc {
            label: "point_shadow_pipeline",
            source: [shaders::SCENE_COMMON, shaders::POINT_SHADOW_SHADER].join("\n"),
            layouts: vec![matrices_layout],
            buffers: vec![cube_layout(), shadow_instance_layout()],
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            depth: depth_state(false, wgpu::CompareFunction::LessEqual),
            target: wgpu::ColorTargetState {
                format: SCENE_FORMAT,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            },
        },
    );

    let pick = scene_pipeline(
        device,
        ScenePipelineDesc {
            label: "pick_pipeline",
            source: [shaders::SCENE_COMMON, shaders::PICK_SHADER].join("\n"),
            layouts: vec![matrices_layout],
            buffers: vec![cube_layout(), pick_instance_layout()],
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            depth: depth_state(true, wgpu::CompareFunction::Less),
            target: wgpu::ColorTargetState {
                format: wgpu::TextureFormat::R32Uint,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            },
        },
    );

    let ripple_drop = fullscreen_pipeline(
        device,
        "ripple_drop_pipeline",
        [shaders::FULLSCREEN_VS, shaders::RIPPLE_DROP_SHADER].join("\n"),
        "fs_drop",
        &ripple_layout,
        wgpu::TextureFormat::Rgba8Unorm,
    );

    let post = fullscreen_pipeline(
        device,
        "post_pipeline",
        [shaders::FULLSCREEN_VS, shaders::POST_SHADER].join("\n"),
        "fs_post",
        &post_layout,
        output_format,
    );

    Pipelines {
        skybox,
        tile,
        water_sine,
        water_height,
        points,
        point_shadow,
        pick,
        ripple_drop,
        post,
        params_layout,
        water_params_layout,
        skybox_tex_layout,
        tile_tex_layout,
        water_sine_tex_layout,
        water_height_tex_layout,
        ripple_layout,
        post_layout,
    }
}
