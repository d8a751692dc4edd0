//! Embedded WGSL shaders for the frame passes.
//!
//! Shaders are composed from shared fragments at pipeline-creation time:
//! every scene-pass shader is prefixed with [`SCENE_COMMON`] (the shared
//! projection/view block at group 0), the water shaders additionally pull in
//! [`LIGHTING`], and the fullscreen passes share [`FULLSCREEN_VS`].

/// Shared projection/view uniform block, bound at group 0 by every scene
/// and shadow shader. Published once per frame.
pub const SCENE_COMMON: &str = r#"
struct SceneMatrices {
    projection: mat4x4<f32>,
    view: mat4x4<f32>,
}

@group(0) @binding(0) var<uniform> matrices: SceneMatrices;
"#;

/// Directional + point light rig and the Blinn-Phong shading shared by the
/// water shaders. The light values are uploaded per frame at group 1.
pub const LIGHTING: &str = r#"
struct DirLight {
    direction: vec3<f32>,
    _pad0: f32,
    ambient: vec3<f32>,
    _pad1: f32,
    diffuse: vec3<f32>,
    _pad2: f32,
    specular: vec3<f32>,
    _pad3: f32,
}

struct PointLight {
    position: vec3<f32>,
    _pad0: f32,
    ambient: vec3<f32>,
    _pad1: f32,
    diffuse: vec3<f32>,
    _pad2: f32,
    specular: vec3<f32>,
    _pad3: f32,
    // constant, linear, quadratic
    attenuation: vec3<f32>,
    _pad4: f32,
}

struct SceneLights {
    sun: DirLight,
    lamp: PointLight,
}

@group(1) @binding(1) var<uniform> lights: SceneLights;

fn shade_phong(albedo: vec3<f32>, n: vec3<f32>, world: vec3<f32>, view_pos: vec3<f32>, shininess: f32) -> vec3<f32> {
    let v = normalize(view_pos - world);

    let ld = normalize(-lights.sun.direction);
    let half_d = normalize(ld + v);
    var color = lights.sun.ambient * albedo
        + lights.sun.diffuse * max(dot(n, ld), 0.0) * albedo
        + lights.sun.specular * pow(max(dot(n, half_d), 0.0), shininess);

    let to_lamp = lights.lamp.position - world;
    let dist = length(to_lamp);
    let lp = to_lamp / max(dist, 0.0001);
    let att = 1.0 / (lights.lamp.attenuation.x
        + lights.lamp.attenuation.y * dist
        + lights.lamp.attenuation.z * dist * dist);
    let half_p = normalize(lp + v);
    color = color + att * (lights.lamp.ambient * albedo
        + lights.lamp.diffuse * max(dot(n, lp), 0.0) * albedo
        + lights.lamp.specular * pow(max(dot(n, half_p), 0.0), shininess));

    return color;
}
"#;

/// Sinusoidal water surface: vertices displaced along a travelling sine
/// wave, analytic slope normal, Blinn-Phong over the water albedo texture.
pub const WATER_SINE_SHADER: &str = r#"
struct WaterParams {
    model: mat4x4<f32>,
    camera_pos: vec3<f32>,
    time: f32,
    amplitude: f32,
    speed: f32,
    wave_length: f32,
    shininess: f32,
}

@group(1) @binding(0) var<uniform> params: WaterParams;
@group(2) @binding(0) var water_tex: texture_2d<f32>;
@group(2) @binding(1) var water_samp: sampler;

struct VertexIn {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) world: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

const TAU: f32 = 6.28318530718;

@vertex
fn vs_main(in: VertexIn) -> VsOut {
    var out: VsOut;
    var world = params.model * vec4<f32>(in.position, 1.0);
    let k = TAU / max(params.wave_length, 0.001);
    let phase = world.x * k + params.time * params.speed;
    world.y = world.y + params.amplitude * sin(phase);
    let slope = params.amplitude * k * cos(phase);
    out.world = world.xyz;
    out.normal = normalize(vec3<f32>(-slope, 1.0, 0.0));
    out.uv = in.uv;
    out.clip = matrices.projection * matrices.view * world;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    let albedo = textureSample(water_tex, water_samp, in.uv).rgb;
    let n = normalize(in.normal);
    let color = shade_phong(albedo, n, in.world, params.camera_pos, params.shininess);
    return vec4<f32>(color, 1.0);
}
"#;

/// Height-map water surface: vertices displaced by the current frame of the
/// height-map cycle plus the ripple field; shading blends sky reflection and
/// tile refraction over the rippled albedo.
pub const WATER_HEIGHT_SHADER: &str = r#"
struct WaterParams {
    model: mat4x4<f32>,
    camera_pos: vec3<f32>,
    time: f32,
    amplitude: f32,
    speed: f32,
    wave_length: f32,
    shininess: f32,
}

@group(1) @binding(0) var<uniform> params: WaterParams;
@group(2) @binding(0) var water_tex: texture_2d<f32>;
@group(2) @binding(1) var height_tex: texture_2d<f32>;
@group(2) @binding(2) var ripple_tex: texture_2d<f32>;
@group(2) @binding(3) var tile_map: texture_cube<f32>;
@group(2) @binding(4) var sky_map: texture_cube<f32>;
@group(2) @binding(5) var water_samp: sampler;

struct VertexIn {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) world: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

@vertex
fn vs_main(in: VertexIn) -> VsOut {
    var out: VsOut;
    var world = params.model * vec4<f32>(in.position, 1.0);
    let h = textureSampleLevel(height_tex, water_samp, in.uv, 0.0).r;
    let r = textureSampleLevel(ripple_tex, water_samp, in.uv, 0.0).r;
    world.y = world.y + params.amplitude * (h - 0.5) + (r - 0.5) * 2.0;

    // normal from the height-field gradient
    let e = 1.0 / 128.0;
    let hx = textureSampleLevel(height_tex, water_samp, in.uv + vec2<f32>(e, 0.0), 0.0).r
        - textureSampleLevel(height_tex, water_samp, in.uv - vec2<f32>(e, 0.0), 0.0).r;
    let hz = textureSampleLevel(height_tex, water_samp, in.uv + vec2<f32>(0.0, e), 0.0).r
        - textureSampleLevel(height_tex, water_samp, in.uv - vec2<f32>(0.0, e), 0.0).r;
    out.normal = normalize(vec3<f32>(-hx * params.amplitude, 0.5, -hz * params.amplitude));

    out.world = world.xyz;
    out.uv = in.uv;
    out.clip = matrices.projection * matrices.view * world;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    let n = normalize(in.normal);
    let duv = (textureSample(ripple_tex, water_samp, in.uv).r - 0.5) * 0.05;
    let albedo = textureSample(water_tex, water_samp, in.uv + vec2<f32>(duv, duv)).rgb;
    let view_dir = normalize(in.world - params.camera_pos);
    let refl = textureSample(sky_map, water_samp, reflect(view_dir, n)).rgb;
    let refr = textureSample(tile_map, water_samp, refract(view_dir, n, 0.75)).rgb;
    let base = mix(mix(albedo, refr, 0.2), refl, 0.35);
    let color = shade_phong(base, n, in.world, params.camera_pos, params.shininess);
    return vec4<f32>(color, 1.0);
}
"#;

/// Skybox cube, centered on the viewer and sampled by direction. Drawn with
/// a less-equal depth test so it sits at maximum depth.
pub const SKYBOX_SHADER: &str = r#"
struct SkyParams {
    model: mat4x4<f32>,
}

@group(1) @binding(0) var<uniform> params: SkyParams;
@group(2) @binding(0) var sky_map: texture_cube<f32>;
@group(2) @binding(1) var sky_samp: sampler;

struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) dir: vec3<f32>,
}

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> VsOut {
    var out: VsOut;
    out.dir = position;
    out.clip = matrices.projection * matrices.view * params.model * vec4<f32>(position, 1.0);
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    return textureSample(sky_map, sky_samp, normalize(in.dir));
}
"#;

/// Tiled environment cube, seen from the inside. The walls fade below the
/// animated water line and pick up a faint sky reflection.
pub const TILE_SHADER: &str = r#"
struct TileParams {
    model: mat4x4<f32>,
    camera_pos: vec3<f32>,
    amplitude: f32,
}

@group(1) @binding(0) var<uniform> params: TileParams;
@group(2) @binding(0) var tile_map: texture_cube<f32>;
@group(2) @binding(1) var sky_map: texture_cube<f32>;
@group(2) @binding(2) var height_tex: texture_2d<f32>;
@group(2) @binding(3) var tile_samp: sampler;

struct VertexIn {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) local: vec3<f32>,
    @location(1) world: vec3<f32>,
    @location(2) normal: vec3<f32>,
}

@vertex
fn vs_main(in: VertexIn) -> VsOut {
    var out: VsOut;
    let world = params.model * vec4<f32>(in.position, 1.0);
    out.local = in.position;
    out.world = world.xyz;
    out.normal = normalize((params.model * vec4<f32>(in.normal, 0.0)).xyz);
    out.clip = matrices.projection * matrices.view * world;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    let base = textureSample(tile_map, tile_samp, in.local).rgb;
    let n = normalize(in.normal);
    let view_dir = normalize(in.world - params.camera_pos);
    let refl = textureSample(sky_map, tile_samp, reflect(view_dir, n)).rgb;

    let huv = clamp(in.local.xz * 0.5 + vec2<f32>(0.5, 0.5), vec2<f32>(0.0), vec2<f32>(1.0));
    let water_y = (textureSample(height_tex, tile_samp, huv).r - 0.5) * params.amplitude;
    let submerged = clamp((water_y - in.world.y) * 0.02, 0.0, 1.0);

    var color = mix(base, base * vec3<f32>(0.5, 0.7, 0.9), submerged);
    color = color + refl * 0.08;
    return vec4<f32>(color, 1.0);
}
"#;

/// Instanced control-point cubes with per-instance model matrix and color.
pub const POINTS_SHADER: &str = r#"
struct VertexIn {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

struct InstanceIn {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
}

struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) color: vec4<f32>,
}

@vertex
fn vs_main(v: VertexIn, inst: InstanceIn) -> VsOut {
    let model = mat4x4<f32>(inst.model_0, inst.model_1, inst.model_2, inst.model_3);
    var out: VsOut;
    out.clip = matrices.projection * matrices.view * model * vec4<f32>(v.position, 1.0);
    out.normal = normalize((model * vec4<f32>(v.normal, 0.0)).xyz);
    out.color = inst.color;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    let light = normalize(vec3<f32>(0.0, 1.0, 1.0));
    let shade = 0.35 + 0.65 * max(dot(normalize(in.normal), light), 0.0);
    return vec4<f32>(in.color.rgb * shade, in.color.a);
}
"#;

/// Shadow overlay for the control points: flattened instances, constant
/// translucent black. The instance stream carries no color at all.
pub const POINT_SHADOW_SHADER: &str = r#"
struct InstanceIn {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
}

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) normal: vec3<f32>, inst: InstanceIn) -> @builtin(position) vec4<f32> {
    let model = mat4x4<f32>(inst.model_0, inst.model_1, inst.model_2, inst.model_3);
    return matrices.projection * matrices.view * model * vec4<f32>(position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(0.0, 0.0, 0.0, 0.5);
}
"#;

/// Selection pass: each control point writes its 1-based index into an
/// R32Uint target. Zero texels mean background.
pub const PICK_SHADER: &str = r#"
struct InstanceIn {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) id: u32,
}

struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) @interpolate(flat) id: u32,
}

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) normal: vec3<f32>, inst: InstanceIn) -> VsOut {
    let model = mat4x4<f32>(inst.model_0, inst.model_1, inst.model_2, inst.model_3);
    var out: VsOut;
    out.clip = matrices.projection * matrices.view * model * vec4<f32>(position, 1.0);
    out.id = inst.id;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) u32 {
    return in.id;
}
"#;

/// Fullscreen triangle vertex stage shared by the ripple and post passes.
pub const FULLSCREEN_VS: &str = r#"
struct FsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

@vertex
fn vs_fullscreen(@builtin(vertex_index) index: u32) -> FsOut {
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0)
    );
    let pos = positions[index];
    var out: FsOut;
    out.pos = vec4<f32>(pos, 0.0, 1.0);
    out.uv = vec2<f32>(pos.x * 0.5 + 0.5, 1.0 - (pos.y * 0.5 + 0.5));
    return out;
}
"#;

/// Ripple update: adds one cosine-shaped drop to the persistent ripple
/// field at the armed UV. The result is copied back into the field after
/// the pass.
pub const RIPPLE_DROP_SHADER: &str = r#"
const PI: f32 = 3.141592653589793;

struct DropParams {
    center: vec2<f32>,
    radius: f32,
    strength: f32,
}

@group(0) @binding(0) var ripple_tex: texture_2d<f32>;
@group(0) @binding(1) var ripple_samp: sampler;
@group(0) @binding(2) var<uniform> params: DropParams;

@fragment
fn fs_drop(in: FsOut) -> @location(0) vec4<f32> {
    var info = textureSample(ripple_tex, ripple_samp, in.uv);
    let falloff = max(0.0, 1.0 - distance(in.uv, params.center) / params.radius);
    let bump = 0.5 - 0.5 * cos(falloff * PI);
    info.r = clamp(info.r + bump * params.strength, 0.0, 1.0);
    return info;
}
"#;

/// Post-process composite: samples the offscreen scene color into the
/// visible viewport, optionally pixelated.
pub const POST_SHADER: &str = r#"
struct PostParams {
    width: f32,
    height: f32,
    pixelate: f32,
    _pad: f32,
}

@group(0) @binding(0) var scene_tex: texture_2d<f32>;
@group(0) @binding(1) var scene_samp: sampler;
@group(0) @binding(2) var<uniform> params: PostParams;

const PIXEL_BLOCK: f32 = 8.0;

@fragment
fn fs_post(in: FsOut) -> @location(0) vec4<f32> {
    var uv = in.uv;
    if params.pixelate > 0.5 {
        let grid = vec2<f32>(params.width, params.height) / PIXEL_BLOCK;
        uv = (floor(uv * grid) + vec2<f32>(0.5, 0.5)) / grid;
    }
    return textureSample(scene_tex, scene_samp, uv);
}
"#;
