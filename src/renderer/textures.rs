//! Image, cubemap and height-map-sequence loading.
//!
//! All loaders return an error for missing or undecodable files; the
//! caller treats that as fatal. Color textures upload as sRGB, the
//! height-map cycle and the ripple field stay linear so the shaders read
//! raw heights.

use std::path::Path;

use image::RgbaImage;

use crate::error::{AssetError, Result};
use crate::renderer::HEIGHT_MAP_FRAMES;

use super::resources::RIPPLE_SIZE;

fn decode_rgba(path: &Path) -> Result<RgbaImage> {
    if !path.exists() {
        return Err(AssetError::NotFound(path.to_path_buf()));
    }
    let img = image::ImageReader::open(path)
        .map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .decode()
        .map_err(|source| AssetError::Image {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(img.to_rgba8())
}

fn write_layer(queue: &wgpu::Queue, texture: &wgpu::Texture, layer: u32, img: &RgbaImage) {
    let (width, height) = img.dimensions();
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d { x: 0, y: 0, z: layer },
            aspect: wgpu::TextureAspect::All,
        },
        img.as_raw(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

/// Load a 2D texture from an image file.
pub fn load_texture_2d(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    path: &Path,
    srgb: bool,
) -> Result<wgpu::Texture> {
    let img = decode_rgba(path)?;
    let (width, height) = img.dimensions();
    let format = if srgb {
        wgpu::TextureFormat::Rgba8UnormSrgb
    } else {
        wgpu::TextureFormat::Rgba8Unorm
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: path.file_name().and_then(|n| n.to_str()),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    write_layer(queue, &texture, 0, &img);
    Ok(texture)
}

/// Load six face images into one cube texture. Face order matches the
/// cubemap convention: +X, -X, +Y, -Y, +Z, -Z.
pub fn load_cubemap(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    faces: &[std::path::PathBuf; 6],
) -> Result<wgpu::Texture> {
    let first = decode_rgba(&faces[0])?;
    let (width, height) = first.dimensions();
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("cubemap"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 6,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    write_layer(queue, &texture, 0, &first);
    for (layer, path) in faces.iter().enumerate().skip(1) {
        let mut img = decode_rgba(path)?;
        if img.dimensions() != (width, height) {
            // every face must match the first; resample instead of failing
            img = image::imageops::resize(&img, width, height, image::imageops::FilterType::Triangle);
        }
        write_layer(queue, &texture, layer as u32, &img);
    }
    Ok(texture)
}

/// Cube view over a six-layer texture.
pub fn cube_view(texture: &wgpu::Texture) -> wgpu::TextureView {
    texture.create_view(&wgpu::TextureViewDescriptor {
        dimension: Some(wgpu::TextureViewDimension::Cube),
        ..Default::default()
    })
}

/// Load the numbered height-map cycle `000.png` .. `199.png`.
pub fn load_height_sequence(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    dir: &Path,
) -> Result<Vec<wgpu::Texture>> {
    let mut frames = Vec::with_capacity(HEIGHT_MAP_FRAMES);
    for i in 0..HEIGHT_MAP_FRAMES {
        let path = dir.join(format!("{:03}.png", i));
        frames.push(load_texture_2d(device, queue, &path, false)?);
    }
    Ok(frames)
}

/// Seed the persistent ripple field from the ripple image, resampled to
/// the fixed field size.
pub fn load_ripple_field(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    path: &Path,
) -> Result<wgpu::Texture> {
    let img = decode_rgba(path)?;
    let img = if img.dimensions() == (RIPPLE_SIZE, RIPPLE_SIZE) {
        img
    } else {
        image::imageops::resize(&img, RIPPLE_SIZE, RIPPLE_SIZE, image::imageops::FilterType::Triangle)
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("ripple_field"),
        size: wgpu::Extent3d {
            width: RIPPLE_SIZE,
            height: RIPPLE_SIZE,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    write_layer(queue, &texture, 0, &img);
    Ok(texture)
}
