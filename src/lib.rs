//! # trackview
//!
//! Interactive 3D viewer for a train-track editing scene: animated water,
//! skybox, a tiled environment cube, ripple effects and draggable track
//! control points, embedded in an egui desktop window with a wgpu renderer.
//!
//! ## Modules
//!
//! - [`renderer`] - multi-pass wgpu renderer, resource cache, picking
//! - [`camera`] - orbit / top-down / train camera selection
//! - [`track`] - control-point model and the train camera path
//! - [`viewport`] - egui viewport widget wiring input to the renderer
//! - [`app`] - application shell and widget panel
//! - [`mesh`] - water surface mesh loading
//! - [`settings`] - persisted knobs and window state
//! - [`error`] - fatal asset errors

pub mod app;
pub mod camera;
pub mod error;
pub mod mesh;
pub mod renderer;
pub mod settings;
pub mod track;
pub mod viewport;

pub use error::AssetError;
pub use settings::Settings;

use anyhow::Result;
use tracing_subscriber::prelude::*;

/// Run the viewer.
pub fn run() -> Result<()> {
    env_logger::init();

    let trace_guard = init_tracing();

    // Friendly panic handler for GPU errors
    std::panic::set_hook(Box::new(|info| {
        let msg = info
            .payload()
            .downcast_ref::<String>()
            .map(|s| s.as_str())
            .or_else(|| info.payload().downcast_ref::<&str>().copied())
            .unwrap_or("Unknown error");

        if msg.contains("wgpu") || msg.contains("Buffer") || msg.contains("shader") {
            eprintln!("\n[GPU Error] {}", msg);
            eprintln!("\nThis is likely a shader/buffer mismatch. Try updating or rebuilding.");
        } else {
            eprintln!("\n[Error] {}", msg);
            if let Some(loc) = info.location() {
                eprintln!("  at {}:{}:{}", loc.file(), loc.line(), loc.column());
            }
        }
    }));

    let settings = Settings::load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([settings.window_width, settings.window_height])
            .with_title("Track View"),
        renderer: eframe::Renderer::Wgpu,
        wgpu_options: egui_wgpu::WgpuConfiguration {
            wgpu_setup: egui_wgpu::WgpuSetup::CreateNew(egui_wgpu::WgpuSetupCreateNew {
                device_descriptor: std::sync::Arc::new(|adapter| {
                    let base_limits = if adapter.get_info().backend == wgpu::Backend::Gl {
                        wgpu::Limits::downlevel_webgl2_defaults()
                    } else {
                        wgpu::Limits::default()
                    };
                    wgpu::DeviceDescriptor {
                        label: Some("trackview device"),
                        required_limits: base_limits,
                        ..Default::default()
                    }
                }),
                ..Default::default()
            }),
            ..Default::default()
        },
        ..Default::default()
    };

    eframe::run_native(
        "Track View",
        options,
        Box::new(move |cc| Ok(Box::new(app::TrackViewApp::new(cc, trace_guard)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run: {}", e))
}

fn init_tracing() -> Option<tracing_chrome::FlushGuard> {
    if std::env::var("TRACKVIEW_TRACE").ok().as_deref() != Some("1") {
        return None;
    }

    let (chrome_layer, guard) = tracing_chrome::ChromeLayerBuilder::new()
        .file("trace.json")
        .build();

    let subscriber = tracing_subscriber::registry().with(chrome_layer);
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return None;
    }

    Some(guard)
}
