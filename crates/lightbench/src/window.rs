use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use gputime::ElapsedTimeProfiler;
use lightscene::{dpi_scale, effective_dpi, ConfigInfo, PointLight};
use tracing::{debug, info, trace, warn};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use crate::context::GpuContext;
use crate::lighting::LightingPass;
use crate::limits::RunLimits;

/// Per-window benchmark state. `gpu` is declared before `window` so the
/// surface is dropped ahead of the window it was created from.
struct BenchState {
    gpu: GpuContext,
    window: Arc<Window>,
    pass: LightingPass,
    profiler: Option<ElapsedTimeProfiler>,
    report_interval: u64,
    limits: RunLimits,
    frames: u64,
    started: Instant,
    dpi_scale: f32,
}

impl BenchState {
    fn new(window: Arc<Window>, config: &ConfigInfo, lights: &[PointLight]) -> Result<Self> {
        let gpu = GpuContext::new(window.as_ref(), window.inner_size(), config.vsync)?;
        let pass = LightingPass::new(&gpu.device, gpu.format(), lights)?;

        let profiler = match ElapsedTimeProfiler::new(&gpu.device, &gpu.queue) {
            Ok(profiler) => {
                info!(
                    adapter = %gpu.adapter_name,
                    frequency_hz = profiler.frequency().hz(),
                    encoder_queries = profiler.supports_encoder_queries(),
                    "GPU timing enabled"
                );
                Some(profiler)
            }
            Err(err) => {
                warn!(error = %err, "GPU timing unavailable; rendering without profiling");
                None
            }
        };

        let dpi = effective_dpi(window.scale_factor());
        let started = Instant::now();
        Ok(Self {
            gpu,
            window,
            pass,
            profiler,
            report_interval: config.report_interval,
            limits: RunLimits::new(config.max_frames, config.run_for, started),
            frames: 0,
            started,
            dpi_scale: dpi_scale(dpi),
        })
    }

    fn window(&self) -> &Window {
        self.window.as_ref()
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.resize(new_size);
    }

    fn set_scale_factor(&mut self, scale_factor: f64) {
        let dpi = effective_dpi(scale_factor);
        self.dpi_scale = dpi_scale(dpi);
        debug!(dpi, dpi_scale = self.dpi_scale, "display scale changed");
    }

    fn limits_reached(&self) -> bool {
        self.limits.reached(self.frames, Instant::now())
    }

    fn render_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let frame = self.gpu.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let time = self.started.elapsed().as_secs_f32();
        self.pass
            .update(&self.gpu.queue, self.gpu.size, time, self.dpi_scale);

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("lightbench frame"),
            });
        let timed = self.record(&mut encoder, &view);
        self.gpu.queue.submit(Some(encoder.finish()));
        frame.present();
        self.frames += 1;

        if timed {
            self.collect_timing();
        }
        Ok(())
    }

    /// Records the lighting pass, bracketed by timestamps when profiling is
    /// live. Returns whether a query was resolved into this encoder.
    fn record(&mut self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) -> bool {
        let Some(profiler) = self.profiler.as_mut() else {
            self.pass.encode(encoder, view, None);
            return false;
        };

        let mut encoded = false;
        let result = if profiler.supports_encoder_queries() {
            profiler.scope(encoder).map(|mut scope| {
                self.pass.encode(&mut scope, view, None);
                encoded = true;
            })
        } else {
            profiler
                .render_pass_timestamp_writes()
                .map(|writes| {
                    self.pass.encode(encoder, view, Some(writes));
                    encoded = true;
                })
                .and_then(|()| profiler.end_query_and_resolve(encoder))
        };

        match result {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "failed to record GPU timestamps; disabling profiling");
                self.profiler = None;
                if !encoded {
                    self.pass.encode(encoder, view, None);
                }
                false
            }
        }
    }

    fn collect_timing(&mut self) {
        let Some(profiler) = self.profiler.as_mut() else {
            return;
        };

        match profiler.elapsed_time(true) {
            Ok(elapsed_ms) => {
                trace!(elapsed_ms, frame = self.frames, "lighting pass GPU time");
                if profiler.samples() >= self.report_interval {
                    profiler.reset();
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to read GPU timestamps; disabling profiling");
                self.profiler = None;
            }
        }
    }

    fn finish(&mut self) {
        if let Some(profiler) = self.profiler.as_mut() {
            if profiler.samples() > 0 {
                profiler.reset();
            }
        }
        info!(
            frames = self.frames,
            seconds = self.started.elapsed().as_secs_f64(),
            "benchmark finished"
        );
    }
}

fn window_title(config: &ConfigInfo, light_count: usize) -> String {
    match config.scene_file.as_deref() {
        Some(scene) => format!("lightbench - {scene} ({light_count} lights)"),
        None => format!("lightbench ({light_count} lights)"),
    }
}

fn is_escape(event: &KeyEvent) -> bool {
    event.state == ElementState::Pressed && matches!(event.logical_key, Key::Named(NamedKey::Escape))
}

/// Opens the window and renders until it is closed or a run limit is hit.
pub(crate) fn run(config: &ConfigInfo, lights: Vec<PointLight>) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let window = WindowBuilder::new()
        .with_title(window_title(config, lights.len()))
        .with_inner_size(PhysicalSize::new(config.width, config.height))
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create benchmark window: {err}"))?;
    let window = Arc::new(window);

    let mut state = BenchState::new(window, config, &lights)?;
    info!(
        lights = lights.len(),
        width = config.width,
        height = config.height,
        vsync = config.vsync,
        report_every = config.report_interval,
        "starting render loop"
    );

    let run_result = event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == state.window().id() => match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                elwt.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if is_escape(&event) {
                    elwt.exit();
                }
            }
            WindowEvent::Resized(new_size) => {
                state.resize(new_size);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                state.set_scale_factor(scale_factor);
            }
            WindowEvent::RedrawRequested => {
                match state.render_frame() {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        state.resize(state.gpu.size);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        tracing::error!("surface out of memory; exiting");
                        elwt.exit();
                    }
                    Err(wgpu::SurfaceError::Timeout) => {
                        warn!("surface timeout; retrying next frame");
                    }
                    Err(other) => {
                        warn!("surface error: {other:?}; retrying next frame");
                    }
                }
                if state.limits_reached() {
                    elwt.exit();
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            state.window().request_redraw();
            elwt.set_control_flow(ControlFlow::Poll);
        }
        Event::LoopExiting => {
            state.finish();
        }
        _ => {}
    });

    run_result.map_err(|err| anyhow!("window event loop error: {err}"))
}
