//! Ray-traced WebGPU scene pipeline
//!
//! Draws the whole lab in a fragment shader from a handful of buffers:
//! camera globals, particles, nuclei and trail points.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::camera::OrbitCamera;
use super::palette::STATUS_COLORS;
use crate::consts::*;
use crate::error::LabError;
use crate::settings::Settings;
use crate::sim::LabState;

/// Maximum number of trail points
const MAX_TRAIL: usize = MAX_PARTICLES * TRAIL_LENGTH;
/// Maximum number of nuclei
const MAX_NUCLEI: usize = 16;

const FLAG_CLOUD: u32 = 1;
const FLAG_STARS: u32 = 2;

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    resolution: [f32; 2],        // offset 0
    time: f32,                   // offset 8
    fov_scale: f32,              // offset 12 - tan(fov_y / 2)
    eye: [f32; 4],               // offset 16
    forward: [f32; 4],           // offset 32
    right: [f32; 4],             // offset 48
    up: [f32; 4],                // offset 64
    particle_count: u32,         // offset 80
    trail_count: u32,            // offset 84
    nucleus_count: u32,          // offset 88
    flags: u32,                  // offset 92 - bit0 clouds, bit1 stars
    status_colors: [[f32; 4]; 3], // offset 96
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ParticleData {
    pos: [f32; 3],
    status: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct NucleusData {
    pos: [f32; 3],
    radius: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct TrailData {
    pos: [f32; 3],
    alpha: f32,
    status: u32,
    _pad: [u32; 3], // Pad to 32 bytes for alignment
}

// ============================================================================
// SCENE RENDER STATE
// ============================================================================

pub struct SceneRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,

    globals_buffer: wgpu::Buffer,
    particles_buffer: wgpu::Buffer,
    nuclei_buffer: wgpu::Buffer,
    trail_buffer: wgpu::Buffer,

    bind_group: wgpu::BindGroup,

    pub size: (u32, u32),
    start_time: f64,
}

fn storage_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: true },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn storage_buffer<T>(device: &wgpu::Device, label: &str, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: (std::mem::size_of::<T>() * capacity) as u64,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

impl SceneRenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Result<Self, LabError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("scene-device"),
                required_features: wgpu::Features::empty(),
                // Fragment-stage storage buffers rule out the WebGL2 limits
                required_limits: wgpu::Limits::downlevel_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(LabError::MissingElement("surface format"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scene_shader.wgsl").into()),
        });

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&Globals::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let particles_buffer = storage_buffer::<ParticleData>(&device, "particles", MAX_PARTICLES);
        let nuclei_buffer = storage_buffer::<NucleusData>(&device, "nuclei", MAX_NUCLEI);
        let trail_buffer = storage_buffer::<TrailData>(&device, "trail", MAX_TRAIL);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                storage_entry(1),
                storage_entry(2),
                storage_entry(3),
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: particles_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: nuclei_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: trail_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[], // No vertex buffers - fullscreen triangle
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            globals_buffer,
            particles_buffer,
            nuclei_buffer,
            trail_buffer,
            bind_group,
            size: (width, height),
            start_time: 0.0,
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    pub fn set_start_time(&mut self, time: f64) {
        self.start_time = time;
    }

    /// Update GPU buffers from the lab and render one frame
    pub fn render(
        &mut self,
        state: &LabState,
        settings: &Settings,
        camera: &OrbitCamera,
        time: f64,
    ) -> Result<(), wgpu::SurfaceError> {
        // time is ms from requestAnimationFrame
        let elapsed = ((time - self.start_time) / 1000.0) as f32;

        let particles = pack_particles(state);
        let nuclei = pack_nuclei(state);
        let trail = pack_trail(state, settings.trail_points());

        let mut flags = 0;
        if settings.show_cloud {
            flags |= FLAG_CLOUD;
        }
        if settings.quality.starfield_enabled() {
            flags |= FLAG_STARS;
        }

        let (forward, right, up) = camera.basis();
        let eye = camera.eye();
        let globals = Globals {
            resolution: [self.size.0 as f32, self.size.1 as f32],
            time: elapsed,
            fov_scale: (camera.fov_y * 0.5).tan(),
            eye: eye.extend(1.0).to_array(),
            forward: forward.extend(0.0).to_array(),
            right: right.extend(0.0).to_array(),
            up: up.extend(0.0).to_array(),
            particle_count: particles.len() as u32,
            trail_count: trail.len() as u32,
            nucleus_count: nuclei.len() as u32,
            flags,
            status_colors: STATUS_COLORS,
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        // Empty slices are skipped; the counts above keep the shader in range
        if !particles.is_empty() {
            self.queue
                .write_buffer(&self.particles_buffer, 0, bytemuck::cast_slice(&particles));
        }
        if !nuclei.is_empty() {
            self.queue
                .write_buffer(&self.nuclei_buffer, 0, bytemuck::cast_slice(&nuclei));
        }
        if !trail.is_empty() {
            self.queue
                .write_buffer(&self.trail_buffer, 0, bytemuck::cast_slice(&trail));
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
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
                multiview_mask: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.draw(0..3, 0..1); // Fullscreen triangle
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn pack_particles(state: &LabState) -> Vec<ParticleData> {
    state
        .particles
        .iter()
        .take(MAX_PARTICLES)
        .map(|p| ParticleData {
            pos: p.pos.to_array(),
            status: p.status.as_index(),
        })
        .collect()
}

fn pack_nuclei(state: &LabState) -> Vec<NucleusData> {
    state
        .nuclei
        .iter()
        .take(MAX_NUCLEI)
        .map(|n| NucleusData {
            pos: n.to_array(),
            radius: NUCLEUS_RADIUS,
        })
        .collect()
}

/// Newest points first, fading toward the tail
fn pack_trail(state: &LabState, points_per_particle: usize) -> Vec<TrailData> {
    let mut trail = Vec::new();
    for particle in &state.particles {
        let len = particle.trail.len().min(points_per_particle);
        for (i, pos) in particle.trail.iter().take(len).enumerate() {
            if trail.len() >= MAX_TRAIL {
                return trail;
            }
            trail.push(TrailData {
                pos: pos.to_array(),
                alpha: 1.0 - i as f32 / len.max(1) as f32,
                status: particle.status.as_index(),
                _pad: [0; 3],
            });
        }
    }
    trail
}
