//! Presentation of the composited canvas in baseview
//!
//! The engine rasterizes on the CPU, so each frame is a plain RGBA buffer.
//! It is uploaded into a texture and drawn to the window surface with a
//! fullscreen blit.

use std::sync::Arc;
use vello::wgpu;
use wgpu::{
    BindGroupDescriptor, BindGroupEntry, BindGroupLayout, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingResource, BindingType, BlendState, ColorTargetState,
    ColorWrites, CompositeAlphaMode, Device, DeviceDescriptor, Extent3d, Features, FragmentState,
    Instance, InstanceDescriptor, Limits, MultisampleState, Origin3d, PipelineLayoutDescriptor,
    PresentMode, PrimitiveState, Queue, RenderPipeline, RenderPipelineDescriptor, Sampler,
    SamplerBindingType, SamplerDescriptor, ShaderModuleDescriptor, ShaderSource, ShaderStages,
    Surface, SurfaceConfiguration, TexelCopyBufferLayout, TexelCopyTextureInfo, Texture,
    TextureAspect, TextureDescriptor, TextureDimension, TextureFormat, TextureSampleType,
    TextureUsages, TextureView, TextureViewDescriptor, TextureViewDimension, VertexState,
};

use crate::compositor::Canvas;

/// Format of the uploaded canvas
const CANVAS_FORMAT: TextureFormat = TextureFormat::Rgba8Unorm;

/// GPU presentation context for the view's canvas
pub struct RenderContext {
    device: Arc<Device>,
    queue: Arc<Queue>,
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,
    // Canvas upload target, recreated when the canvas size changes
    canvas_texture: Texture,
    canvas_view: TextureView,
    canvas_size: (u32, u32),
    blit_pipeline: RenderPipeline,
    blit_bind_group_layout: BindGroupLayout,
    blit_sampler: Sampler,
}

impl RenderContext {
    /// Create a new presentation context for a window
    ///
    /// # Safety
    ///
    /// The window handle must remain valid for the lifetime of this context.
    pub unsafe fn new<W>(window: &W, width: u32, height: u32) -> Result<Self, RenderError>
    where
        W: raw_window_handle::HasRawWindowHandle + raw_window_handle::HasRawDisplayHandle,
    {
        let instance = Instance::new(&InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let target = wgpu::SurfaceTargetUnsafe::RawHandle {
            raw_display_handle: display_handle(window.raw_display_handle())?,
            raw_window_handle: window_handle(window.raw_window_handle())?,
        };
        let surface = instance
            .create_surface_unsafe(target)
            .map_err(|e| RenderError::Surface(e.to_string()))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|e| RenderError::Device(format!("Adapter request failed: {:?}", e)))?;

        let (device, queue) = pollster::block_on(adapter.request_device(&DeviceDescriptor {
            required_features: Features::empty(),
            required_limits: Limits::downlevel_defaults(),
            label: Some("htmlview_baseview"),
            memory_hints: wgpu::MemoryHints::default(),
            ..Default::default()
        }))
        .map_err(|e| RenderError::Device(format!("{:?}", e)))?;

        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let caps = surface.get_capabilities(&adapter);
        // Canvas bytes are already sRGB encoded
        let surface_format = caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .unwrap_or(TextureFormat::Bgra8Unorm);

        let width = width.max(1);
        let height = height.max(1);

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: PresentMode::AutoVsync,
            alpha_mode: CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let (canvas_texture, canvas_view) = create_canvas_texture(&device, width, height);
        let (blit_pipeline, blit_bind_group_layout, blit_sampler) =
            create_blit_pipeline(&device, surface_format);

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            canvas_texture,
            canvas_view,
            canvas_size: (width, height),
            blit_pipeline,
            blit_bind_group_layout,
            blit_sampler,
        })
    }

    /// Resize the window surface
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface_config.width = width.max(1);
        self.surface_config.height = height.max(1);
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Upload the canvas and present it
    pub fn present(&mut self, canvas: &Canvas) -> Result<(), RenderError> {
        let size = canvas.size();
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }

        if self.canvas_size != (size.width, size.height) {
            let (texture, view) = create_canvas_texture(&self.device, size.width, size.height);
            self.canvas_texture = texture;
            self.canvas_view = view;
            self.canvas_size = (size.width, size.height);
        }

        self.queue.write_texture(
            TexelCopyTextureInfo {
                texture: &self.canvas_texture,
                mip_level: 0,
                origin: Origin3d::ZERO,
                aspect: TextureAspect::All,
            },
            canvas.pixels(),
            TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(size.width * 4),
                rows_per_image: Some(size.height),
            },
            Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
        );

        let frame = self
            .surface
            .get_current_texture()
            .map_err(|e| RenderError::Surface(e.to_string()))?;
        let frame_view = frame.texture.create_view(&TextureViewDescriptor::default());

        let bind_group = self.device.create_bind_group(&BindGroupDescriptor {
            label: Some("canvas_bind_group"),
            layout: &self.blit_bind_group_layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::TextureView(&self.canvas_view),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::Sampler(&self.blit_sampler),
                },
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("canvas_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("canvas_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame_view,
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

            pass.set_pipeline(&self.blit_pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        Ok(())
    }
}

fn create_canvas_texture(device: &Device, width: u32, height: u32) -> (Texture, TextureView) {
    let texture = device.create_texture(&TextureDescriptor {
        label: Some("canvas"),
        size: Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: CANVAS_FORMAT,
        usage: TextureUsages::COPY_DST | TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });

    let view = texture.create_view(&TextureViewDescriptor::default());
    (texture, view)
}

fn create_blit_pipeline(
    device: &Device,
    target_format: TextureFormat,
) -> (RenderPipeline, BindGroupLayout, Sampler) {
    // Oversized triangle covering the viewport; texels are fetched 1:1
    let shader_source = r#"
        @group(0) @binding(0) var canvas: texture_2d<f32>;
        @group(0) @binding(1) var canvas_sampler: sampler;

        struct VertexOutput {
            @builtin(position) position: vec4<f32>,
            @location(0) uv: vec2<f32>,
        }

        @vertex
        fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
            var out: VertexOutput;
            let x = f32(i32(vertex_index) / 2) * 4.0 - 1.0;
            let y = f32(i32(vertex_index) % 2) * 4.0 - 1.0;
            out.position = vec4<f32>(x, y, 0.0, 1.0);
            out.uv = vec2<f32>((x + 1.0) * 0.5, (1.0 - y) * 0.5);
            return out;
        }

        @fragment
        fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
            return textureSample(canvas, canvas_sampler, in.uv);
        }
    "#;

    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("canvas_shader"),
        source: ShaderSource::Wgsl(shader_source.into()),
    });

    let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("canvas_bind_group_layout"),
        entries: &[
            BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::FRAGMENT,
                ty: BindingType::Texture {
                    sample_type: TextureSampleType::Float { filterable: true },
                    view_dimension: TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            BindGroupLayoutEntry {
                binding: 1,
                visibility: ShaderStages::FRAGMENT,
                ty: BindingType::Sampler(SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });

    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("canvas_pipeline_layout"),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("canvas_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState {
                format: target_format,
                blend: Some(BlendState::REPLACE),
                write_mask: ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: PrimitiveState::default(),
        depth_stencil: None,
        multisample: MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    let sampler = device.create_sampler(&SamplerDescriptor {
        label: Some("canvas_sampler"),
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    });

    (pipeline, bind_group_layout, sampler)
}

/// Errors that can occur while presenting
#[derive(Debug)]
pub enum RenderError {
    Device(String),
    Surface(String),
    UnsupportedHandle(&'static str),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Device(e) => write!(f, "Device error: {}", e),
            Self::Surface(e) => write!(f, "Surface error: {}", e),
            Self::UnsupportedHandle(kind) => write!(f, "Unsupported {} handle", kind),
        }
    }
}

impl std::error::Error for RenderError {}

/// Bridge a raw-window-handle 0.5 display handle to the 0.6 type wgpu takes
fn display_handle(
    handle: raw_window_handle::RawDisplayHandle,
) -> Result<wgpu::rwh::RawDisplayHandle, RenderError> {
    use raw_window_handle::RawDisplayHandle as Rwh05;
    use wgpu::rwh::RawDisplayHandle as Rwh06;

    let converted = match handle {
        #[cfg(target_os = "macos")]
        Rwh05::AppKit(_) => Rwh06::AppKit(wgpu::rwh::AppKitDisplayHandle::new()),

        #[cfg(target_os = "linux")]
        Rwh05::Xlib(h) => Rwh06::Xlib(wgpu::rwh::XlibDisplayHandle::new(
            std::ptr::NonNull::new(h.display),
            h.screen,
        )),

        #[cfg(target_os = "linux")]
        Rwh05::Xcb(h) => Rwh06::Xcb(wgpu::rwh::XcbDisplayHandle::new(
            std::ptr::NonNull::new(h.connection),
            h.screen,
        )),

        #[cfg(target_os = "linux")]
        Rwh05::Wayland(h) => {
            let display = std::ptr::NonNull::new(h.display)
                .ok_or(RenderError::UnsupportedHandle("null Wayland display"))?;
            Rwh06::Wayland(wgpu::rwh::WaylandDisplayHandle::new(display))
        }

        #[cfg(target_os = "windows")]
        Rwh05::Windows(_) => Rwh06::Windows(wgpu::rwh::WindowsDisplayHandle::new()),

        _ => return Err(RenderError::UnsupportedHandle("display")),
    };
    Ok(converted)
}

/// Bridge a raw-window-handle 0.5 window handle to the 0.6 type wgpu takes
fn window_handle(
    handle: raw_window_handle::RawWindowHandle,
) -> Result<wgpu::rwh::RawWindowHandle, RenderError> {
    use raw_window_handle::RawWindowHandle as Rwh05;
    use wgpu::rwh::RawWindowHandle as Rwh06;

    let converted = match handle {
        #[cfg(target_os = "macos")]
        Rwh05::AppKit(h) => {
            let view = std::ptr::NonNull::new(h.ns_view)
                .ok_or(RenderError::UnsupportedHandle("null NSView"))?;
            Rwh06::AppKit(wgpu::rwh::AppKitWindowHandle::new(view))
        }

        #[cfg(target_os = "linux")]
        Rwh05::Xlib(h) => Rwh06::Xlib(wgpu::rwh::XlibWindowHandle::new(h.window)),

        #[cfg(target_os = "linux")]
        Rwh05::Xcb(h) => {
            let window = std::num::NonZeroU32::new(h.window)
                .ok_or(RenderError::UnsupportedHandle("null XCB window"))?;
            Rwh06::Xcb(wgpu::rwh::XcbWindowHandle::new(window))
        }

        #[cfg(target_os = "linux")]
        Rwh05::Wayland(h) => {
            let surface = std::ptr::NonNull::new(h.surface)
                .ok_or(RenderError::UnsupportedHandle("null Wayland surface"))?;
            Rwh06::Wayland(wgpu::rwh::WaylandWindowHandle::new(surface))
        }

        #[cfg(target_os = "windows")]
        Rwh05::Win32(h) => {
            let hwnd = std::num::NonZeroIsize::new(h.hwnd as isize)
                .ok_or(RenderError::UnsupportedHandle("null HWND"))?;
            let mut converted = wgpu::rwh::Win32WindowHandle::new(hwnd);
            converted.hinstance = std::num::NonZeroIsize::new(h.hinstance as isize);
            Rwh06::Win32(converted)
        }

        _ => return Err(RenderError::UnsupportedHandle("window")),
    };
    Ok(converted)
}
