use wgpu::*;
use glam::Mat4;

use crate::model::{GameScene, SpriteCatalog};
use crate::view::layout::{css_to_canvas, fit_canvas};

/// Upper limit on bodies drawn per frame
pub const MAX_SPRITES: usize = 256;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
}

/// One tinted quad, in logical canvas pixels
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpriteInstance {
    pub center: [f32; 2],
    pub half_extents: [f32; 2],
    pub color: [f32; 4],
}

/// Maps the logical canvas (origin top-left, y down) onto clip space
pub fn canvas_projection(width: f32, height: f32) -> Mat4 {
    Mat4::orthographic_rh(0.0, width, height, 0.0, -1.0, 1.0)
}

/// Build the draw list for the scene's bodies. The player flickers between
/// two shades following its swim animation.
pub fn sprite_instances(scene: &GameScene, sprites: &SpriteCatalog) -> Vec<SpriteInstance> {
    let player_frame = scene.player_frame();
    scene
        .physics
        .bodies()
        .take(MAX_SPRITES)
        .map(|(id, body)| {
            let mut color = sprites.tint(&body.sprite_key);
            if id == scene.player && player_frame == 1 {
                for c in color.iter_mut().take(3) {
                    *c = (*c * 1.15).min(1.0);
                }
            }
            SpriteInstance {
                center: body.position.to_array(),
                half_extents: body.half_extents.to_array(),
                color,
            }
        })
        .collect()
}

/// Centered area of a `surface` sized target that shows the whole canvas
/// at its own aspect ratio
pub fn letterbox_viewport(surface: (u32, u32), canvas_size: (f32, f32)) -> [f32; 4] {
    let (sw, sh) = (surface.0 as f64, surface.1 as f64);
    let (w, h) = fit_canvas(sw, sh, canvas_size.0 as f64, canvas_size.1 as f64);
    let (w, h) = (w.min(sw), h.min(sh));
    [((sw - w) / 2.0) as f32, ((sh - h) / 2.0) as f32, w as f32, h as f32]
}

pub fn create_scene_resources(device: &Device) -> (Buffer, BindGroupLayout, BindGroup) {
    let scene_buffer = device.create_buffer(&BufferDescriptor {
        label: Some("scene_buffer"),
        size: std::mem::size_of::<SceneUniform>() as BufferAddress,
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("scene_bind_group_layout"),
        entries: &[BindGroupLayoutEntry {
            binding: 0,
            visibility: ShaderStages::VERTEX,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    });

    let bind_group = device.create_bind_group(&BindGroupDescriptor {
        label: Some("scene_bind_group"),
        layout: &bind_group_layout,
        entries: &[BindGroupEntry { binding: 0, resource: scene_buffer.as_entire_binding() }],
    });

    (scene_buffer, bind_group_layout, bind_group)
}

pub fn create_sprite_pipeline(device: &Device, format: TextureFormat, bind_group_layout: &BindGroupLayout) -> RenderPipeline {
    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("sprite_shader"),
        source: ShaderSource::Wgsl(include_str!("shaders/sprite.wgsl").into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("sprite_pipeline_layout"),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("sprite_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[VertexBufferLayout {
                array_stride: std::mem::size_of::<SpriteInstance>() as BufferAddress,
                step_mode: VertexStepMode::Instance,
                attributes: &[
                    VertexAttribute { offset: 0, shader_location: 0, format: VertexFormat::Float32x2 },
                    VertexAttribute { offset: 8, shader_location: 1, format: VertexFormat::Float32x2 },
                    VertexAttribute { offset: 16, shader_location: 2, format: VertexFormat::Float32x4 },
                ],
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState { format, blend: Some(BlendState::ALPHA_BLENDING), write_mask: ColorWrites::ALL })],
            compilation_options: Default::default(),
        }),
        primitive: PrimitiveState {
            topology: PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: FrontFace::Ccw,
            // the y-down projection flips winding, so draw both faces
            cull_mode: None,
            polygon_mode: PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    })
}

///////////////////////////////////////////////////////////////////////////////

/// Consolidated render state to avoid parameter explosion
pub struct RenderState {
    // wgpu resources
    pub format: TextureFormat,
    pub alpha_mode: CompositeAlphaMode,
    pub width: u32,
    pub height: u32,

    pub pipeline: RenderPipeline,
    pub scene_buffer: Buffer,
    pub scene_bind_group: BindGroup,
    pub instance_buffer: Buffer,
    pub instances: Vec<SpriteInstance>,
    pub clear_color: Color,
    /// Logical size of the play field
    pub canvas_size: (f32, f32),
    /// Letterboxed area of the surface the play field is drawn into: x, y, w, h
    pub viewport: [f32; 4],

    // UI
    pub egui_renderer: egui_wgpu::Renderer,
    pub egui_primitives: Option<Vec<egui::ClippedPrimitive>>,
    pub egui_full_output: Option<egui::FullOutput>,
    pub egui_dpr: f32,
}

impl RenderState {
    pub fn new(
        device: &Device,
        queue: &Queue,
        format: TextureFormat,
        alpha_mode: CompositeAlphaMode,
        width: u32,
        height: u32,
        canvas_size: (f32, f32),
        clear_tint: [f32; 4],
    ) -> Self {
        let (scene_buffer, bind_group_layout, scene_bind_group) = create_scene_resources(device);
        let pipeline = create_sprite_pipeline(device, format, &bind_group_layout);

        let uniform = SceneUniform {
            view_proj: canvas_projection(canvas_size.0, canvas_size.1).to_cols_array_2d(),
        };
        queue.write_buffer(&scene_buffer, 0, bytemuck::bytes_of(&uniform));

        let instance_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("sprite_instances"),
            size: (MAX_SPRITES * std::mem::size_of::<SpriteInstance>()) as BufferAddress,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let egui_renderer = egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default());

        let mut state = Self {
            format,
            alpha_mode,
            width,
            height,
            pipeline,
            scene_buffer,
            scene_bind_group,
            instance_buffer,
            instances: Vec::new(),
            clear_color: Color {
                r: clear_tint[0] as f64,
                g: clear_tint[1] as f64,
                b: clear_tint[2] as f64,
                a: clear_tint[3] as f64,
            },
            egui_renderer,
            egui_primitives: None,
            egui_full_output: None,
            egui_dpr: 1.0,
            canvas_size,
            viewport: [0.0, 0.0, width as f32, height as f32],
        };
        state.update_viewport();
        state
    }

    fn update_viewport(&mut self) {
        self.viewport = letterbox_viewport((self.width, self.height), self.canvas_size);
    }

    /// Map a position on the surface (physical pixels) into canvas coordinates
    pub fn surface_to_canvas(&self, x: f32, y: f32) -> (f32, f32) {
        let [vx, vy, vw, vh] = self.viewport;
        let (cx, cy) = css_to_canvas(
            ((x - vx) as f64, (y - vy) as f64),
            (vw as f64, vh as f64),
            (self.canvas_size.0 as f64, self.canvas_size.1 as f64),
        );
        (cx as f32, cy as f32)
    }

    pub fn surface_config(&self) -> SurfaceConfiguration {
        SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: self.format,
            width: self.width,
            height: self.height,
            present_mode: PresentMode::Fifo,
            alpha_mode: self.alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    pub fn resize(&mut self, device: &Device, surface: &Surface, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.width = width;
        self.height = height;
        self.update_viewport();
        surface.configure(device, &self.surface_config());
    }

    pub fn draw_frame(&mut self, device: &Device, queue: &Queue, surface: &Surface) {
        let frame = match surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                surface.configure(device, &self.surface_config());
                return;
            }
            Err(e) => {
                tracing::warn!("surface error: {e:?}");
                return;
            }
        };

        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("encoder"),
        });

        let count = self.instances.len().min(MAX_SPRITES);
        if count > 0 {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&self.instances[..count]));
        }

        {
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("sprite_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(self.clear_color),
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if count > 0 {
                let [vx, vy, vw, vh] = self.viewport;
                rp.set_viewport(vx, vy, vw, vh, 0.0, 1.0);
                rp.set_pipeline(&self.pipeline);
                rp.set_bind_group(0, &self.scene_bind_group, &[]);
                rp.set_vertex_buffer(0, self.instance_buffer.slice(..));
                rp.draw(0..6, 0..count as u32);
            }
        }

        if let (Some(egui_primitives), Some(egui_full_output)) =
            (self.egui_primitives.take(), self.egui_full_output.take())
        {
            let screen_descriptor = egui_wgpu::ScreenDescriptor {
                size_in_pixels: [self.width, self.height],
                pixels_per_point: self.egui_dpr,
            };

            // Upload egui textures
            for (id, image_delta) in &egui_full_output.textures_delta.set {
                self.egui_renderer.update_texture(device, queue, *id, image_delta);
            }
            self.egui_renderer
                .update_buffers(device, queue, &mut encoder, &egui_primitives, &screen_descriptor);

            // Render egui overlay
            {
                let egui_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                    label: Some("egui_render_pass"),
                    color_attachments: &[Some(RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: Operations {
                            load: LoadOp::Load,
                            store: StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });

                self.egui_renderer
                    .render(&mut egui_pass.forget_lifetime(), &egui_primitives, &screen_descriptor);
            }

            for id in &egui_full_output.textures_delta.free {
                self.egui_renderer.free_texture(id);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Level;
    use crate::controller::InputSample;
    use crate::model::Assets;
    use glam::Vec4;

    #[test]
    fn test_projection_corners() {
        let proj = canvas_projection(1920.0, 1080.0);
        let top_left = proj * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let bottom_right = proj * Vec4::new(1920.0, 1080.0, 0.0, 1.0);
        assert!((top_left.x + 1.0).abs() < 1e-5 && (top_left.y - 1.0).abs() < 1e-5);
        assert!((bottom_right.x - 1.0).abs() < 1e-5 && (bottom_right.y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_instances_follow_bodies() {
        let assets = Assets::preload().unwrap();
        let mut scene = GameScene::create(&assets, &Level::builtin().unwrap()).unwrap();
        for _ in 0..70 {
            scene.update(1000.0 / 60.0, &InputSample::default());
        }
        let instances = sprite_instances(&scene, &assets.sprites);
        assert_eq!(instances.len(), 2, "player plus the first rock");
        assert_eq!(instances[0].center, [300.0, 540.0]);
        assert_eq!(instances[1].color, assets.sprites.tint("rockObstacle"));
    }

    #[test]
    fn test_letterbox_viewport_centers_canvas() {
        assert_eq!(letterbox_viewport((1920, 1080), (1920.0, 1080.0)), [0.0, 0.0, 1920.0, 1080.0]);
        // 4:3 window: bars above and below
        assert_eq!(letterbox_viewport((1280, 960), (1920.0, 1080.0)), [0.0, 120.0, 1280.0, 720.0]);
        // ultra wide: bars left and right
        assert_eq!(letterbox_viewport((2000, 540), (1920.0, 1080.0)), [520.0, 0.0, 960.0, 540.0]);
    }

    #[test]
    fn test_instance_layout_matches_attributes() {
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 32);
    }
}
