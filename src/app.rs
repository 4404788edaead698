//! Window, context and the render loop.
//!
//! The context is created once and outlives every GPU object: [`Demo`] declares the scene before
//! the context, so the scene's handles are deleted while the context is still current.

use std::ffi::CStr;
use std::os::raw::c_char;

use gl::types::*;
use glam::{Mat4, Vec4};
use glutin::dpi::{LogicalSize, PhysicalSize};
use glutin::event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent};
use glutin::event_loop::{ControlFlow, EventLoop};
use glutin::platform::run_return::EventLoopExtRunReturn;
use glutin::window::WindowBuilder;
use glutin::{Api, ContextBuilder, GlProfile, GlRequest, PossiblyCurrent, WindowedContext};

use crate::config::Config;
use crate::error::Result;
use crate::gl_call;
use crate::graphics::{
    IndexBuffer, Renderer, Shader, Texture, TextureError, VertexArray, VertexBuffer,
    VertexBufferLayout,
};

#[rustfmt::skip]
const QUAD_VERTICES: [f32; 16] = [
    // Position     Texture
    -0.5, -0.5,     0.0, 0.0,
     0.5, -0.5,     1.0, 0.0,
     0.5,  0.5,     1.0, 1.0,
    -0.5,  0.5,     0.0, 1.0,
];

#[rustfmt::skip]
const QUAD_INDICES: [u32; 6] = [
    0, 1, 2,
    2, 3, 0,
];

const CLEAR_COLOR: Vec4 = Vec4::new(0.1, 0.1, 0.12, 1.0);
const TEXTURE_SLOT: u32 = 0;
const COLOR_STEP: f32 = 0.05;

/// Everything drawn each frame.
struct Scene {
    vertex_array: VertexArray,
    // Only read through the vertex array, but has to outlive it.
    #[allow(dead_code)]
    vertex_buffer: VertexBuffer,
    index_buffer: IndexBuffer,
    shader: Shader,
    texture: Option<Texture>,
    projection: Mat4,
    red: f32,
    increment: f32,
}

impl Scene {
    fn new(config: &Config, size: PhysicalSize<u32>) -> Result<Self> {
        let vertex_array = VertexArray::new()?;
        let vertex_buffer = VertexBuffer::new(&QUAD_VERTICES)?;
        let layout = VertexBufferLayout::new().with::<f32>(2).with::<f32>(2);
        vertex_array.add_buffer(&vertex_buffer, &layout)?;

        // Created while the vertex array is bound, so the array keeps it.
        let index_buffer = IndexBuffer::new(&QUAD_INDICES)?;

        let shader = Shader::from_file(&config.shader)?;
        let texture = match config.texture_path().map(Texture::new) {
            None => None,
            Some(Ok(texture)) => Some(texture),
            Some(Err(error @ TextureError::Gl(_))) => return Err(error.into()),
            Some(Err(error)) => {
                log::warn!("{}; drawing without a texture", error);
                None
            }
        };

        shader.bind()?;
        shader.set_uniform_1i("u_Texture", TEXTURE_SLOT as i32)?;
        shader.set_uniform_1i("u_UseTexture", texture.is_some() as i32)?;

        // The array goes first, otherwise unbinding the index buffer would detach it from the array.
        vertex_array.unbind()?;
        vertex_buffer.unbind()?;
        index_buffer.unbind()?;
        shader.unbind()?;

        Ok(Self {
            vertex_array,
            vertex_buffer,
            index_buffer,
            shader,
            texture,
            projection: projection(size),
            red: 0.0,
            increment: COLOR_STEP,
        })
    }

    /// Bounces the red channel between 0 and 1.
    fn update(&mut self) {
        if self.red > 1.0 {
            self.increment = -COLOR_STEP;
        } else if self.red < 0.0 {
            self.increment = COLOR_STEP;
        }
        self.red += self.increment;
    }

    fn draw(&self, renderer: &Renderer) -> Result<()> {
        self.shader.bind()?;
        self.shader.set_uniform_4f("u_Color", Vec4::new(self.red, 0.3, 0.8, 1.0))?;
        self.shader.set_uniform_mat4f("u_MVP", &self.projection)?;

        if let Some(texture) = &self.texture {
            texture.bind(TEXTURE_SLOT)?;
        }

        renderer.draw(&self.vertex_array, &self.index_buffer, &self.shader)?;
        Ok(())
    }
}

/// Keeps the quad square whatever the window's aspect ratio.
fn projection(size: PhysicalSize<u32>) -> Mat4 {
    let aspect = size.width.max(1) as f32 / size.height.max(1) as f32;
    Mat4::orthographic_rh_gl(-aspect, aspect, -1.0, 1.0, -1.0, 1.0)
}

struct Demo {
    // Field order is drop order: the scene must go before the context.
    scene: Scene,
    renderer: Renderer,
    context: WindowedContext<PossiblyCurrent>,
}

impl Demo {
    fn frame(&mut self) -> Result<()> {
        self.renderer.clear()?;
        self.scene.update();
        self.scene.draw(&self.renderer)?;
        self.context.swap_buffers()?;
        Ok(())
    }

    fn resize(&mut self, size: PhysicalSize<u32>) -> Result<()> {
        // Minimized.
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }

        self.context.resize(size);
        gl_call!(gl::Viewport(0, 0, size.width as GLsizei, size.height as GLsizei))?;
        self.scene.projection = projection(size);
        Ok(())
    }
}

fn gl_string(name: GLenum) -> String {
    let ptr = unsafe { gl::GetString(name) };
    if ptr.is_null() {
        return String::from("unknown");
    }

    unsafe { CStr::from_ptr(ptr as *const c_char) }
        .to_string_lossy()
        .into_owned()
}

/// Opens the window and renders until it is closed or a frame fails.
pub fn run(config: &Config) -> Result<()> {
    let mut events = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(&config.title)
        .with_inner_size(LogicalSize::new(config.width, config.height));
    let context = ContextBuilder::new()
        .with_gl(GlRequest::Specific(Api::OpenGl, (3, 3)))
        .with_gl_profile(GlProfile::Core)
        .with_vsync(config.vsync)
        .build_windowed(window, &events)?;

    let context = unsafe { context.make_current() }.map_err(|(_, error)| error)?;
    gl::load_with(|symbol| context.get_proc_address(symbol) as *const _);

    log::info!("OpenGL {}", gl_string(gl::VERSION));
    log::info!("renderer: {}", gl_string(gl::RENDERER));

    gl_call!(gl::Enable(gl::BLEND))?;
    gl_call!(gl::BlendFunc(gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA))?;

    let renderer = Renderer::new();
    renderer.set_clear_color(CLEAR_COLOR)?;

    let size = context.window().inner_size();
    let mut demo = Demo {
        scene: Scene::new(config, size)?,
        renderer,
        context,
    };

    let mut outcome = Ok(());
    let exit_code = events.run_return(|event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        let step = match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested
                | WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state: ElementState::Pressed,
                            virtual_keycode: Some(VirtualKeyCode::Escape),
                            ..
                        },
                    ..
                } => {
                    *control_flow = ControlFlow::Exit;
                    Ok(())
                }
                WindowEvent::Resized(size) => demo.resize(size),
                _ => Ok(()),
            },
            Event::MainEventsCleared => {
                demo.context.window().request_redraw();
                Ok(())
            }
            Event::RedrawRequested(_) => demo.frame(),
            _ => Ok(()),
        };

        if let Err(error) = step {
            outcome = Err(error);
            *control_flow = ControlFlow::Exit;
        }
    });

    log::debug!("event loop exited with code {}", exit_code);
    drop(demo);
    outcome
}
