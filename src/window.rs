//! On-screen presentation of a framebuffer via SDL2.
//!
//! SDL is used strictly as a blit target and input source: the engine
//! renders into a [`Framebuffer`] and the [`Window`] uploads the finished
//! buffer to a streaming texture each frame. The contract is
//! `present(framebuffer) -> continue | quit`, with SDL failures surfacing
//! as the error case.

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::rect::Rect;

use crate::framebuffer::Framebuffer;

/// Control signal returned from [`Window::present`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Keep running; draw the next frame.
    Continue,
    /// The user closed the window or pressed Escape.
    Quit,
}

/// Fixed-rate frame pacing for the demo loop.
pub struct FrameLimiter {
    target_frame_ms: u64,
    previous_frame_time: u64,
}

impl FrameLimiter {
    pub fn new(window: &Window, target_fps: u64) -> Self {
        Self {
            target_frame_ms: 1000 / target_fps.max(1),
            previous_frame_time: window.timer().ticks64(),
        }
    }

    /// Waits if necessary to maintain the frame rate and returns the delta
    /// time in milliseconds since the previous call.
    pub fn wait_and_get_delta(&mut self, window: &Window) -> u64 {
        let mut current_time = window.timer().ticks64();
        let mut delta_time = current_time - self.previous_frame_time;

        if delta_time < self.target_frame_ms {
            let time_to_wait = self.target_frame_ms - delta_time;
            std::thread::sleep(std::time::Duration::from_millis(time_to_wait));
            current_time = window.timer().ticks64();
            delta_time = current_time - self.previous_frame_time;
        }

        self.previous_frame_time = current_time;
        delta_time
    }
}

/// An SDL2-backed presentation surface.
pub struct Window {
    canvas: sdl2::render::Canvas<sdl2::video::Window>,
    // Held only to keep the texture's creator alive for the window's lifetime.
    _texture_creator: Box<sdl2::render::TextureCreator<sdl2::video::WindowContext>>,
    texture: sdl2::render::Texture<'static>,
    event_pump: sdl2::EventPump,
    timer_subsystem: sdl2::TimerSubsystem,
    scratch: Vec<u8>,
    width: u32,
    height: u32,
}

impl Window {
    /// Opens a window sized to the framebuffer it will present.
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;
        let timer_subsystem = sdl_context.timer()?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;

        let canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
        let texture_creator = Box::new(canvas.texture_creator());
        let event_pump = sdl_context.event_pump()?;

        // SAFETY: texture_creator is heap-allocated and lives as long as Window.
        // We ensure texture is dropped before texture_creator by struct field order.
        let texture_creator_ref: &'static sdl2::render::TextureCreator<sdl2::video::WindowContext> =
            unsafe { &*(texture_creator.as_ref() as *const _) };
        let texture = texture_creator_ref
            .create_texture_streaming(PixelFormatEnum::ARGB8888, width, height)
            .map_err(|e| e.to_string())?;

        Ok(Self {
            canvas,
            _texture_creator: texture_creator,
            texture,
            event_pump,
            timer_subsystem,
            scratch: Vec::new(),
            width,
            height,
        })
    }

    /// Uploads and displays the framebuffer, then polls pending input.
    ///
    /// The framebuffer dimensions must match the window's.
    pub fn present(&mut self, fb: &Framebuffer) -> Result<Signal, String> {
        if fb.width() != self.width || fb.height() != self.height {
            return Err(format!(
                "framebuffer {}x{} does not match window {}x{}",
                fb.width(),
                fb.height(),
                self.width,
                self.height
            ));
        }

        let mut scratch = std::mem::take(&mut self.scratch);
        fb.to_argb8888(&mut scratch);
        let result = self
            .texture
            .update(None, &scratch, (self.width * 4) as usize)
            .map_err(|e| e.to_string());
        self.scratch = scratch;
        result?;

        self.canvas.clear();
        self.canvas.copy(
            &self.texture,
            None,
            Some(Rect::new(0, 0, self.width, self.height)),
        )?;
        self.canvas.present();

        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => return Ok(Signal::Quit),
                _ => {}
            }
        }
        Ok(Signal::Continue)
    }

    /// Current mouse position normalized to `[0,1] x [0,1]`.
    pub fn pointer(&self) -> (f32, f32) {
        let state = self.event_pump.mouse_state();
        let x = (state.x() as f32 / self.width as f32).clamp(0.0, 1.0);
        let y = (state.y() as f32 / self.height as f32).clamp(0.0, 1.0);
        (x, y)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn timer(&self) -> &sdl2::TimerSubsystem {
        &self.timer_subsystem
    }
}
