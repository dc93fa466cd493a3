//! Demo driver: renders the sample scene into a window, or to a PPM file
//! with `--export <path>`.

use rastr::prelude::*;

const WINDOW_WIDTH: u32 = 1280;
const WINDOW_HEIGHT: u32 = 720;
const FPS: u64 = 60;
const TRIANGLE_COUNT: usize = 25;

/// Xorshift PRNG for the random triangle scene. The rasterization core
/// never consumes randomness; this lives entirely in the demo.
struct Xorshift(u64);

impl Xorshift {
    fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }
}

/// One translucent triangle of the random background scene.
struct SceneTriangle {
    points: [Vec2; 3],
    color: Rgba,
}

fn random_scene(rng: &mut Xorshift) -> (Rgba, Vec<SceneTriangle>) {
    let background = Rgba::new(
        rng.next_f32() * 0.3,
        rng.next_f32() * 0.3,
        rng.next_f32() * 0.3,
        1.0,
    );
    let triangles = (0..TRIANGLE_COUNT)
        .map(|_| SceneTriangle {
            points: [
                Vec2::new(rng.next_f32(), rng.next_f32()),
                Vec2::new(rng.next_f32(), rng.next_f32()),
                Vec2::new(rng.next_f32(), rng.next_f32()),
            ],
            color: Rgba::new(
                rng.next_f32(),
                rng.next_f32(),
                rng.next_f32(),
                0.5 + 0.5 * rng.next_f32(),
            ),
        })
        .collect();
    (background, triangles)
}

/// Draws one full frame: random triangle backdrop, curve/point overlay,
/// and the depth-tested spinning cube.
fn render_frame(
    fb: &mut Framebuffer,
    background: Rgba,
    triangles: &[SceneTriangle],
    cube: &Mesh,
    angle: (f32, f32),
) -> Result<(), BoundsError> {
    fb.set_flags(DrawFlags::none());
    fb.fill(background);

    // Translucent 2D backdrop.
    fb.set_flags(DrawFlags {
        alpha: true,
        ..DrawFlags::none()
    });
    for tri in triangles {
        fb.draw_polygon(&tri.points, tri.color);
    }
    fb.draw_bezier(
        Vec2::new(0.1, 0.9),
        Vec2::new(0.5, 0.1),
        Vec2::new(0.9, 0.9),
        Rgba::WHITE,
    );
    fb.draw_line(Vec2::new(0.1, 0.1), Vec2::new(0.9, 0.1), Rgba::WHITE);
    fb.draw_point(Vec2::new(0.5, 0.5), 0.01, Rgba::RED);

    // Perspective cube with depth testing on top.
    fb.set_flags(DrawFlags {
        perspective: true,
        ..DrawFlags::none()
    });
    let transformed: Vec<Vertex> = cube
        .vertices()
        .iter()
        .map(|v| {
            let p = v.position.rotate_y(angle.0).rotate_x(angle.1);
            Vertex::new(Vec3::new(p.x, p.y, p.z + 3.5), v.uv, v.color)
        })
        .collect();
    fb.draw_triangles(&transformed, cube.indices())
}

fn run_windowed() -> Result<(), String> {
    let mut fb =
        Framebuffer::new(WINDOW_WIDTH, WINDOW_HEIGHT, 3).map_err(|e| e.to_string())?;
    fb.enable_depth(true);

    let mut rng = Xorshift::new(0x5EED_CAFE);
    let (background, triangles) = random_scene(&mut rng);
    let cube = Mesh::cube();

    let mut window = Window::new("rastr", WINDOW_WIDTH, WINDOW_HEIGHT)?;
    let mut limiter = FrameLimiter::new(&window, FPS);
    let mut angle = (0.0f32, 0.0f32);

    loop {
        let dt = limiter.wait_and_get_delta(&window) as f32 / 1000.0;

        // Pointer position steers the spin rate on both axes.
        let (px, py) = window.pointer();
        angle.0 += dt * (px - 0.5) * 4.0;
        angle.1 += dt * (py - 0.5) * 4.0;

        render_frame(&mut fb, background, &triangles, &cube, angle)
            .map_err(|e| e.to_string())?;

        if window.present(&fb)? == Signal::Quit {
            return Ok(());
        }
    }
}

fn run_export(path: &str) -> Result<(), String> {
    let mut fb =
        Framebuffer::new(WINDOW_WIDTH, WINDOW_HEIGHT, 3).map_err(|e| e.to_string())?;
    fb.enable_depth(true);

    let mut rng = Xorshift::new(0x5EED_CAFE);
    let (background, triangles) = random_scene(&mut rng);
    let cube = Mesh::cube();

    render_frame(&mut fb, background, &triangles, &cube, (0.6, 0.4))
        .map_err(|e| e.to_string())?;
    write_ppm(&fb, path).map_err(|e| e.to_string())
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let result = match args.get(1).map(String::as_str) {
        Some("--export") => match args.get(2) {
            Some(path) => run_export(path),
            None => Err("--export requires an output path".to_string()),
        },
        Some(other) => Err(format!("unknown argument: {other}")),
        None => run_windowed(),
    };

    if let Err(e) = result {
        eprintln!("rastr: {e}");
        std::process::exit(1);
    }
}
