use std::time::Instant;

use glam::Mat4;
use parking_lot::RwLock;

use crate::scene::CameraSettings;

/// Tracks the current window size for aspect-ratio computation.
#[derive(Debug)]
pub struct WindowViewport {
    size: RwLock<(u32, u32)>,
}

impl WindowViewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: RwLock::new((width.max(1), height.max(1))),
        }
    }

    pub fn update(&self, width: u32, height: u32) {
        *self.size.write() = (width.max(1), height.max(1));
    }

    pub fn size(&self) -> (u32, u32) {
        *self.size.read()
    }

    pub fn aspect(&self) -> f32 {
        let (width, height) = self.size();
        width as f32 / height as f32
    }
}

/// Measures elapsed seconds between frame callbacks.
#[derive(Debug)]
pub struct FrameTimer {
    last: Instant,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Seconds since the previous tick (or construction).
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        elapsed
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Perspective projection for the demo camera.
pub fn projection_matrix(camera: &CameraSettings, aspect: f32) -> Mat4 {
    Mat4::perspective_rh_gl(camera.fov.to_radians(), aspect.max(0.01), 0.1, 100.0)
}
