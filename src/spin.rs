use glam::Vec3;

/// Rotation state for the demo object.
///
/// The host toggles `rotating` from input events and calls `advance` once
/// per frame with the elapsed seconds to obtain the rotation increment to
/// feed into [`crate::Transformations::rotate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spin {
    rotating: bool,
    axis: Vec3,
    speed: f32,
}

impl Spin {
    /// `axis` is normalized; `speed` is in radians per second.
    pub fn new(axis: Vec3, speed: f32) -> Self {
        Self {
            rotating: true,
            axis: axis.normalize_or_zero(),
            speed,
        }
    }

    pub fn is_rotating(&self) -> bool {
        self.rotating
    }

    pub fn set_rotating(&mut self, rotating: bool) {
        self.rotating = rotating;
    }

    pub fn toggle(&mut self) {
        self.rotating = !self.rotating;
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Rotation increment for a frame that took `dt_seconds`; zero while
    /// rotation is paused.
    pub fn advance(&self, dt_seconds: f32) -> Vec3 {
        if self.rotating {
            self.axis * self.speed * dt_seconds
        } else {
            Vec3::ZERO
        }
    }
}

impl Default for Spin {
    fn default() -> Self {
        Self::new(Vec3::Y, 45f32.to_radians())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_scales_with_elapsed_time() {
        let spin = Spin::new(Vec3::Y, 2.0);
        assert_eq!(spin.advance(0.5), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn paused_spin_yields_no_rotation() {
        let mut spin = Spin::new(Vec3::Y, 2.0);
        spin.set_rotating(false);
        assert_eq!(spin.advance(0.5), Vec3::ZERO);
        spin.toggle();
        assert!(spin.is_rotating());
        assert_ne!(spin.advance(0.5), Vec3::ZERO);
    }

    #[test]
    fn axis_is_normalized() {
        let spin = Spin::new(Vec3::new(0.0, 0.0, 10.0), 1.0);
        assert_eq!(spin.advance(1.0), Vec3::new(0.0, 0.0, 1.0));
    }
}
