use glam::{Mat4, Vec2, Vec3};

/// Accumulated scale, translation, and rotation values.
#[derive(Debug, Clone, Copy, PartialEq)]
struct State {
    scale: f32,
    translation: Vec2,
    rotation: Vec3,
}

/// Accumulates per-frame transform increments into a model-view matrix.
///
/// The builder starts from baseline values captured at construction.
/// `start` commits the baseline, after which `scale`/`translate`/`rotate`
/// apply multiplier-weighted increments; `reset` returns to the baseline.
/// Angles are radians throughout.
#[derive(Debug, Clone)]
pub struct Transformations {
    depth: f32,
    base: State,
    current: State,
    started: bool,
}

impl Transformations {
    /// Captures the baseline: fixed view-axis depth, uniform scale, 2D
    /// translation, and per-axis rotation angles.
    pub fn new(depth: f32, scale: f32, translation: Vec2, rotation: Vec3) -> Self {
        let base = State {
            scale,
            translation,
            rotation,
        };
        Self {
            depth,
            base,
            current: base,
            started: false,
        }
    }

    /// Commits the baseline and begins accumulating. A second call before
    /// any mutation is a no-op; accumulated state survives later calls.
    pub fn start(&mut self) {
        if !self.started {
            self.current = self.base;
            self.started = true;
        }
    }

    /// Multiplies the accumulated scale by `factor`.
    pub fn scale(&mut self, factor: f32) {
        self.current.scale *= factor;
    }

    /// Adds `delta * multiplier` to the accumulated translation.
    pub fn translate(&mut self, delta: Vec2, multiplier: f32) {
        self.current.translation += delta * multiplier;
    }

    /// Adds `delta * multiplier` to the accumulated per-axis rotation.
    pub fn rotate(&mut self, delta: Vec3, multiplier: f32) {
        self.current.rotation += delta * multiplier;
    }

    /// Restores the constructor baseline and leaves the started state.
    pub fn reset(&mut self) {
        self.current = self.base;
        self.started = false;
    }

    pub fn scale_factor(&self) -> f32 {
        self.current.scale
    }

    pub fn translation(&self) -> Vec2 {
        self.current.translation
    }

    pub fn rotation(&self) -> Vec3 {
        self.current.rotation
    }

    /// Composes the current model-view matrix: translation (with the object
    /// pushed back by `depth` along the view axis), rotation about X, Y,
    /// then Z, and finally the uniform scale. Pure; no state is touched.
    pub fn model_view_matrix(&self) -> Mat4 {
        let State {
            scale,
            translation,
            rotation,
        } = self.current;
        Mat4::from_translation(Vec3::new(translation.x, translation.y, -self.depth))
            * Mat4::from_rotation_x(rotation.x)
            * Mat4::from_rotation_y(rotation.y)
            * Mat4::from_rotation_z(rotation.z)
            * Mat4::from_scale(Vec3::splat(scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> Transformations {
        Transformations::new(
            5.0,
            1.0,
            Vec2::new(0.25, -0.5),
            Vec3::new(0.3, 0.6, 0.0),
        )
    }

    #[test]
    fn matrix_matches_documented_composition() {
        let mut transforms = builder();
        transforms.start();
        let expected = Mat4::from_translation(Vec3::new(0.25, -0.5, -5.0))
            * Mat4::from_rotation_x(0.3)
            * Mat4::from_rotation_y(0.6)
            * Mat4::from_rotation_z(0.0)
            * Mat4::from_scale(Vec3::splat(1.0));
        assert_eq!(transforms.model_view_matrix(), expected);
    }

    #[test]
    fn reset_restores_post_start_matrix_exactly() {
        let mut transforms = builder();
        transforms.start();
        let baseline = transforms.model_view_matrix();

        transforms.scale(1.7);
        transforms.translate(Vec2::new(3.0, -2.0), 0.5);
        transforms.rotate(Vec3::new(0.1, 0.9, -0.4), 2.0);
        assert_ne!(transforms.model_view_matrix(), baseline);

        transforms.reset();
        transforms.start();
        assert_eq!(transforms.model_view_matrix(), baseline);
    }

    #[test]
    fn opposite_rotations_cancel() {
        let mut transforms = builder();
        transforms.start();
        let before = transforms.model_view_matrix();

        let delta = Vec3::new(0.2, -0.7, 1.1);
        transforms.rotate(delta, 1.0);
        transforms.rotate(-delta, 1.0);

        assert!(transforms.model_view_matrix().abs_diff_eq(before, 1e-6));
    }

    #[test]
    fn start_is_idempotent_and_preserves_accumulation() {
        let mut transforms = builder();
        transforms.start();
        transforms.start();
        let baseline = transforms.model_view_matrix();

        transforms.scale(2.0);
        let scaled = transforms.model_view_matrix();
        assert_ne!(scaled, baseline);

        // A stray second start must not discard accumulated state.
        transforms.start();
        assert_eq!(transforms.model_view_matrix(), scaled);
    }

    #[test]
    fn increments_are_multiplier_weighted() {
        let mut transforms = builder();
        transforms.start();

        transforms.translate(Vec2::new(1.0, 2.0), 0.25);
        assert_eq!(
            transforms.translation(),
            Vec2::new(0.25, -0.5) + Vec2::new(0.25, 0.5)
        );

        transforms.rotate(Vec3::new(1.0, 0.0, 0.5), 0.5);
        assert_eq!(
            transforms.rotation(),
            Vec3::new(0.3, 0.6, 0.0) + Vec3::new(0.5, 0.0, 0.25)
        );

        transforms.scale(3.0);
        transforms.scale(0.5);
        assert_eq!(transforms.scale_factor(), 1.5);
    }
}
