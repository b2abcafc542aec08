use glam::{Mat4, Quat, Vec2, Vec3};

use crate::world::{GridCell, World};

/// Follow camera: an eye orbiting a focus point. Player movement drags both.
pub struct FollowCamera {
    pub eye: Vec3,
    pub focus_point: Vec3,
}

impl FollowCamera {
    pub fn new(eye: Vec3, focus_point: Vec3) -> Self {
        Self { eye, focus_point }
    }

    /// Places the eye at `distance` from `focus_point`, rotated by yaw and
    /// pitch given in degrees.
    pub fn orbiting(focus_point: Vec3, yaw: f32, pitch: f32, distance: f32) -> Self {
        let rotation = Quat::from_rotation_y(yaw.to_radians()) * Quat::from_rotation_x(-pitch.to_radians());
        let eye = focus_point + rotation * Vec3::new(0.0, 0.0, distance);
        Self { eye, focus_point }
    }

    /// Shifts the eye by the followed player's displacement and looks at
    /// the player's new position.
    pub fn follow(&mut self, movement: Vec3, player_position: Vec3) {
        self.eye += movement;
        self.focus_point = player_position;
    }

    pub fn build_view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.focus_point, Vec3::Y)
    }

    /// World-space ray through a cursor position given in window pixels.
    pub fn screen_ray(&self, projection: &Projection, cursor: Vec2) -> Ray {
        let ndc = projection.to_ndc(cursor);
        let inverse = (projection.build_projection_matrix() * self.build_view_matrix()).inverse();

        // glam's right-handed perspective maps depth to [0, 1]
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        Ray {
            origin: near,
            direction: (far - near).normalize_or_zero(),
        }
    }

    /// Grid cell under the cursor, found by casting onto the ground plane.
    pub fn pick_cell(&self, projection: &Projection, cursor: Vec2, world: &World) -> Option<GridCell> {
        let hit = self.screen_ray(projection, cursor).intersect_ground(0.0)?;
        Some(world.grid_from_world(hit.x, hit.z))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Point where the ray crosses the horizontal plane `y = height`, if it
    /// does so in front of the origin.
    pub fn intersect_ground(&self, height: f32) -> Option<Vec3> {
        if self.direction.y.abs() < f32::EPSILON {
            return None;
        }
        let t = (height - self.origin.y) / self.direction.y;
        (t >= 0.0).then(|| self.origin + self.direction * t)
    }
}

/// Perspective lens together with the window it maps clicks from.
pub struct Projection {
    viewport: Vec2,
    fovy: f32,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32, fovy_degrees: f32, znear: f32, zfar: f32) -> Self {
        Self {
            viewport: Vec2::new(width as f32, height as f32).max(Vec2::ONE),
            fovy: fovy_degrees.to_radians(),
            znear,
            zfar,
        }
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Zero-sized windows (minimised) keep the previous viewport.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.viewport = Vec2::new(width as f32, height as f32);
        }
    }

    /// Window pixels, origin top-left, to normalised device coordinates.
    pub fn to_ndc(&self, cursor: Vec2) -> Vec2 {
        let uv = cursor / self.viewport;
        Vec2::new(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0)
    }

    pub fn build_projection_matrix(&self) -> Mat4 {
        let aspect = self.viewport.x / self.viewport.y;
        Mat4::perspective_rh(self.fovy, aspect, self.znear, self.zfar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn top_down(focus: Vec3) -> FollowCamera {
        // straight down would make look_at degenerate with Y up
        FollowCamera::new(focus + Vec3::new(0.0, 1000.0, 1.0), focus)
    }

    #[test]
    fn follow_moves_eye_by_movement() {
        let mut camera = FollowCamera::new(Vec3::new(0.0, 500.0, 500.0), Vec3::ZERO);
        camera.follow(Vec3::new(50.0, 0.0, 25.0), Vec3::new(50.0, 100.1, 25.0));

        assert_eq!(camera.eye, Vec3::new(50.0, 500.0, 525.0));
        assert_eq!(camera.focus_point, Vec3::new(50.0, 100.1, 25.0));
    }

    #[test]
    fn orbiting_keeps_distance() {
        let focus = Vec3::new(10.0, 0.0, -4.0);
        let camera = FollowCamera::orbiting(focus, 30.0, 50.0, 800.0);
        assert_relative_eq!(camera.eye.distance(focus), 800.0, epsilon = 1e-2);
        assert!(camera.eye.y > focus.y);
    }

    #[test]
    fn centre_of_screen_hits_focus() {
        let focus = Vec3::new(450.0, 0.0, 650.0);
        let camera = top_down(focus);
        let projection = Projection::new(800, 600, 60.0, 1.0, 20000.0);

        let ray = camera.screen_ray(&projection, Vec2::new(400.0, 300.0));
        let hit = ray.intersect_ground(0.0).unwrap();
        assert_relative_eq!(hit.x, focus.x, epsilon = 0.5);
        assert_relative_eq!(hit.z, focus.z, epsilon = 0.5);
    }

    #[test]
    fn pick_cell_floors_hit_point() {
        let world = World::new(16, 16, 100.0).unwrap();
        let camera = top_down(Vec3::new(450.0, 0.0, 650.0));
        let projection = Projection::new(800, 600, 60.0, 1.0, 20000.0);

        let cell = camera.pick_cell(&projection, Vec2::new(400.0, 300.0), &world);
        assert_eq!(cell, Some(GridCell::new(4, 6)));
    }

    #[test]
    fn pick_cell_clamps_far_hits() {
        let world = World::new(4, 4, 100.0).unwrap();
        let camera = top_down(Vec3::new(5000.0, 0.0, -5000.0));
        let projection = Projection::new(800, 600, 60.0, 1.0, 20000.0);

        let cell = camera.pick_cell(&projection, Vec2::new(400.0, 300.0), &world);
        assert_eq!(cell, Some(GridCell::new(4, 0)));
    }

    #[test]
    fn ndc_spans_the_window() {
        let projection = Projection::new(800, 600, 60.0, 1.0, 20000.0);
        assert_eq!(projection.to_ndc(Vec2::ZERO), Vec2::new(-1.0, 1.0));
        assert_eq!(projection.to_ndc(Vec2::new(800.0, 600.0)), Vec2::new(1.0, -1.0));
        assert_eq!(projection.to_ndc(Vec2::new(400.0, 300.0)), Vec2::ZERO);
    }

    #[test]
    fn minimised_window_keeps_viewport() {
        let mut projection = Projection::new(0, 0, 60.0, 1.0, 20000.0);
        assert_eq!(projection.viewport(), Vec2::ONE);

        projection.resize(1024, 768);
        projection.resize(0, 768);
        assert_eq!(projection.viewport(), Vec2::new(1024.0, 768.0));
        assert!(projection.build_projection_matrix().is_finite());
    }

    #[test]
    fn ray_pointing_up_misses_ground() {
        let ray = Ray {
            origin: Vec3::new(0.0, 10.0, 0.0),
            direction: Vec3::Y,
        };
        assert_eq!(ray.intersect_ground(0.0), None);

        let parallel = Ray {
            origin: Vec3::new(0.0, 10.0, 0.0),
            direction: Vec3::X,
        };
        assert_eq!(parallel.intersect_ground(0.0), None);
    }
}
