use crate::geometry::Vec3;

/// Projection used by the kernel when generating primary rays
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lens {
    Thin = 1,
    Fisheye = 2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,

    pub xfov: f32, // radians
    pub resolution_x: u32,
    pub resolution_y: u32,

    pub aperture_radius: f32, // zero for a pinhole
    pub focal_distance: f32,
    pub lens: Lens,
}

impl Default for Camera {
    fn default() -> Self {
        Camera::lookat_camera(
            Vec3::zero(),
            Vec3(0.0, 0.0, -1.0),
            Vec3(0.0, 1.0, 0.0),
            (90.0_f32).to_radians(),
            800,
            600,
        )
    }
}

impl Camera {
    /// Pinhole camera at `eye` looking at `target`, focused on the target
    pub fn lookat_camera(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        xfov: f32,
        resolution_x: u32,
        resolution_y: u32,
    ) -> Camera {
        Camera {
            eye,
            target,
            up,
            xfov,
            resolution_x,
            resolution_y,
            aperture_radius: 0.0,
            focal_distance: (target - eye).length(),
            lens: Lens::Thin,
        }
    }

    pub fn with_aperture(mut self, aperture_radius: f32, focal_distance: f32) -> Camera {
        self.aperture_radius = aperture_radius;
        self.focal_distance = focal_distance;
        self
    }

    pub fn with_lens(mut self, lens: Lens) -> Camera {
        self.lens = lens;
        self
    }

    /// Vertical field of view matching the aspect ratio of the raster
    pub fn yfov(&self) -> f32 {
        let aspect = self.resolution_y as f32 / self.resolution_x.max(1) as f32;
        2.0 * f32::atan(f32::tan(self.xfov / 2.0) * aspect)
    }

    /// Orthonormal camera basis (u, v, w). w points from the target back
    /// towards the eye, u to the right and v up.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let w = Vec3::normalized(self.eye - self.target);
        let mut right = Vec3::cross(self.up, w);
        if right.near_zero() {
            // up is parallel to the viewing direction, pick any perpendicular
            let fallback = if w.x().abs() < 0.9 { Vec3(1.0, 0.0, 0.0) } else { Vec3(0.0, 0.0, 1.0) };
            right = Vec3::cross(fallback, w);
        }
        let u = Vec3::normalized(right);
        let v = Vec3::cross(w, u);
        (u, v, w)
    }

    /// Fixed 19 element record:
    /// aperture, eye (3), xfov, yfov, focal distance, u (3), v (3), w (3),
    /// resolution x, resolution y, lens
    pub fn to_array(&self) -> [f32; 19] {
        let (u, v, w) = self.basis();
        #[rustfmt::skip]
        let array = [
            self.aperture_radius,
            self.eye.x(), self.eye.y(), self.eye.z(),
            self.xfov, self.yfov(),
            self.focal_distance,
            u.x(), u.y(), u.z(),
            v.x(), v.y(), v.z(),
            w.x(), w.y(), w.z(),
            self.resolution_x as f32, self.resolution_y as f32,
            self.lens as i32 as f32,
        ];
        array
    }
}
