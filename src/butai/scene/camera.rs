use crate::math::{self, Angle, Quat, Vec3};
use crate::scene::node::NodeId;
use nalgebra::{Isometry3, Matrix3, Matrix4, Rotation3, Translation3, UnitQuaternion, Vector3};

#[derive(Debug, Clone, Copy)]
pub struct CameraMatrices {
    pub projection: Matrix4<f32>,
    pub view: Matrix4<f32>,
    pub eye: Vector3<f32>,
}

impl CameraMatrices {
    pub fn aligned_projection_matrix(&self) -> [[f32; 4]; 4] {
        self.projection.into()
    }

    pub fn aligned_view_matrix(&self) -> [[f32; 4]; 4] {
        self.view.into()
    }

    pub fn aligned_eye(&self) -> [f32; 4] {
        [self.eye.x, self.eye.y, self.eye.z, 1.0]
    }
}

pub trait ViewAndProject {
    fn view_m(&self) -> Matrix4<f32>;

    fn proj_m(&self) -> Matrix4<f32>;

    fn eye(&self) -> Vector3<f32>;

    fn update_ar(&mut self, aspect_ratio: f32);

    fn update_fov(&mut self, fov: f32);

    fn get_matrices(&self) -> CameraMatrices {
        CameraMatrices {
            projection: self.proj_m(),
            view: self.view_m(),
            eye: self.eye(),
        }
    }
}

/// Right-handed, depth in [0, 1] and Y pointing down in clip space.
fn calculate_proj_m(fov: f32, aspect_ratio: f32, near: f32, far: f32) -> Matrix4<f32> {
    let mut proj = nalgebra_glm::perspective_rh_zo(aspect_ratio, fov, near, far);
    proj[(1, 1)] *= -1.0;
    proj
}

fn orientation_from_axes(x: &Vec3, y: &Vec3, z: &Vec3) -> Quat {
    let m = Matrix3::from_columns(&[*x, *y, *z]);
    UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(m))
}

/// Perspective camera that looks down its local -Z axis.
#[derive(Debug, Clone)]
pub struct Camera {
    name: String,
    position: Vec3,
    orientation: Quat,
    yaw_fixed: bool,
    yaw_axis: Vec3,
    fov: f32,
    aspect_ratio: f32,
    near_plane_dist: f32,
    far_plane_dist: f32,
    pub(crate) node: Option<NodeId>,
    parent_position: Vec3,
    parent_orientation: Quat,
}

impl Camera {
    pub(crate) fn new(name: &str) -> Self {
        log::trace!("instance of {}", std::any::type_name::<Self>());
        Camera {
            name: name.to_owned(),
            position: Vec3::zeros(),
            orientation: Quat::identity(),
            yaw_fixed: true,
            yaw_axis: Vec3::y(),
            fov: Angle::Degree(45.0).radians(),
            aspect_ratio: 4.0 / 3.0,
            near_plane_dist: 100.0,
            far_plane_dist: 100_000.0,
            node: None,
            parent_position: Vec3::zeros(),
            parent_orientation: Quat::identity(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation;
    }

    /// Moves along world axes.
    pub fn move_world(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Moves along the camera's own axes.
    pub fn move_relative(&mut self, offset: Vec3) {
        self.position += self.orientation * offset;
    }

    pub fn set_fixed_yaw_axis(&mut self, fixed: bool, axis: Vec3) {
        self.yaw_fixed = fixed;
        self.yaw_axis = axis;
    }

    pub fn rotate(&mut self, rotation: Quat) {
        self.orientation = rotation * self.orientation;
    }

    pub fn yaw(&mut self, angle: Angle) {
        let axis = if self.yaw_fixed {
            self.yaw_axis
        } else {
            self.orientation * Vec3::y()
        };
        self.rotate(math::axis_angle(&axis, angle));
    }

    pub fn pitch(&mut self, angle: Angle) {
        let axis = self.orientation * Vec3::x();
        self.rotate(math::axis_angle(&axis, angle));
    }

    pub fn roll(&mut self, angle: Angle) {
        let axis = self.orientation * Vec3::z();
        self.rotate(math::axis_angle(&axis, angle));
    }

    /// Points the camera along a world-space direction, keeping the yaw axis up.
    pub fn set_direction(&mut self, direction: Vec3) {
        if math::is_zero(&direction) {
            return;
        }
        let z = -direction.normalize();
        let target = if self.yaw_fixed {
            let x = match self.yaw_axis.cross(&z).try_normalize(1e-6) {
                Some(x) => x,
                None => return,
            };
            let y = z.cross(&x).normalize();
            orientation_from_axes(&x, &y, &z)
        } else {
            let current = self.real_orientation() * -Vec3::z();
            math::rotation_to(&current, &-z) * self.real_orientation()
        };
        self.orientation = self.parent_orientation.inverse() * target;
    }

    /// Points the camera at a world-space target.
    pub fn look_at(&mut self, target: Vec3) {
        self.set_direction(target - self.real_position());
    }

    pub fn direction(&self) -> Vec3 {
        self.real_orientation() * -Vec3::z()
    }

    pub fn up(&self) -> Vec3 {
        self.real_orientation() * Vec3::y()
    }

    pub fn right(&self) -> Vec3 {
        self.real_orientation() * Vec3::x()
    }

    pub fn real_position(&self) -> Vec3 {
        self.parent_orientation * self.position + self.parent_position
    }

    pub fn real_orientation(&self) -> Quat {
        self.parent_orientation * self.orientation
    }

    /// Refreshes the cached pose of the node the camera hangs from.
    pub(crate) fn notify_parent(&mut self, position: Vec3, orientation: Quat) {
        self.parent_position = position;
        self.parent_orientation = orientation;
    }

    pub(crate) fn detach(&mut self) {
        self.node = None;
        self.notify_parent(Vec3::zeros(), Quat::identity());
    }

    pub fn near_clip_distance(&self) -> f32 {
        self.near_plane_dist
    }

    pub fn set_near_clip_distance(&mut self, near: f32) {
        self.near_plane_dist = near;
    }

    pub fn far_clip_distance(&self) -> f32 {
        self.far_plane_dist
    }

    pub fn set_far_clip_distance(&mut self, far: f32) {
        self.far_plane_dist = far;
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.update_ar(aspect_ratio);
    }

    pub fn fov_y(&self) -> Angle {
        Angle::Radian(self.fov)
    }

    pub fn set_fov_y(&mut self, fov: Angle) {
        self.update_fov(fov.radians());
    }
}

impl ViewAndProject for Camera {
    fn view_m(&self) -> Matrix4<f32> {
        let pose = Isometry3::from_parts(
            Translation3::from(self.real_position()),
            self.real_orientation(),
        );
        pose.inverse().to_homogeneous()
    }

    fn proj_m(&self) -> Matrix4<f32> {
        calculate_proj_m(
            self.fov,
            self.aspect_ratio,
            self.near_plane_dist,
            self.far_plane_dist,
        )
    }

    fn eye(&self) -> Vector3<f32> {
        self.real_position()
    }

    fn update_ar(&mut self, aspect_ratio: f32) {
        if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
            self.aspect_ratio = aspect_ratio;
        }
    }

    fn update_fov(&mut self, fov: f32) {
        self.fov = fov;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn look_at_points_down_the_target() {
        let mut camera = Camera::new("main");
        camera.set_position(Vec3::new(0.0, 150.0, 600.0));
        camera.look_at(Vec3::new(0.0, 100.0, 0.0));
        let expected = Vec3::new(0.0, -50.0, -600.0).normalize();
        assert_relative_eq!(camera.direction(), expected, epsilon = 1e-5);
        assert!(camera.up().y > 0.0);
        assert_relative_eq!(camera.right().y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn view_puts_target_on_the_negative_z_axis() {
        let mut camera = Camera::new("main");
        camera.set_position(Vec3::new(500.0, 100.0, 0.0));
        camera.look_at(Vec3::new(0.0, 100.0, 0.0));
        let view = camera.view_m();
        let p = view.transform_point(&Point3::new(0.0, 100.0, 0.0));
        assert_relative_eq!(p.coords, Vec3::new(0.0, 0.0, -500.0), epsilon = 1e-3);
    }

    #[test]
    fn yaw_uses_the_fixed_world_axis() {
        let mut camera = Camera::new("main");
        camera.pitch(Angle::Degree(-30.0));
        camera.yaw(Angle::Degree(90.0));
        assert_relative_eq!(camera.right().y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(camera.direction().x, -(30.0f32.to_radians().cos()), epsilon = 1e-5);
    }

    #[test]
    fn move_relative_follows_the_view() {
        let mut camera = Camera::new("main");
        camera.yaw(Angle::Degree(90.0));
        camera.move_relative(Vec3::new(0.0, 0.0, -10.0));
        assert_relative_eq!(camera.position(), Vec3::new(-10.0, 0.0, 0.0), epsilon = 1e-4);
    }

    #[test]
    fn set_direction_compensates_for_the_parent() {
        let mut camera = Camera::new("main");
        let parent = math::axis_angle(&Vec3::y(), Angle::Degree(90.0));
        camera.notify_parent(Vec3::new(0.0, 120.0, 0.0), parent);
        camera.set_position(Vec3::new(0.0, 80.0, 500.0));
        camera.look_at(Vec3::new(0.0, 120.0, 0.0));
        let to_target = (Vec3::new(0.0, 120.0, 0.0) - camera.real_position()).normalize();
        assert_relative_eq!(camera.direction(), to_target, epsilon = 1e-5);
    }

    #[test]
    fn projection_flips_y_for_vulkan() {
        let mut camera = Camera::new("main");
        camera.set_near_clip_distance(5.0);
        let proj = camera.proj_m();
        assert!(proj[(1, 1)] < 0.0);
        let near = proj.transform_point(&Point3::new(0.0, 0.0, -5.0));
        assert_relative_eq!(near.z, 0.0, epsilon = 1e-5);
    }
}
