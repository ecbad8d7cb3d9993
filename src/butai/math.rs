use nalgebra::{UnitQuaternion, Vector3};

pub type Vec3 = Vector3<f32>;
pub type Quat = UnitQuaternion<f32>;

const EPSILON: f32 = 1e-6;
const SLERP_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Angle {
    Degree(f32),
    Radian(f32),
}

impl Angle {
    pub fn radians(self) -> f32 {
        match self {
            Angle::Degree(d) => d.to_radians(),
            Angle::Radian(r) => r,
        }
    }

    pub fn degrees(self) -> f32 {
        match self {
            Angle::Degree(d) => d,
            Angle::Radian(r) => r.to_degrees(),
        }
    }
}

pub fn axis_angle(axis: &Vec3, angle: Angle) -> Quat {
    UnitQuaternion::from_axis_angle(&nalgebra::Unit::new_normalize(*axis), angle.radians())
}

/// Normalises `v` in place and returns its former length. A zero vector stays zero.
pub fn normalise(v: &mut Vec3) -> f32 {
    let length = v.norm();
    if length > EPSILON {
        *v /= length;
    }
    length
}

pub fn normalised(v: &Vec3) -> Vec3 {
    let mut out = *v;
    normalise(&mut out);
    out
}

pub fn is_zero(v: &Vec3) -> bool {
    v.norm_squared() < EPSILON * EPSILON
}

pub fn same_direction(a: &Vec3, b: &Vec3) -> bool {
    (a - b).norm_squared() < EPSILON
}

/// Shortest-arc rotation taking `from` onto `to`.
///
/// Opposite vectors have no unique shortest arc; the half turn is taken about
/// an axis perpendicular to `from`, preferring one built from the X axis.
pub fn rotation_to(from: &Vec3, to: &Vec3) -> Quat {
    if is_zero(from) || is_zero(to) {
        return Quat::identity();
    }
    Quat::rotation_between(from, to).unwrap_or_else(|| {
        let mut axis = Vec3::x().cross(from);
        if is_zero(&axis) {
            axis = Vec3::y().cross(from);
        }
        axis_angle(&axis, Angle::Radian(std::f32::consts::PI))
    })
}

/// Spherical interpolation that always travels the short way round.
/// Orientations too close to interpolate between resolve to `dest`.
pub fn slerp_shortest(src: &Quat, dest: &Quat, t: f32) -> Quat {
    src.try_slerp(dest, t, SLERP_EPSILON).unwrap_or(*dest)
}
