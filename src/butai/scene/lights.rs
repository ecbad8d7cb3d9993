use crate::math::{Angle, Vec3};
use crate::scene::material::Colour;
use crate::scene::node::NodeId;
use nalgebra::Vector3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightType {
    Point,
    Directional,
    Spotlight,
}

#[derive(Debug, Clone)]
pub struct Light {
    name: String,
    pub light_type: LightType,
    pub position: Vec3,
    direction: Vec3,
    pub diffuse: Colour,
    pub specular: Colour,
    spot_inner: f32,
    spot_outer: f32,
    visible: bool,
    pub(crate) node: Option<NodeId>,
}

impl Light {
    pub(crate) fn new(name: &str) -> Self {
        Light {
            name: name.to_owned(),
            light_type: LightType::Point,
            position: Vec3::zeros(),
            direction: Vec3::z(),
            diffuse: Colour::WHITE,
            specular: Colour::BLACK,
            spot_inner: Angle::Degree(30.0).radians(),
            spot_outer: Angle::Degree(40.0).radians(),
            visible: true,
            node: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Stored normalised; a zero vector leaves the previous direction in place.
    pub fn set_direction(&mut self, direction: Vec3) {
        if let Some(d) = direction.try_normalize(1e-6) {
            self.direction = d;
        }
    }

    pub fn set_spotlight_range(&mut self, inner: Angle, outer: Angle) {
        self.spot_inner = inner.radians();
        self.spot_outer = outer.radians().max(self.spot_inner);
    }

    /// Inner and outer cone angles in radians.
    pub fn spotlight_range(&self) -> (f32, f32) {
        (self.spot_inner, self.spot_outer)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }
}

/// World-space light as handed to the lighting passes.
#[derive(Debug, Clone)]
pub enum PackedLight {
    Directional {
        direction: Vector3<f32>,
        color: [f32; 3],
    },
    Point {
        position: Vector3<f32>,
        color: [f32; 3],
    },
    Spot {
        position: Vector3<f32>,
        direction: Vector3<f32>,
        color: [f32; 3],
        cos_inner: f32,
        cos_outer: f32,
    },
}

impl PackedLight {
    pub fn pack(light: &Light, position: Vector3<f32>, direction: Vector3<f32>) -> Self {
        let color = [light.diffuse.r, light.diffuse.g, light.diffuse.b];
        match light.light_type {
            LightType::Directional => PackedLight::Directional { direction, color },
            LightType::Point => PackedLight::Point { position, color },
            LightType::Spotlight => {
                let (inner, outer) = light.spotlight_range();
                PackedLight::Spot {
                    position,
                    direction,
                    color,
                    cos_inner: (inner * 0.5).cos(),
                    cos_outer: (outer * 0.5).cos(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn new_light_is_a_visible_white_point() {
        let light = Light::new("L");
        assert_eq!(light.light_type, LightType::Point);
        assert!(light.is_visible());
        assert_eq!(light.diffuse, Colour::WHITE);
        assert_relative_eq!(light.direction(), Vec3::z());
    }

    #[test]
    fn direction_is_normalised() {
        let mut light = Light::new("LightD");
        light.set_direction(Vec3::new(1.0, -2.0, -1.0));
        assert_relative_eq!(light.direction().norm(), 1.0, epsilon = 1e-6);
        light.set_direction(Vec3::zeros());
        assert_relative_eq!(light.direction().norm(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn spot_packs_half_angles() {
        let mut light = Light::new("LightS");
        light.light_type = LightType::Spotlight;
        light.set_spotlight_range(Angle::Degree(10.0), Angle::Degree(80.0));
        match PackedLight::pack(&light, Vec3::zeros(), -Vec3::y()) {
            PackedLight::Spot {
                cos_inner,
                cos_outer,
                ..
            } => {
                assert_relative_eq!(cos_inner, 5.0f32.to_radians().cos(), epsilon = 1e-6);
                assert_relative_eq!(cos_outer, 40.0f32.to_radians().cos(), epsilon = 1e-6);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
