#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Colour {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Colour {
    pub const BLACK: Colour = Colour::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Colour = Colour::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Colour { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Colour { r, g, b, a }
    }

    pub fn grey(level: f32) -> Self {
        Colour::rgb(level, level, level)
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Colour {
    fn default() -> Self {
        Colour::WHITE
    }
}

/// Single-pass surface description used by entities and manual objects.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub diffuse: Colour,
    pub ambient: Colour,
    pub self_illumination: Colour,
    pub lighting_enabled: bool,
    pub receive_shadows: bool,
    pub texture: Option<String>,
    pub tiling: [f32; 2],
}

impl Material {
    pub fn new(name: &str) -> Self {
        Material {
            name: name.to_owned(),
            diffuse: Colour::WHITE,
            ambient: Colour::WHITE,
            self_illumination: Colour::BLACK,
            lighting_enabled: true,
            receive_shadows: true,
            texture: None,
            tiling: [1.0, 1.0],
        }
    }

    pub fn with_diffuse(mut self, diffuse: Colour) -> Self {
        self.diffuse = diffuse;
        self
    }

    pub fn with_texture(mut self, texture: &str) -> Self {
        self.texture = Some(texture.to_owned());
        self
    }

    /// Fully self-lit surfaces ignore scene lighting.
    pub fn is_unlit(&self) -> bool {
        !self.lighting_enabled
            || (self.self_illumination.r >= 1.0
                && self.self_illumination.g >= 1.0
                && self.self_illumination.b >= 1.0)
    }

    pub fn emissive_level(&self) -> f32 {
        if !self.lighting_enabled {
            return 1.0;
        }
        let c = self.self_illumination;
        (c.r + c.g + c.b) / 3.0
    }
}

/// The white, self-lit line material every lab grid is drawn with.
pub fn grid_plane_material() -> Material {
    Material {
        receive_shadows: false,
        diffuse: Colour::rgba(1.0, 1.0, 1.0, 0.0),
        ambient: Colour::WHITE,
        self_illumination: Colour::WHITE,
        ..Material::new("GridPlaneMaterial")
    }
}
