use crate::error::ButaiError;
use crate::root::input::{KeyCode, KeyEvent};
use crate::root::listener::{FrameContext, FrameListener};
use crate::scene::material::Colour;
use crate::setup::LabLights;

const AMBIENT_STEPS: u8 = 10;

/// A steps the ambient grey up by a tenth, wrapping back to black after
/// full white. D, P and S flip the directional, point and spot lights.
#[derive(Debug, Clone)]
pub struct LightToggle {
    lights: LabLights,
    ambient_step: u8,
}

impl LightToggle {
    pub fn new(lights: LabLights) -> Self {
        LightToggle {
            lights,
            ambient_step: 0,
        }
    }

    pub fn ambient_level(&self) -> f32 {
        f32::from(self.ambient_step) / f32::from(AMBIENT_STEPS)
    }
}

impl FrameListener for LightToggle {
    fn key_pressed(&mut self, ctx: &mut FrameContext, evt: &KeyEvent) -> Result<(), ButaiError> {
        let light = match evt.key {
            KeyCode::A => {
                self.ambient_step = if self.ambient_step >= AMBIENT_STEPS {
                    0
                } else {
                    self.ambient_step + 1
                };
                ctx.scene
                    .set_ambient_light(Colour::grey(self.ambient_level()));
                log::debug!("ambient {:.1}", self.ambient_level());
                return Ok(());
            }
            KeyCode::D => self.lights.directional,
            KeyCode::P => self.lights.point,
            KeyCode::S => self.lights.spot,
            _ => return Ok(()),
        };
        let light = ctx.scene.light_mut(light)?;
        let visible = light.toggle();
        log::debug!("{} {}", light.name(), if visible { "on" } else { "off" });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::root::input::InputEvent;
    use crate::root::Root;
    use crate::scene::lights::PackedLight;
    use crate::setup;
    use approx::assert_relative_eq;

    fn tap(root: &mut Root, key: KeyCode) {
        root.inject(InputEvent::KeyPressed(key));
        root.inject(InputEvent::KeyReleased(key));
        root.step(0.016).unwrap();
    }

    #[test]
    fn ambient_cycles_through_tenths() {
        let mut root = Root::new(Config::default());
        let lights = setup::set_lights(root.scene_mut()).unwrap();
        root.add_frame_listener(LightToggle::new(lights));

        tap(&mut root, KeyCode::A);
        assert_relative_eq!(root.scene().ambient_light().r, 0.1);
        for _ in 0..9 {
            tap(&mut root, KeyCode::A);
        }
        assert_relative_eq!(root.scene().ambient_light().g, 1.0);
        tap(&mut root, KeyCode::A);
        assert_eq!(root.scene().ambient_light(), Colour::grey(0.0));
    }

    #[test]
    fn keys_flip_their_light() {
        let mut root = Root::new(Config::default());
        let lights = setup::set_lights(root.scene_mut()).unwrap();
        root.add_frame_listener(LightToggle::new(lights));

        tap(&mut root, KeyCode::P);
        assert!(matches!(
            root.scene().packed_lights().as_slice(),
            [PackedLight::Point { .. }]
        ));
        tap(&mut root, KeyCode::D);
        assert_eq!(root.scene().packed_lights().len(), 2);
        tap(&mut root, KeyCode::P);
        tap(&mut root, KeyCode::D);
        assert!(root.scene().packed_lights().is_empty());
        assert!(!root.scene().light(lights.spot).unwrap().is_visible());
    }
}
