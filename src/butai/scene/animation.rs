/// Playback cursor over one named clip of an entity's mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    name: String,
    length: f32,
    time: f32,
    weight: f32,
    enabled: bool,
    looping: bool,
}

impl AnimationState {
    pub fn new(name: &str, length: f32) -> Self {
        AnimationState {
            name: name.to_owned(),
            length: length.max(0.0),
            time: 0.0,
            weight: 1.0,
            enabled: false,
            looping: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn time_position(&self) -> f32 {
        self.time
    }

    pub fn set_time_position(&mut self, time: f32) {
        if self.length <= 0.0 {
            self.time = 0.0;
        } else if self.looping {
            self.time = time % self.length;
            if self.time < 0.0 {
                self.time += self.length;
            }
        } else {
            self.time = time.max(0.0).min(self.length);
        }
    }

    pub fn add_time(&mut self, offset: f32) {
        self.set_time_position(self.time + offset);
    }

    pub fn has_ended(&self) -> bool {
        !self.looping && self.time >= self.length
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f32) {
        self.weight = weight;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn looping_clip_wraps() {
        let mut walk = AnimationState::new("Walk", 1.0);
        walk.add_time(0.75);
        walk.add_time(0.5);
        assert_relative_eq!(walk.time_position(), 0.25, epsilon = 1e-5);
        assert!(!walk.has_ended());
    }

    #[test]
    fn clamped_clip_ends() {
        let mut death = AnimationState::new("Death", 2.0);
        death.set_loop(false);
        death.add_time(5.0);
        assert_relative_eq!(death.time_position(), 2.0);
        assert!(death.has_ended());
        death.add_time(-10.0);
        assert_relative_eq!(death.time_position(), 0.0);
    }

    #[test]
    fn zero_length_clip_stays_at_start() {
        let mut pose = AnimationState::new("Pose", 0.0);
        pose.add_time(3.0);
        assert_eq!(pose.time_position(), 0.0);
    }
}
