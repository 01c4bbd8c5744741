use serde::Serialize;

pub const FRONT_LIGHT_PREFIX: &str = "Light_";
pub const BACK_LIGHT_PREFIX: &str = "BackLight_";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Light {
    pub name: String,
    pub enabled: bool,
}

impl Light {
    pub fn new(name: impl Into<String>, enabled: bool) -> Self {
        Self { name: name.into(), enabled }
    }
}

/// Headlights toggle on a key press; brake lights are on while the key is held.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Lights {
    pub front: Vec<Light>,
    pub back: Vec<Light>,
}

impl Lights {
    pub fn from_scene(lights: impl IntoIterator<Item = Light>) -> Self {
        let mut out = Self::default();
        for light in lights {
            if light.name.starts_with(BACK_LIGHT_PREFIX) {
                out.back.push(light);
            } else if light.name.starts_with(FRONT_LIGHT_PREFIX) {
                out.front.push(light);
            }
        }
        out
    }

    pub fn update(&mut self, headlight_pressed: bool, brake_held: bool) {
        if headlight_pressed {
            // each light flips on its own, so mixed states stay mixed
            for light in self.front.iter_mut() {
                light.enabled = !light.enabled;
            }
        }
        for light in self.back.iter_mut() {
            light.enabled = brake_held;
        }
    }

    pub fn headlights_on(&self) -> bool {
        self.front.iter().any(|l| l.enabled)
    }

    pub fn brake_lights_on(&self) -> bool {
        self.back.iter().any(|l| l.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> Lights {
        Lights::from_scene([
            Light::new("Light_L", false),
            Light::new("Light_R", true),
            Light::new("BackLight_L", false),
            Light::new("BackLight_R", false),
            Light::new("Interior", false),
        ])
    }

    #[test]
    fn splits_by_prefix() {
        let l = rig();
        assert_eq!(l.front.len(), 2);
        assert_eq!(l.back.len(), 2);
    }

    #[test]
    fn headlight_press_flips_each_light() {
        let mut l = rig();
        l.update(true, false);
        assert!(l.front[0].enabled);
        assert!(!l.front[1].enabled);
        l.update(false, false);
        assert!(l.front[0].enabled);
    }

    #[test]
    fn brake_lights_track_held_key() {
        let mut l = rig();
        l.update(false, true);
        assert!(l.brake_lights_on());
        l.update(false, false);
        assert!(!l.brake_lights_on());
    }
}
