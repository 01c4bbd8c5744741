//! Configuration system.
//!
//! Settings come from an optional JSON file, then CLI flags on top. A
//! `"vehicle"` block only overrides the fields it names; the rest come from
//! `"preset"` (DRIFT when unset).
//!
//!   arcade-car [--config car.json] [--preset classic|drift] [--tick-hz 50]
//!              [--ticks 600] [--script lap.json] [--seed 7] [--telemetry]

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::audio::EngineAudioConfig;
use crate::input::InputBindings;
use crate::physics::HostTuning;
use crate::vehicle::{VehicleConfig, DRIFT};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Fixed simulation tick rate.
    pub tick_hz: u32,
    /// Stop after this many ticks; 0 runs until interrupted.
    pub ticks: u64,
    /// Named policy the `vehicle` block is layered over.
    pub preset: Option<String>,
    pub vehicle: VehicleConfig,
    pub host: HostTuning,
    pub bindings: InputBindings,
    pub audio: EngineAudioConfig,
    /// JSON input script; the built-in demo lap when unset.
    pub script: Option<PathBuf>,
    /// Seed for steering jitter; no jitter when unset.
    pub seed: Option<u64>,
    pub steer_jitter: f32,
    /// Print per-tick JSON snapshots to stdout.
    pub telemetry: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            tick_hz: 50,
            ticks: 600,
            preset: None,
            vehicle: DRIFT,
            host: HostTuning::default(),
            bindings: InputBindings::default(),
            audio: EngineAudioConfig::default(),
            script: None,
            seed: None,
            steer_jitter: 0.05,
            telemetry: false,
        }
    }
}

impl AppSettings {
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        let mut value: Value = serde_json::from_str(s)?;

        if let Some(root) = value.as_object_mut() {
            let base = match root.get("preset").and_then(Value::as_str) {
                Some(name) => VehicleConfig::preset(name).ok_or_else(|| {
                    <serde_json::Error as serde::de::Error>::custom(format!("unknown preset {name:?}"))
                })?,
                None => DRIFT,
            };
            let mut vehicle = serde_json::to_value(base)?;
            if let Some(overrides) = root.remove("vehicle") {
                merge_json(&mut vehicle, overrides);
            }
            root.insert("vehicle".to_string(), vehicle);
        }

        serde_json::from_value(value)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read settings {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("parse settings {}", path.display()))
    }

    pub fn dt(&self) -> f32 {
        1.0 / self.tick_hz.max(1) as f32
    }

    /// `args` excludes the program name.
    pub fn from_args<I, S>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();

        let mut cfg = match args.iter().position(|a| a == "--config") {
            Some(i) => match args.get(i + 1) {
                Some(path) => Self::load(Path::new(path))?,
                None => bail!("--config needs a path"),
            },
            None => Self::default(),
        };

        let mut i = 0;
        while i < args.len() {
            let value = args.get(i + 1);
            match (args[i].as_str(), value) {
                ("--config", Some(_)) => i += 2,
                ("--preset", Some(name)) => {
                    cfg.vehicle = VehicleConfig::preset(name)
                        .with_context(|| format!("unknown preset {name:?}"))?;
                    cfg.preset = Some(name.clone());
                    i += 2;
                }
                ("--tick-hz", Some(v)) => {
                    cfg.tick_hz = v.parse().with_context(|| format!("bad --tick-hz {v:?}"))?;
                    i += 2;
                }
                ("--ticks", Some(v)) => {
                    cfg.ticks = v.parse().with_context(|| format!("bad --ticks {v:?}"))?;
                    i += 2;
                }
                ("--script", Some(v)) => {
                    cfg.script = Some(PathBuf::from(v));
                    i += 2;
                }
                ("--seed", Some(v)) => {
                    cfg.seed = Some(v.parse().with_context(|| format!("bad --seed {v:?}"))?);
                    i += 2;
                }
                ("--telemetry", _) => {
                    cfg.telemetry = true;
                    i += 1;
                }
                _ => i += 1,
            }
        }

        if cfg.tick_hz == 0 {
            bail!("tick_hz must be at least 1");
        }
        Ok(cfg)
    }
}

/// Overlay `patch` onto `base`, recursing into objects; anything else replaces.
fn merge_json(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arcade::TractionConfig;
    use crate::vehicle::CLASSIC;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = AppSettings::from_json_str(
            r#"{ "tick_hz": 60, "vehicle": { "max_turn_angle": 25.0 } }"#,
        )
        .unwrap();
        assert_eq!(cfg.tick_hz, 60);
        assert_eq!(cfg.vehicle.max_turn_angle, 25.0);
        assert_eq!(cfg.vehicle.traction, DRIFT.traction);
        assert!(cfg.vehicle.drivetrain.deceleration_enabled);
        assert_eq!(cfg.vehicle.steering_response_rate, 5.0);
        assert_eq!(cfg.bindings.handbrake_threshold, 0.5);
    }

    #[test]
    fn vehicle_block_layers_over_named_preset() {
        let cfg = AppSettings::from_json_str(
            r#"{ "preset": "classic", "vehicle": { "drivetrain": { "max_acceleration": 800.0 } } }"#,
        )
        .unwrap();
        assert_eq!(cfg.preset.as_deref(), Some("classic"));
        assert_eq!(cfg.vehicle.drivetrain.max_acceleration, 800.0);
        assert!(!cfg.vehicle.drivetrain.deceleration_enabled);
        assert_eq!(cfg.vehicle.traction, None);

        let nested = AppSettings::from_json_str(
            r#"{ "vehicle": { "traction": { "grip_coefficient": 0.4 } } }"#,
        )
        .unwrap();
        assert_eq!(
            nested.vehicle.traction,
            Some(TractionConfig { grip_coefficient: 0.4, ..TractionConfig::default() })
        );

        assert!(AppSettings::from_json_str(r#"{ "preset": "tank" }"#).is_err());
        assert_eq!(AppSettings::from_json_str("{}").unwrap(), AppSettings::default());
    }

    #[test]
    fn flags_override_defaults() {
        let cfg = AppSettings::from_args([
            "--preset", "classic", "--tick-hz", "100", "--ticks", "5", "--seed", "9", "--telemetry",
        ])
        .unwrap();
        assert_eq!(cfg.vehicle, CLASSIC);
        assert_eq!(cfg.tick_hz, 100);
        assert_eq!(cfg.ticks, 5);
        assert_eq!(cfg.seed, Some(9));
        assert!(cfg.telemetry);
        assert!((cfg.dt() - 0.01).abs() < 1e-7);
    }

    #[test]
    fn bad_flags_are_errors() {
        assert!(AppSettings::from_args(["--preset", "tank"]).is_err());
        assert!(AppSettings::from_args(["--tick-hz", "0"]).is_err());
        assert!(AppSettings::from_args(["--ticks", "many"]).is_err());
        assert!(AppSettings::from_args(["--config"]).is_err());
    }
}
