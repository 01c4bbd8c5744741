//! arcade - engine-agnostic arcade driving helpers (pure types + per-tick passes)

pub mod types;
pub mod drivetrain;
pub mod steering;
pub mod traction;
pub mod state;
pub mod signal;

pub use types::*;
pub use drivetrain::{solve_drivetrain, DriveTrainConfig, DriveTrainOutput};
pub use steering::{SteeringConfig, SteeringState};
pub use traction::{blend_velocity, blend_factor, TractionConfig, TractionResult};
pub use state::{classify_regime, RegimeTracker, TractionRegime};
pub use signal::{DriveSignal, SignalEmitter, SignalListener};
