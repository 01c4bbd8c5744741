use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use crate::arcade::{TractionRegime, WheelCommand};
use crate::debug_builders::DebugOverlay;
use crate::vehicle::VehicleState;

#[derive(Debug, Clone, Serialize)]
pub struct VehicleSnapshot {
    pub id: String,
    pub position: [f32; 3],
    pub speed: f32,
    pub regime: Option<TractionRegime>,
    pub slip_angle: f32,
    pub steer_angle: f32,
    pub accelerating: bool,
    pub skid_trails: bool,
    pub headlights: bool,
    pub brake_lights: bool,
    pub engine_pitch: f32,
    pub state: VehicleState,
    pub wheels: Vec<WheelCommand>,
    pub debug: DebugOverlay,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub vehicles: Vec<VehicleSnapshot>,
}

/// Fans per-tick JSON snapshots out to in-process subscribers.
#[derive(Debug, Default)]
pub struct TelemetryHub {
    pub tick: u64,
    pub clients: Vec<UnboundedSender<String>>,
}

impl TelemetryHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_client(&mut self, tx: UnboundedSender<String>) {
        self.clients.push(tx);
    }

    /// Serialize once, send to every client, drop the ones that hung up.
    pub fn broadcast(&mut self, vehicles: Vec<VehicleSnapshot>) {
        if self.clients.is_empty() {
            return;
        }

        let json = match serde_json::to_string(&Snapshot { tick: self.tick, vehicles }) {
            Ok(json) => json,
            Err(err) => {
                warn!(tick = self.tick, %err, "snapshot serialization failed");
                return;
            }
        };

        self.clients.retain(|tx| tx.send(json.clone()).is_ok());
    }
}
