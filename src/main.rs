use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Context;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};

use arcade_car::arcade::{ChassisState, InputFrame};
use arcade_car::audio::EngineAudio;
use arcade_car::debug_builders::{push_chassis_rays, DebugOverlay};
use arcade_car::input::{InputSampler, InputSource, NoisyInput, ScriptedInput};
use arcade_car::lights::{Light, Lights};
use arcade_car::physics::PhysicsWorld;
use arcade_car::settings::AppSettings;
use arcade_car::state::{TelemetryHub, VehicleSnapshot};
use arcade_car::vehicle::{CarController, ControlOutputs, VehicleHost};
use arcade_car::wheel_sync::{VisualTransform, WheelPoseSync};

/// Binds one controller to its rapier rig and scene visuals for a tick.
struct SceneHost<'a, S> {
    id: &'a str,
    physics: &'a mut PhysicsWorld,
    sampler: &'a mut InputSampler<S>,
    wheels: &'a mut WheelPoseSync,
}

impl<S: InputSource> VehicleHost for SceneHost<'_, S> {
    fn sample_input(&mut self) -> InputFrame {
        self.sampler.sample()
    }

    fn chassis_state(&self) -> ChassisState {
        self.physics.chassis_state(self.id).unwrap_or_default()
    }

    fn apply_controls(&mut self, outputs: &ControlOutputs) {
        self.physics.apply_controls(self.id, outputs);
    }

    fn sync_wheel_visuals(&mut self, outputs: &ControlOutputs) {
        self.wheels.sync(&self.physics.wheel_poses(self.id));
        self.wheels.set_trails(outputs.skid_trails);
    }
}

fn load_script(settings: &AppSettings) -> anyhow::Result<ScriptedInput> {
    match &settings.script {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read script {}", path.display()))?;
            ScriptedInput::from_json_str(&text)
                .with_context(|| format!("parse script {}", path.display()))
        }
        None => Ok(ScriptedInput::demo_lap()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let settings = AppSettings::from_args(std::env::args().skip(1))?;
    let dt = settings.dt();
    info!(
        tick_hz = settings.tick_hz,
        ticks = settings.ticks,
        preset = settings.preset.as_deref().unwrap_or("drift"),
        deceleration = settings.vehicle.drivetrain.deceleration_enabled,
        traction = settings.vehicle.traction.is_some(),
        "starting arcade car"
    );

    let mut physics = PhysicsWorld::new();
    let id = uuid::Uuid::new_v4().to_string();
    physics.spawn_car(&id, [0.0, 1.5, 0.0], settings.host.clone());

    let mut controller = CarController::new(settings.vehicle.clone(), &physics.wheel_offsets_z(&id))
        .context("build car controller")?;
    info!(%id, roles = ?controller.roles(), "controller ready");

    let audio = Rc::new(RefCell::new(EngineAudio::new(settings.audio)));
    controller.signals_mut().subscribe(Rc::clone(&audio));
    for cue in audio.borrow().start() {
        debug!(?cue, "audio cue");
    }

    // Headless scene: one mesh and one trail per physics wheel.
    let wheel_names = ["Wheel_FL", "Wheel_FR", "Wheel_RL", "Wheel_RR"];
    let wheel_count = settings.host.wheel_offsets.len();
    let mut wheels = WheelPoseSync::from_scene(
        (0..wheel_count).map(|i| match wheel_names.get(i) {
            Some(name) => VisualTransform::named(*name),
            None => VisualTransform::named(format!("Wheel_{i}")),
        }),
        wheel_count,
    );
    let mut lights = Lights::from_scene([
        Light::new("Light_L", false),
        Light::new("Light_R", false),
        Light::new("BackLight_L", false),
        Light::new("BackLight_R", false),
    ]);

    let script = load_script(&settings)?;
    let jitter = if settings.seed.is_some() { settings.steer_jitter } else { 0.0 };
    let source = NoisyInput::new(script, settings.seed.unwrap_or(0), jitter);
    let mut sampler = InputSampler::new(source, settings.bindings);

    let mut telemetry = TelemetryHub::new();
    let printer = if settings.telemetry {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        telemetry.register_client(tx);
        Some(tokio::spawn(async move {
            while let Some(line) = rx.recv().await {
                println!("{line}");
            }
        }))
    } else {
        None
    };

    let mut overlay = DebugOverlay::default();
    let mut ticker = interval(Duration::from_secs_f32(dt));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }

        let outputs = {
            let mut host = SceneHost {
                id: &id,
                physics: &mut physics,
                sampler: &mut sampler,
                wheels: &mut wheels,
            };
            controller.run_tick(dt, &mut host)
        };

        let raw = *sampler.last_raw();
        lights.update(raw.headlight_toggle, raw.brake_light);

        let chassis = physics.chassis_state(&id).unwrap_or_default();
        let speed = chassis.velocity.norm();
        let handbrake = sampler.frame_from(&raw).handbrake;
        audio.borrow_mut().update(speed, handbrake);

        physics.step(dt);

        let position = physics.chassis_position(&id).unwrap_or_default();
        overlay.clear();
        push_chassis_rays(&mut overlay, position, &chassis, &sampler.frame_from(&raw));

        telemetry.tick = controller.ticks();
        let engine = audio.borrow();
        telemetry.broadcast(vec![VehicleSnapshot {
            id: id.clone(),
            position,
            speed,
            regime: outputs.regime,
            slip_angle: outputs.slip_angle,
            steer_angle: outputs.steer_angle,
            accelerating: engine.accelerating(),
            skid_trails: outputs.skid_trails,
            headlights: lights.headlights_on(),
            brake_lights: lights.brake_lights_on(),
            engine_pitch: engine.pitch,
            state: *controller.state(),
            wheels: outputs.wheels.clone(),
            debug: overlay.clone(),
        }]);
        drop(engine);

        if settings.ticks > 0 && controller.ticks() >= settings.ticks {
            break;
        }
    }

    let regime = controller.regime();
    info!(
        ticks = controller.ticks(),
        regime = ?regime.current,
        transitions = regime.transitions,
        position = ?physics.chassis_position(&id),
        "run finished"
    );

    drop(telemetry);
    if let Some(printer) = printer {
        printer.await.context("telemetry printer")?;
    }
    Ok(())
}
