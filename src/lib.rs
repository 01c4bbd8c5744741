pub mod arcade;
pub mod audio;
pub mod debug_builders;
pub mod input;
pub mod lights;
pub mod physics;
pub mod settings;
pub mod state;
pub mod vehicle;
pub mod wheel_sync;
