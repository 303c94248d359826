//! Loading of the bundled demo configurations.

use std::path::PathBuf;

use jointctl_common::config::ConfigLoader;
use jointctl_common::controller::config::ControllerConfig;
use jointctl_sim::SimCore;
use jointctl_sim::config::SimConfig;

/// `config/` at the workspace root.
pub fn config_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../config")
}

pub fn load_pair(controller: &str, sim: &str) -> (ControllerConfig, SimConfig) {
    let dir = config_dir();
    let controller = jointctl_controller::config::load_config(&dir.join(controller)).unwrap();
    let sim = SimConfig::load(&dir.join(sim)).unwrap();
    (controller, sim)
}

pub fn autobox() -> (ControllerConfig, SimConfig) {
    load_pair("autobox.toml", "autobox_sim.toml")
}

pub fn cylinder_lights() -> (ControllerConfig, SimConfig) {
    load_pair("cylinder_lights.toml", "cylinder_lights_sim.toml")
}

pub fn core_for((controller, sim): &(ControllerConfig, SimConfig)) -> SimCore {
    SimCore::new(controller, sim).unwrap()
}
