//! Scripted input standing in for a keyboard and mouse

use glam::Vec2;
use landfall_physics::{ControlIntents, Launch, ViewPose};

use crate::config::RunConfig;

/// Intents for `frame`: always walking forward while slowly turning, with
/// periodic jumps and throws along the current view direction
pub fn intents_for(frame: u64, run: &RunConfig, view: &ViewPose) -> ControlIntents {
    let launch = every(frame, run.launch_every).then(|| Launch {
        charge_secs: run.launch_charge,
        direction: view.forward(),
    });

    ControlIntents {
        forward: true,
        jump: every(frame, run.jump_every),
        look: Vec2::new(run.turn_rate, 0.0),
        launch,
        ..Default::default()
    }
}

fn every(frame: u64, period: u64) -> bool {
    period > 0 && frame > 0 && frame % period == 0
}
