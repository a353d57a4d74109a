use bevy::prelude::*;

/// Simulation frame counter, bumped once per app update.
#[derive(Resource, Default, Reflect, Hash, Clone, Copy, Debug, PartialEq, Eq)]
#[reflect(Hash)]
pub struct FrameCount {
    pub frame: u32,
}

impl std::fmt::Display for FrameCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}|{}", self.frame, self.frame % 60)
    }
}

pub fn increase_frame_system(mut frame_count: ResMut<FrameCount>) {
    frame_count.frame = frame_count.frame.wrapping_add(1);
}
