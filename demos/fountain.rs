//! Fountain example: two staggered fountains sharing one window, one per
//! streaming mode. They should be indistinguishable apart from position.

use embers::prelude::*;

fn main() -> Result<(), embers::RunError> {
    env_logger::init();

    let left = EmitterSetup::new(
        Emitter::new(EmitterConfig::fountain(Vec3::new(-0.8, -0.8, 0.0))),
        SpriteImage::soft_circle(32),
        StreamMode::ExpandedQuads,
    );
    let right = EmitterSetup::new(
        Emitter::new(EmitterConfig::fountain(Vec3::new(0.8, -0.8, 0.0))),
        SpriteImage::soft_circle(32),
        StreamMode::CompactRecords,
    );

    run("embers - fountain", vec![left, right])
}
