//! Sparks example: a fast burst emitter under gravity. The spawn rate is
//! deliberately higher than the pool can hold so the oldest sparks recycle
//! while the effect keeps its shape.

use embers::prelude::*;

fn main() -> Result<(), embers::RunError> {
    env_logger::init();

    // Halve the pool relative to the preset to force steady recycling.
    let config = EmitterConfig::sparks(Vec3::ZERO).with_max_particles(280);

    let setup = EmitterSetup::new(
        Emitter::new(config),
        SpriteImage::soft_circle(32),
        StreamMode::CompactRecords,
    );

    run("embers - sparks", vec![setup])
}
