//! Fire example: the preset effect with a Y-constrained billboard so the
//! flames stay upright however the camera tilts.

use embers::prelude::*;

fn main() -> Result<(), embers::RunError> {
    env_logger::init();

    let setup = EmitterSetup::new(
        Emitter::new(EmitterConfig::fire(Vec3::ZERO)),
        SpriteImage::soft_circle(64),
        StreamMode::CompactRecords,
    );

    run("embers - fire", vec![setup])
}
