//! Smoke example: slow gray puffs with per-particle rotation and a sprite
//! sheet whose frames shrink, so each puff appears to dissolve as it ages.

use embers::prelude::*;

fn main() -> Result<(), embers::RunError> {
    env_logger::init();

    let config = EmitterConfig::smoke(Vec3::new(0.0, -0.5, 0.0))
        .with_sprite_sheet(SpriteSheet::new(4, 2));

    let setup = EmitterSetup::new(
        Emitter::new(config),
        SpriteImage::soft_circle_sheet(4, 2, 64),
        StreamMode::ExpandedQuads,
    );

    run("embers - smoke", vec![setup])
}
