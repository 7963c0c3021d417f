use embers::prelude::*;
use embers::RunError;

fn main() -> Result<(), RunError> {
    env_logger::init();

    let scene = std::env::args().nth(1).unwrap_or_else(|| "all".to_string());
    let setups = match scene.as_str() {
        "fire" => vec![fire(Vec3::ZERO)],
        "smoke" => vec![smoke(Vec3::ZERO)],
        "sparks" => vec![sparks(Vec3::ZERO)],
        "fountain" => vec![fountain(Vec3::ZERO)],
        // A small campfire arrangement exercising both streaming modes.
        _ => vec![
            fire(Vec3::new(0.0, -0.4, 0.0)),
            smoke(Vec3::new(0.0, 0.1, 0.0)),
            sparks(Vec3::new(0.0, -0.35, 0.0)),
            fountain(Vec3::new(1.4, -0.4, 0.0)),
        ],
    };

    run(&format!("embers - {}", scene), setups)
}

fn fire(position: Vec3) -> EmitterSetup {
    EmitterSetup::new(
        Emitter::new(EmitterConfig::fire(position)),
        SpriteImage::soft_circle(64),
        StreamMode::CompactRecords,
    )
}

fn smoke(position: Vec3) -> EmitterSetup {
    // The shrinking-frame sheet reads as the puff dissolving.
    let config = EmitterConfig::smoke(position).with_sprite_sheet(SpriteSheet::new(4, 2));
    EmitterSetup::new(
        Emitter::new(config),
        SpriteImage::soft_circle_sheet(4, 2, 64),
        StreamMode::ExpandedQuads,
    )
}

fn sparks(position: Vec3) -> EmitterSetup {
    EmitterSetup::new(
        Emitter::new(EmitterConfig::sparks(position)),
        SpriteImage::soft_circle(32),
        StreamMode::CompactRecords,
    )
}

fn fountain(position: Vec3) -> EmitterSetup {
    EmitterSetup::new(
        Emitter::new(EmitterConfig::fountain(position)),
        SpriteImage::soft_circle(32),
        StreamMode::ExpandedQuads,
    )
}
