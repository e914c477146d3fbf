//! What is the observer looking at?
//!
//! Builds a small world with a wall and two entities, then traces from an
//! observer's eyes for the nearest entity and the first solid block.

use glam::DVec3;
use hearth_raytrace::{
    block_ray_trace, entity_ray_trace, BlockId, BoxEntity, Living, Observer, SparseWorld, VoxelPos,
    WorldKey, WorldRegistry,
};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut world = SparseWorld::new("overworld");
    for y in 64..68 {
        for z in -2..3 {
            world.set_block(VoxelPos::new(8, y, z), BlockId::STONE);
        }
    }
    world.set_block(VoxelPos::new(3, 65, 0), BlockId::GLASS);
    world.spawn(BoxEntity::centered(1, DVec3::new(5.5, 65.5, 0.5), DVec3::new(0.3, 0.9, 0.3)));
    world.spawn(BoxEntity::centered(2, DVec3::new(6.5, 65.5, 0.5), DVec3::new(0.3, 0.9, 0.3)));

    let mut worlds = WorldRegistry::new();
    worlds.load(world);

    let observer = Observer {
        world: WorldKey::from("overworld"),
        feet: DVec3::new(0.5, 64.0, 0.5),
        eye_height: 1.62,
    };
    let looking = DVec3::new(1.0, 0.0, 0.0);

    let mut blocks = block_ray_trace();
    blocks.source_eye_position(&observer).direction(looking);
    match blocks.execute(&worlds)? {
        Some(hit) => println!(
            "Block: {} at {:?}, {:.2} blocks away",
            hit.target().block,
            hit.target().position,
            hit.distance_from(observer.eye_position())
        ),
        None => println!("Block: nothing in range"),
    }

    // Glass counts as see-through, and entity 1 is a ghost we look past
    let mut entities = entity_ray_trace();
    entities
        .source_eye_position(&observer)
        .direction(looking)
        .limit(16)?
        .continue_while_block(|located| {
            located.block == BlockId::AIR || located.block == BlockId::GLASS
        })
        .select(|entity: &BoxEntity| entity.id != 1);
    match entities.execute(&worlds)? {
        Some(hit) => println!(
            "Entity: #{} hit at {:?}",
            hit.target().id,
            hit.hit_position()
        ),
        None => println!("Entity: nothing in sight"),
    }

    Ok(())
}
