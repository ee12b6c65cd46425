mod support;

use radlight::{
    RadWorld,
    bsp::{SurfaceFlags, Tile},
    config::{LightPass, RadConfig},
    errors::BakeError,
    light_tile,
    patch::NullTextures,
    scheduler::{JobRunner, SerialRunner},
    write_light_lump,
};
use support::init_logging;

/// Runs jobs last to first, results still in index order.
struct ReverseRunner;

impl JobRunner for ReverseRunner {
    fn run<T, F>(&self, _label: &str, count: usize, job: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        let mut out: Vec<T> = (0..count).rev().map(&job).collect();
        out.reverse();
        out
    }
}

fn bake(tile: &mut Tile, config: &RadConfig) -> radlight::BakeStats {
    light_tile(tile, config, &NullTextures, &SerialRunner::new()).unwrap()
}

/// RGB bytes of one face of the pass.
fn face_bytes(tile: &Tile, pass: LightPass, face: usize, samples: usize) -> &[u8] {
    let offset = tile.faces[face].light_offset[pass.index()].unwrap();
    &tile.light_data[pass.index()][offset..offset + samples * 3]
}

// face 0 is 7x9 samples, face 1 is 5x9
const FACE0_SAMPLES: usize = 7 * 9;
const FACE1_SAMPLES: usize = 5 * 9;

#[test]
fn slab_room_bakes_in_face_order() {
    init_logging();
    let mut tile = support::slab_room();
    let stats = bake(&mut tile, &RadConfig::default());

    assert_eq!(stats.patches, 8);
    assert_eq!(stats.direct_lights, 1);
    assert_eq!(stats.lit_faces, 2);
    assert_eq!(stats.light_bytes, (FACE0_SAMPLES + FACE1_SAMPLES) * 3);

    assert_eq!(tile.faces[0].light_offset, [Some(0), None]);
    assert_eq!(tile.faces[1].light_offset, [Some(FACE0_SAMPLES * 3), None]);
    assert_eq!(tile.light_data[0].len(), stats.light_bytes);
    assert!(tile.light_data[1].is_empty());
}

#[test]
fn light_falls_off_from_below_the_lamp() {
    let mut tile = support::slab_room();
    bake(&mut tile, &RadConfig::default());

    let face = face_bytes(&tile, LightPass::Night, 0, FACE0_SAMPLES);
    // sample (3, 4) sits right under the light
    let center = 3 * (4 * 7 + 3);
    assert_eq!(&face[center..center + 3], &[255, 255, 255]);
    let corner = &face[0..3];
    assert!(corner[0] > 1 && corner[0] < 64, "{corner:?}");
    assert!(corner.iter().all(|&c| c == corner[0]));
}

#[test]
fn occluded_face_gets_only_the_floor_value() {
    let mut tile = support::slab_room();
    bake(&mut tile, &RadConfig::default());
    let face = face_bytes(&tile, LightPass::Night, 1, FACE1_SAMPLES);
    assert!(face.iter().all(|&b| b == 1), "{face:?}");
}

#[test]
fn sun_reaches_past_the_slab() {
    let mut tile = support::slab_room();
    tile.entity_string = tile.entity_string.replacen(
        "\"worldspawn\"",
        "\"worldspawn\"\n\"light_night\" \"100\"\n\"angles_night\" \"0 0\"",
        1,
    );
    bake(&mut tile, &RadConfig::default());

    let face = face_bytes(&tile, LightPass::Night, 1, FACE1_SAMPLES);
    assert!(face.iter().all(|&b| b == 100), "{face:?}");
}

#[test]
fn ambient_lifts_every_sample() {
    let mut tile = support::slab_room();
    tile.entity_string = tile
        .entity_string
        .replacen("\"worldspawn\"", "\"worldspawn\"\n\"ambient_night\" \"0.25 0.25 0.25\"", 1);
    bake(&mut tile, &RadConfig::default());

    let face = face_bytes(&tile, LightPass::Night, 1, FACE1_SAMPLES);
    assert!(face.iter().all(|&b| b == 32), "{face:?}");
}

#[test]
fn job_order_does_not_change_the_lump() {
    let config = RadConfig {
        num_bounce: 1,
        ..RadConfig::default()
    };
    let mut serial = support::lit_wall_room();
    light_tile(&mut serial, &config, &NullTextures, &SerialRunner::new()).unwrap();
    let mut reversed = support::lit_wall_room();
    light_tile(&mut reversed, &config, &NullTextures, &ReverseRunner).unwrap();

    assert_eq!(serial.light_data, reversed.light_data);
    assert_eq!(serial.faces, reversed.faces);
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_bake_matches_serial() {
    use radlight::scheduler::ParallelRunner;

    let mut serial = support::slab_room();
    bake(&mut serial, &RadConfig::default());
    let mut parallel = support::slab_room();
    let runner = ParallelRunner::new(Some(2)).unwrap();
    light_tile(&mut parallel, &RadConfig::default(), &NullTextures, &runner).unwrap();

    assert_eq!(serial.light_data, parallel.light_data);
    assert_eq!(serial.faces, parallel.faces);
}

#[test]
fn bounced_light_brightens_the_floor() {
    let mut direct = support::lit_wall_room();
    bake(&mut direct, &RadConfig::default());
    let mut bounced = support::lit_wall_room();
    let config = RadConfig {
        num_bounce: 2,
        ..RadConfig::default()
    };
    bake(&mut bounced, &config);

    let samples = 9 * 9;
    let direct = face_bytes(&direct, LightPass::Night, 0, samples);
    let bounced = face_bytes(&bounced, LightPass::Night, 0, samples);
    assert!(direct.iter().zip(bounced).all(|(d, b)| b >= d));
    let sum = |bytes: &[u8]| bytes.iter().map(|&b| b as u32).sum::<u32>();
    assert!(sum(bounced) > sum(direct));
}

#[test]
fn bounce_gathers_samples_onto_patches() {
    let tile = support::lit_wall_room();
    let config = RadConfig {
        num_bounce: 1,
        ..RadConfig::default()
    };
    let runner = SerialRunner::new();
    let mut world = RadWorld::new(&tile, &config, &NullTextures).unwrap();
    let facelights = world.build_facelights(&runner).unwrap();
    assert_eq!(facelights.len(), 2);

    // the wall patch nearest the light saw it
    let lit = world.patches().iter().filter(|p| p.face == 1 && p.samples > 0).count();
    assert!(lit > 0);
    world.bounce(&runner).unwrap();
    assert!(
        world
            .patches()
            .iter()
            .any(|p| p.face == 0 && p.totallight.sum() > 0.0)
    );
}

#[test]
fn warp_faces_are_not_lit() {
    let mut tile = support::slab_room();
    tile.texinfo[1].flags = SurfaceFlags::WARP;
    let stats = bake(&mut tile, &RadConfig::default());

    assert_eq!(stats.lit_faces, 1);
    assert_eq!(tile.faces[1].light_offset, [None, None]);
    assert_eq!(tile.light_data[0].len(), FACE0_SAMPLES * 3);
}

#[test]
fn phong_on_a_flat_face_changes_nothing() {
    let mut flat = support::slab_room();
    bake(&mut flat, &RadConfig::default());
    let mut phong = support::slab_room();
    phong.texinfo[0].flags = SurfaceFlags::PHONG;
    bake(&mut phong, &RadConfig::default());
    assert_eq!(flat.light_data, phong.light_data);
}

#[test]
fn day_and_night_fill_separate_lumps() {
    let mut tile = support::slab_room();
    bake(&mut tile, &RadConfig::default());
    let night = tile.light_data[0].clone();

    let day = RadConfig {
        pass: LightPass::Day,
        ..RadConfig::default()
    };
    let stats = bake(&mut tile, &day);
    // the light has no day spawnflag
    assert_eq!(stats.direct_lights, 0);
    assert_eq!(tile.light_data[0], night);
    assert!(tile.light_data[1].iter().all(|&b| b == 1));
    assert_eq!(tile.faces[1].light_offset, [Some(FACE0_SAMPLES * 3), Some(FACE0_SAMPLES * 3)]);
}

#[test]
fn rebaking_replaces_the_lump() {
    let mut tile = support::slab_room();
    bake(&mut tile, &RadConfig::default());
    let first = tile.light_data[0].clone();
    bake(&mut tile, &RadConfig::default());
    assert_eq!(tile.light_data[0], first);
}

#[test]
fn coarser_quant_shrinks_the_lightmap() {
    let mut tile = support::slab_room();
    let config = RadConfig {
        light_quant_override: Some(5),
        ..RadConfig::default()
    };
    let stats = bake(&mut tile, &config);
    // 32 unit luxels, 4x5 on both faces
    assert_eq!(stats.light_bytes, (4 * 5 + 4 * 5) * 3);
}

#[test]
fn extra_samples_still_light_the_lamp_spot() {
    let mut tile = support::slab_room();
    let config = RadConfig {
        extra_samples: true,
        ..RadConfig::default()
    };
    bake(&mut tile, &config);
    let face = face_bytes(&tile, LightPass::Night, 0, FACE0_SAMPLES);
    let center = 3 * (4 * 7 + 3);
    assert_eq!(face[center], 255);
}

#[test]
fn light_data_overflow_is_an_error() {
    let mut tile = support::slab_room();
    let config = RadConfig {
        max_light_data: 200,
        ..RadConfig::default()
    };
    match light_tile(&mut tile, &config, &NullTextures, &SerialRunner::new()) {
        Err(BakeError::LightDataOverflow { size, max }) => {
            assert_eq!(max, 200);
            assert_eq!(size, (FACE0_SAMPLES + FACE1_SAMPLES) * 3);
        },
        other => panic!("expected an overflow, got {other:?}"),
    }
}

#[test]
fn lump_writer_skips_unlit_faces() {
    let mut tile = support::slab_room();
    let size = write_light_lump(&mut tile, LightPass::Day, vec![None, Some(vec![9, 9, 9])], 16).unwrap();
    assert_eq!(size, 3);
    assert_eq!(tile.faces[0].light_offset[1], None);
    assert_eq!(tile.faces[1].light_offset[1], Some(0));
    assert_eq!(tile.light_data[1], vec![9, 9, 9]);
}

#[test]
fn empty_tiles_are_rejected() {
    let mut tile = Tile::default();
    assert!(matches!(
        light_tile(&mut tile, &RadConfig::default(), &NullTextures, &SerialRunner::new()),
        Err(BakeError::EmptyWorld)
    ));
}

#[test]
fn configured_runner_bakes_like_serial() {
    let mut serial = support::slab_room();
    bake(&mut serial, &RadConfig::default());

    let config = RadConfig {
        threads: Some(1),
        ..RadConfig::default()
    };
    let mut pooled = support::slab_room();
    light_tile(&mut pooled, &config, &NullTextures, &config.runner().unwrap()).unwrap();
    assert_eq!(serial.light_data, pooled.light_data);
}

#[test]
fn face_without_edges_is_corrupt() {
    let mut tile = support::slab_room();
    tile.faces[1].num_edges = 0;
    assert!(matches!(
        light_tile(&mut tile, &RadConfig::default(), &NullTextures, &SerialRunner::new()),
        Err(BakeError::CorruptTile(_))
    ));
}

#[test]
fn light_quantum_out_of_range_is_an_error() {
    let mut tile = support::slab_room();
    let config = RadConfig {
        light_quant_override: Some(40),
        ..RadConfig::default()
    };
    assert!(matches!(
        light_tile(&mut tile, &config, &NullTextures, &SerialRunner::new()),
        Err(BakeError::InvalidConfig { key: "light_quant_override", .. })
    ));

    tile.light_quant = 40;
    assert!(matches!(
        light_tile(&mut tile, &RadConfig::default(), &NullTextures, &SerialRunner::new()),
        Err(BakeError::CorruptTile(_))
    ));
}

#[test]
fn bounce_refuses_too_many_patches() {
    let mut tile = support::lit_wall_room();
    let config = RadConfig {
        num_bounce: 1,
        max_transfer_patches: 2,
        ..RadConfig::default()
    };
    match light_tile(&mut tile, &config, &NullTextures, &SerialRunner::new()) {
        Err(BakeError::TransferOverflow { patches, max }) => {
            assert_eq!(max, 2);
            assert!(patches > 2);
        },
        other => panic!("expected a transfer overflow, got {other:?}"),
    }

    // the cap only matters when bouncing
    let direct = RadConfig {
        max_transfer_patches: 2,
        ..RadConfig::default()
    };
    assert!(light_tile(&mut tile, &direct, &NullTextures, &SerialRunner::new()).is_ok());
}

#[test]
fn world_keeps_back_planes() {
    let tile = support::slab_room();
    let config = RadConfig::default();
    let world = RadWorld::new(&tile, &config, &NullTextures).unwrap();
    assert_eq!(world.backplanes().len(), tile.planes.len());
    for (back, plane) in world.backplanes().iter().zip(&tile.planes) {
        assert_eq!(back.normal, -plane.normal);
        assert_eq!(back.dist, -plane.dist);
    }
}
