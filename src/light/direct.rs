use crate::config::{LightPass, RadConfig};
use crate::entities::{Entity, EntityList};
use crate::float_types::{DEG_TO_RAD, Real};
use crate::patch::PatchTable;
use crate::patch::reflectivity::color_normalize;
use nalgebra::{Point3, Vector3};

/// Intensity of a light entity without a `light` key.
pub const DEFAULT_LIGHT_INTENSITY: Real = 100.0;

/// Spot cone in degrees when `_cone` is missing.
pub const DEFAULT_SPOT_CONE: Real = 10.0;

/// Distance at which an inverse-square point light delivers its intensity.
pub const FALLOFF_REFERENCE: Real = 64.0;

/// Ambient colors are given in [0, 1] and scaled into lightmap units.
pub const AMBIENT_SCALE: Real = 128.0;

const ANGLE_UP: Real = -1.0;
const ANGLE_DOWN: Real = -2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    /// Emissive patch
    Surface,
    Point,
    Spot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectLight {
    pub kind: LightKind,
    pub intensity: Real,
    pub origin: Point3<Real>,
    /// Brightest channel is 1
    pub color: Vector3<Real>,
    /// Facing of surface and spot lights
    pub normal: Vector3<Real>,
    /// Cosine of the spot cutoff angle
    pub stopdot: Real,
}

/// Directional light of the current pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Sun {
    pub intensity: Real,
    /// Unit vector pointing at the sun
    pub dir: Vector3<Real>,
    pub color: Vector3<Real>,
}

/// Every emitter of one pass.
#[derive(Debug, Clone, Default)]
pub struct LightSet {
    pub lights: Vec<DirectLight>,
    pub sun: Option<Sun>,
    pub ambient: Vector3<Real>,
}

impl LightSet {
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }
}

/// Emissive patches and light entities as a flat light list.
///
/// The energy of an emissive patch is sent as a surface light here, so its
/// `totallight` is cleared.
pub fn collect_lights(patches: &mut PatchTable, entities: &EntityList, config: &RadConfig) -> LightSet {
    let mut set = LightSet::default();

    for patch in patches.iter_mut() {
        if patch.totallight == Vector3::zeros() {
            continue;
        }
        let (color, max) = color_normalize(&patch.totallight);
        set.lights.push(DirectLight {
            kind: LightKind::Surface,
            intensity: max * patch.area * config.direct_scale,
            origin: patch.origin,
            color,
            normal: patch.plane.normal,
            stopdot: 0.0,
        });
        patch.totallight = Vector3::zeros();
    }
    let surfaces = set.lights.len();

    for entity in entities.iter() {
        let classname = entity.classname();
        if !classname.starts_with("light") {
            continue;
        }
        if config.pass == LightPass::Day && entity.int_for_key("spawnflags") & 1 == 0 {
            continue;
        }
        set.lights.push(entity_light(entity, entities, config));
    }

    if let Some(world) = entities.worldspawn() {
        set.sun = world_sun(world, config.pass);
        set.ambient = world.vector_for_key(&format!("ambient_{}", config.pass.key_suffix())) * AMBIENT_SCALE;
    }

    log::info!(
        "{} direct lights ({} surface, {} entity), sun: {}",
        set.lights.len(),
        surfaces,
        set.lights.len() - surfaces,
        set.sun.is_some()
    );
    set
}

fn entity_light(entity: &Entity, entities: &EntityList, config: &RadConfig) -> DirectLight {
    let origin = entity.origin();

    let mut intensity = entity.float_for_key("light");
    if intensity == 0.0 {
        intensity = DEFAULT_LIGHT_INTENSITY;
    }

    let color = color_normalize(&entity.vector_for_key("_color")).0;
    let color = if color == Vector3::zeros() {
        Vector3::repeat(1.0)
    } else {
        color
    };

    let mut light = DirectLight {
        kind: LightKind::Point,
        intensity: intensity * config.entity_scale,
        origin,
        color,
        normal: Vector3::zeros(),
        stopdot: 0.0,
    };

    let target = entity.value_for_key("target").filter(|t| !t.is_empty());
    if entity.classname() == "light_spot" || target.is_some() {
        light.kind = LightKind::Spot;

        let mut cone = entity.float_for_key("_cone");
        if cone == 0.0 {
            cone = DEFAULT_SPOT_CONE;
        }
        light.stopdot = (cone * DEG_TO_RAD).cos();
        light.normal = angle_direction(entity.float_for_key("angle"));

        if let Some(target) = target {
            match entities.find_target(target) {
                Some(dest) => {
                    if let Some(dir) = (dest.origin() - origin).try_normalize(Real::EPSILON) {
                        light.normal = dir;
                    }
                },
                None => log::warn!(
                    "spotlight at {} {} {} has missing target {target}",
                    origin.x,
                    origin.y,
                    origin.z
                ),
            }
        }
    }

    light
}

/// Facing from an `angle` key: a yaw, or straight up or down.
fn angle_direction(angle: Real) -> Vector3<Real> {
    if angle == ANGLE_UP {
        Vector3::z()
    } else if angle == ANGLE_DOWN {
        -Vector3::z()
    } else {
        let yaw = angle * DEG_TO_RAD;
        Vector3::new(yaw.cos(), yaw.sin(), 0.0)
    }
}

/// The pass's sun from `light_<pass>`, `angles_<pass>` (pitch yaw in
/// degrees) and `color_<pass>`.
fn world_sun(world: &Entity, pass: LightPass) -> Option<Sun> {
    let suffix = pass.key_suffix();
    let intensity = world.float_for_key(&format!("light_{suffix}"));
    if intensity <= 0.0 {
        return None;
    }

    let angles = world.vector_for_key(&format!("angles_{suffix}")) * DEG_TO_RAD;
    let (pitch, yaw) = (angles.x, angles.y);
    let dir = Vector3::new(yaw.cos() * pitch.sin(), yaw.sin() * pitch.sin(), pitch.cos());

    let color = color_normalize(&world.vector_for_key(&format!("color_{suffix}"))).0;
    let color = if color == Vector3::zeros() {
        Vector3::repeat(1.0)
    } else {
        color
    };

    Some(Sun {
        intensity,
        dir,
        color,
    })
}
