// Spatial query seam used by hitboxes and target acquisition

use glam::Vec3;

/// Identifier of an entity known to the spatial index
pub type EntityId = u32;

/// Sphere used for hit detection and target acquisition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitVolume {
    pub center: Vec3,
    pub radius: f32,
}

impl HitVolume {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    /// Whether a body of `body_radius` at `point` overlaps this volume
    pub fn overlaps(&self, point: Vec3, body_radius: f32) -> bool {
        let reach = self.radius + body_radius.max(0.0);
        self.center.distance_squared(point) <= reach * reach
    }
}

/// Broad-phase lookup of entities inside a volume
pub trait SpatialQuery {
    /// Entities whose bodies overlap `volume`, in no particular order
    fn find_candidate_targets(&self, volume: &HitVolume) -> Vec<EntityId>;
}
