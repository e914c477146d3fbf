use glam::DVec3;

/// What a trace struck and where
#[derive(Debug, Clone, PartialEq)]
pub struct RayTraceHit<T> {
    target: T,
    hit_position: DVec3,
}

impl<T> RayTraceHit<T> {
    pub fn new(target: T, hit_position: DVec3) -> Self {
        Self {
            target,
            hit_position,
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    /// Exact point where the ray met the target
    pub fn hit_position(&self) -> DVec3 {
        self.hit_position
    }

    pub fn into_target(self) -> T {
        self.target
    }

    /// Distance from `origin` to the hit point
    pub fn distance_from(&self, origin: DVec3) -> f64 {
        self.hit_position.distance(origin)
    }
}
