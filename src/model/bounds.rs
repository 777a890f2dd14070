use glam::{Mat4, Vec3};

/// Axis-aligned bounding box given by its min and max corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Degenerate box holding a single point
    pub fn from_point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::from_point(first), |acc, p| acc.expanded_to(p)))
    }

    pub fn expanded_to(&self, p: Vec3) -> Self {
        Self {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    pub fn union(&self, other: &Aabb) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Box enclosing all 8 corners after transformation.
    /// Under rotation this is looser than the transformed volume.
    pub fn transformed(&self, m: &Mat4) -> Self {
        let corners = self.corners().map(|c| m.transform_point3(c));
        // 8 corners, never empty
        Self::from_points(corners).unwrap_or(*self)
    }

    /// Boundary counts as inside
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_point_is_inclusive() {
        let b = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        assert!(b.contains_point(Vec3::ZERO));
        assert!(b.contains_point(Vec3::new(1.0, -1.0, 1.0)));
        assert!(!b.contains_point(Vec3::new(1.01, 0.0, 0.0)));
    }

    #[test]
    fn test_transformed_by_translation_and_scale() {
        let b = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let m = Mat4::from_translation(Vec3::new(3.0, 0.0, 0.0)) * Mat4::from_scale(Vec3::splat(2.0));
        let t = b.transformed(&m);
        assert_eq!(t.min, Vec3::new(1.0, -2.0, -2.0));
        assert_eq!(t.max, Vec3::new(5.0, 2.0, 2.0));
    }

    #[test]
    fn test_transformed_by_rotation_stays_axis_aligned() {
        let b = Aabb::new(Vec3::new(-2.0, -0.5, -0.5), Vec3::new(2.0, 0.5, 0.5));
        let t = b.transformed(&Mat4::from_rotation_y(std::f32::consts::FRAC_PI_2));
        // long axis now runs along z
        assert!((t.max.z - 2.0).abs() < 1e-5);
        assert!((t.max.x - 0.5).abs() < 1e-5);
        assert!(t.min.x <= t.max.x && t.min.z <= t.max.z);
    }

    #[test]
    fn test_from_points_and_union() {
        assert!(Aabb::from_points(std::iter::empty()).is_none());
        let a = Aabb::from_points([Vec3::ZERO, Vec3::new(1.0, 2.0, -1.0)]).unwrap();
        assert_eq!(a.min, Vec3::new(0.0, 0.0, -1.0));
        let u = a.union(&Aabb::from_point(Vec3::splat(5.0)));
        assert_eq!(u.max, Vec3::splat(5.0));
        assert_eq!(u.min, Vec3::new(0.0, 0.0, -1.0));
    }
}
