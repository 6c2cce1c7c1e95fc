/// Data-Oriented Axis-Aligned Bounding Box System
///
/// Pure functions for bounds tracking and visibility tests - no methods, just data transformations.
use cgmath::{Point3, Vector3};

/// Axis-Aligned Bounding Box - pure data structure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

/// Create new AABB from min/max points
pub fn create_aabb(min: Point3<f32>, max: Point3<f32>) -> AABB {
    AABB { min, max }
}

/// Create an inverted AABB that any expansion will overwrite
pub fn empty_aabb() -> AABB {
    AABB {
        min: Point3::new(f32::MAX, f32::MAX, f32::MAX),
        max: Point3::new(f32::MIN, f32::MIN, f32::MIN),
    }
}

/// True until at least one point has been added
pub fn aabb_is_empty(aabb: &AABB) -> bool {
    aabb.min.x > aabb.max.x || aabb.min.y > aabb.max.y || aabb.min.z > aabb.max.z
}

/// Grow AABB so it contains the point (mutating)
pub fn aabb_expand_to_point(aabb: &mut AABB, point: Point3<f32>) {
    aabb.min.x = aabb.min.x.min(point.x);
    aabb.min.y = aabb.min.y.min(point.y);
    aabb.min.z = aabb.min.z.min(point.z);
    aabb.max.x = aabb.max.x.max(point.x);
    aabb.max.y = aabb.max.y.max(point.y);
    aabb.max.z = aabb.max.z.max(point.z);
}

/// Corner of the AABB furthest along the given direction
/// Used by plane tests: if this corner is behind a plane, the whole box is
pub fn aabb_positive_vertex(aabb: &AABB, direction: Vector3<f32>) -> Point3<f32> {
    Point3::new(
        if direction.x >= 0.0 { aabb.max.x } else { aabb.min.x },
        if direction.y >= 0.0 { aabb.max.y } else { aabb.min.y },
        if direction.z >= 0.0 { aabb.max.z } else { aabb.min.z },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_from_empty() {
        let mut aabb = empty_aabb();
        assert!(aabb_is_empty(&aabb));

        aabb_expand_to_point(&mut aabb, Point3::new(1.0, 2.0, 3.0));
        assert!(!aabb_is_empty(&aabb));
        assert_eq!(aabb.min, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(aabb.max, Point3::new(1.0, 2.0, 3.0));

        aabb_expand_to_point(&mut aabb, Point3::new(-1.0, 5.0, 0.0));
        assert_eq!(aabb.min, Point3::new(-1.0, 2.0, 0.0));
        assert_eq!(aabb.max, Point3::new(1.0, 5.0, 3.0));
    }

    #[test]
    fn test_positive_vertex() {
        let aabb = create_aabb(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 4.0, 6.0));
        let p = aabb_positive_vertex(&aabb, Vector3::new(1.0, -1.0, 0.0));
        assert_eq!(p, Point3::new(2.0, 0.0, 6.0));
        let q = aabb_positive_vertex(&aabb, Vector3::new(-1.0, 1.0, -1.0));
        assert_eq!(q, Point3::new(0.0, 4.0, 0.0));
    }
}
