use lidarguard_core::{Point, PointCloud};

fn assert_bounds(min: [f32; 3], max: [f32; 3]) {
    assert!(
        (0..3).all(|a| min[a] < max[a]),
        "crop min must be componentwise below max"
    );
}

fn inside<P: Point>(p: &P, min: [f32; 3], max: [f32; 3]) -> bool {
    let pos = p.position();
    pos.iter().all(|v| v.is_finite()) && (0..3).all(|a| pos[a] >= min[a] && pos[a] <= max[a])
}

/// Keep only points inside the inclusive axis-aligned box `[min, max]`.
pub fn crop_box<P: Point>(cloud: &PointCloud<P>, min: [f32; 3], max: [f32; 3]) -> PointCloud<P> {
    assert_bounds(min, max);
    cloud
        .iter()
        .filter(|p| inside(*p, min, max))
        .copied()
        .collect()
}

/// Remove the points inside the box instead, keeping everything else.
/// Used to carve the ego vehicle's own returns out of a frame.
pub fn crop_box_inverse<P: Point>(
    cloud: &PointCloud<P>,
    min: [f32; 3],
    max: [f32; 3],
) -> PointCloud<P> {
    assert_bounds(min, max);
    cloud
        .iter()
        .filter(|p| !inside(*p, min, max))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{crop_box, crop_box_inverse};
    use lidarguard_core::{Point, PointCloud, PointXYZ};
    use proptest::prelude::*;

    fn sample_cloud() -> PointCloud<PointXYZ> {
        [
            [0.0, 0.0, 0.0],
            [5.0, 5.0, 5.0],
            [-5.0, 2.0, 1.0],
            [20.0, 0.0, 0.0],
        ]
        .iter()
        .map(|&p| PointXYZ::from_position(p))
        .collect()
    }

    #[test]
    fn crop_keeps_inside_points() {
        let out = crop_box(&sample_cloud(), [-10.0; 3], [10.0; 3]);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn crop_bounds_are_inclusive() {
        let cloud: PointCloud<PointXYZ> = [[1.0, 0.0, 0.0]]
            .iter()
            .map(|&p| PointXYZ::from_position(p))
            .collect();
        let out = crop_box(&cloud, [-1.0, -1.0, -1.0], [1.0, 1.0, 1.0]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn inverse_crop_is_the_complement() {
        let cloud = sample_cloud();
        let min = [-10.0; 3];
        let max = [10.0; 3];
        let kept = crop_box(&cloud, min, max);
        let removed = crop_box_inverse(&cloud, min, max);
        assert_eq!(kept.len() + removed.len(), cloud.len());
        assert_eq!(removed.position(0), [20.0, 0.0, 0.0]);
    }

    #[test]
    #[should_panic]
    fn inverted_bounds_panic() {
        let _ = crop_box(&sample_cloud(), [1.0; 3], [-1.0; 3]);
    }

    proptest! {
        #[test]
        fn cropped_points_lie_inside(
            pts in prop::collection::vec(
                (-100.0f32..100.0, -100.0f32..100.0, -100.0f32..100.0),
                0..300
            ),
            lo in -50.0f32..-1.0,
            hi in 1.0f32..50.0,
        ) {
            let cloud: PointCloud<PointXYZ> = pts
                .iter()
                .map(|p| PointXYZ::new(p.0, p.1, p.2))
                .collect();
            let min = [lo; 3];
            let max = [hi; 3];
            let out = crop_box(&cloud, min, max);
            for p in out.positions() {
                for a in 0..3 {
                    prop_assert!(p[a] >= min[a] && p[a] <= max[a]);
                }
            }
        }
    }
}
