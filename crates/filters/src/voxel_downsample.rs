use hashbrown::HashMap;
use lidarguard_core::{Point, PointCloud};

/// Voxel-grid downsampling.
///
/// Space is partitioned into cubic cells of edge `leaf_size`; a point maps to
/// its cell by floor-division of each coordinate. All points sharing a cell
/// collapse into one representative produced by [`Point::centroid`], so
/// payload channels (intensity) are averaged along with position.
///
/// The output is ordered by sorted cell key: two permutations of the same
/// input produce identical output.
pub fn voxel_downsample<P: Point>(cloud: &PointCloud<P>, leaf_size: f32) -> PointCloud<P> {
    assert!(
        leaf_size.is_finite() && leaf_size > 0.0,
        "leaf_size must be > 0 and finite"
    );

    if cloud.is_empty() {
        return PointCloud::new();
    }

    let mut cells: HashMap<(i32, i32, i32), Vec<P>> = HashMap::new();

    for p in cloud.iter() {
        let pos = p.position();
        if !pos.iter().all(|v| v.is_finite()) {
            continue;
        }

        let key = (
            (pos[0] / leaf_size).floor() as i32,
            (pos[1] / leaf_size).floor() as i32,
            (pos[2] / leaf_size).floor() as i32,
        );
        cells.entry(key).or_default().push(*p);
    }

    let mut keys: Vec<(i32, i32, i32)> = cells.keys().copied().collect();
    keys.sort_unstable();

    let mut out = PointCloud::with_capacity(keys.len());
    for key in keys {
        let members = &cells[&key];
        out.push(P::centroid(members));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::voxel_downsample;
    use lidarguard_core::{Point, PointCloud, PointXYZ, PointXYZI};
    use proptest::prelude::*;

    #[test]
    fn points_in_one_cell_collapse_to_centroid() {
        // Two points 0.1 apart inside a unit cell.
        let cloud: PointCloud<PointXYZ> = [[0.4, 0.5, 0.5], [0.5, 0.5, 0.5]]
            .iter()
            .map(|&p| PointXYZ::from_position(p))
            .collect();
        let out = voxel_downsample(&cloud, 1.0);
        assert_eq!(out.len(), 1);
        let p = out.position(0);
        assert!((p[0] - 0.45).abs() < 1e-6);
        assert!((p[1] - 0.5).abs() < 1e-6);
        assert!((p[2] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn separate_cells_stay_separate() {
        let cloud: PointCloud<PointXYZ> = [[0.5, 0.5, 0.5], [1.5, 0.5, 0.5]]
            .iter()
            .map(|&p| PointXYZ::from_position(p))
            .collect();
        let out = voxel_downsample(&cloud, 1.0);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn intensity_is_averaged() {
        let mut cloud = PointCloud::new();
        cloud.push(PointXYZI::new(0.1, 0.1, 0.1, 2.0));
        cloud.push(PointXYZI::new(0.2, 0.1, 0.1, 4.0));
        let out = voxel_downsample(&cloud, 1.0);
        assert_eq!(out.len(), 1);
        assert!((out.point(0).intensity - 3.0).abs() < 1e-6);
    }

    #[test]
    fn empty_cloud() {
        let cloud: PointCloud<PointXYZ> = PointCloud::new();
        assert!(voxel_downsample(&cloud, 1.0).is_empty());
    }

    #[test]
    fn non_finite_points_are_dropped() {
        let cloud: PointCloud<PointXYZ> = [[0.5, 0.5, 0.5], [f32::NAN, 0.0, 0.0]]
            .iter()
            .map(|&p| PointXYZ::from_position(p))
            .collect();
        let out = voxel_downsample(&cloud, 1.0);
        assert_eq!(out.len(), 1);
    }

    #[test]
    #[should_panic]
    fn zero_leaf_size_panics() {
        let cloud: PointCloud<PointXYZ> = PointCloud::new();
        let _ = voxel_downsample(&cloud, 0.0);
    }

    #[test]
    fn output_is_input_order_independent() {
        let forward: PointCloud<PointXYZ> = [
            [0.1, 0.1, 0.1],
            [0.3, 0.1, 0.1],
            [1.2, 0.4, 0.2],
            [2.6, 1.4, 0.8],
        ]
        .iter()
        .map(|&p| PointXYZ::from_position(p))
        .collect();
        let reversed: PointCloud<PointXYZ> = forward
            .as_slice()
            .iter()
            .rev()
            .copied()
            .collect();

        let a = voxel_downsample(&forward, 0.5);
        let b = voxel_downsample(&reversed, 0.5);
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn downsample_never_increases_point_count(
            pts in prop::collection::vec(
                (-100.0f32..100.0, -100.0f32..100.0, -100.0f32..100.0),
                1..2000
            ),
            leaf in 0.01f32..10.0,
        ) {
            let cloud: PointCloud<PointXYZ> = pts
                .iter()
                .map(|p| PointXYZ::new(p.0, p.1, p.2))
                .collect();
            let out = voxel_downsample(&cloud, leaf);
            prop_assert!(out.len() <= cloud.len());
            prop_assert!(!out.is_empty());
        }
    }
}
