//! Tests for the far module.

use subdiv_petite::far::*;
use subdiv_petite::{Error, Index};

const CUBE_VERTICES_PER_FACE: [u32; 6] = [4, 4, 4, 4, 4, 4];

#[rustfmt::skip]
const CUBE_FACE_VERTICES: [u32; 24] = [
    0, 1, 3, 2,
    2, 3, 5, 4,
    4, 5, 7, 6,
    6, 7, 1, 0,
    1, 7, 5, 3,
    6, 0, 2, 4,
];

#[rustfmt::skip]
const CUBE_POSITIONS: [f32; 24] = [
    -0.5, -0.5,  0.5,
     0.5, -0.5,  0.5,
    -0.5,  0.5,  0.5,
     0.5,  0.5,  0.5,
    -0.5,  0.5, -0.5,
     0.5,  0.5, -0.5,
    -0.5, -0.5, -0.5,
     0.5, -0.5, -0.5,
];

fn cube_refiner(refinement_level: usize) -> TopologyRefiner {
    let descriptor =
        TopologyDescriptor::new(8, &CUBE_VERTICES_PER_FACE, &CUBE_FACE_VERTICES).unwrap();
    let mut refiner = TopologyRefiner::new(descriptor, TopologyRefinerOptions::default())
        .expect("Failed to create TopologyRefiner");

    refiner
        .refine_uniform(UniformRefinementOptions {
            refinement_level,
            ..Default::default()
        })
        .expect("Failed to refine");
    refiner
}

#[test]
fn test_topology_descriptor_creation() {
    let descriptor =
        TopologyDescriptor::new(8, &CUBE_VERTICES_PER_FACE, &CUBE_FACE_VERTICES).unwrap();

    assert_eq!(descriptor.vertex_count(), 8);
    assert_eq!(descriptor.face_count(), 6);
    assert!(!descriptor.is_left_handed());

    // Copy should work.
    let copied = descriptor;
    assert_eq!(copied.vertex_indices_per_face(), &CUBE_FACE_VERTICES);
}

#[cfg(feature = "topology_validation")]
#[test]
fn test_topology_descriptor_validation() {
    assert!(matches!(
        TopologyDescriptor::new(8, &[4, 4], &[0, 1, 2, 3]),
        Err(Error::InvalidTopology(_))
    ));
    assert!(matches!(
        TopologyDescriptor::new(3, &[4], &[0, 1, 2, 3]),
        Err(Error::InvalidTopology(_))
    ));
}

#[test]
fn test_topology_refiner_options_default() {
    let options = TopologyRefinerOptions::default();
    assert_eq!(options.scheme, Scheme::CatmullClark);
    assert_eq!(
        options.boundary_interpolation,
        Some(BoundaryInterpolation::EdgeOnly)
    );
}

#[test]
fn test_scheme_round_trips_through_u32() {
    assert_eq!(u32::from(Scheme::Bilinear), 0);
    assert_eq!(Scheme::try_from(1u32).unwrap(), Scheme::CatmullClark);
    assert!(Scheme::try_from(2u32).is_err());
}

#[test]
fn test_topology_refiner_creation() {
    let refiner = cube_refiner(0);

    assert_eq!(refiner.refinement_levels(), 1);
    assert_eq!(refiner.vertex_total_count(), 8);
    assert_eq!(refiner.face_total_count(), 6);
    assert_eq!(refiner.edge_total_count(), 12);
    assert_eq!(refiner.max_valence(), 3);
}

#[test]
fn test_topology_refiner_uniform_refinement() {
    let mut refiner = cube_refiner(2);

    assert_eq!(refiner.refinement_levels(), 3); // Base + 2 refined levels.
    assert!(refiner.is_uniform());
    assert_eq!(refiner.max_level(), 2);

    assert!(refiner.level(0).is_some());
    assert!(refiner.level(1).is_some());
    assert!(refiner.level(2).is_some());
    assert!(refiner.level(3).is_none());

    refiner.unrefine();
    assert_eq!(refiner.max_level(), 0);
    assert!(!refiner.is_uniform());
}

#[test]
fn test_cube_level_counts() {
    let refiner = cube_refiner(2);

    let level1 = refiner.level(1).unwrap();
    assert_eq!(level1.vertex_count(), 26);
    assert_eq!(level1.face_count(), 24);
    assert_eq!(level1.edge_count(), 48);

    let level2 = refiner.level(2).unwrap();
    assert_eq!(level2.vertex_count(), 98);
    assert_eq!(level2.face_count(), 96);
    assert_eq!(level2.edge_count(), 192);

    // Every refined face is a quad.
    assert!(level2.face_vertices_iter().all(|face| face.len() == 4));
}

#[test]
fn test_topology_level_face_vertices() {
    let refiner = cube_refiner(0);
    let level0 = refiner.level(0).expect("Level 0 should exist");

    let face0_verts = level0
        .face_vertices(Index::from(0u32))
        .expect("Face 0 should have vertices");
    assert_eq!(face0_verts, &[Index(0), Index(1), Index(3), Index(2)]);

    assert!(level0.face_vertices(Index::from(99u32)).is_none());
}

#[test]
fn test_topology_level_relationships() {
    // Two triangles sharing an edge.
    let descriptor = TopologyDescriptor::new(4, &[3, 3], &[0, 1, 2, 1, 3, 2]).unwrap();
    let refiner = TopologyRefiner::new(descriptor, TopologyRefinerOptions::default())
        .expect("Failed to create TopologyRefiner");
    let level0 = refiner.level(0).expect("Level 0 should exist");

    assert_eq!(level0.edge_count(), 5);

    let edge = level0
        .find_edge(Index::from(1u32), Index::from(2u32))
        .expect("Shared edge should exist");
    assert_eq!(level0.edge_faces(edge).unwrap().len(), 2);
    assert!(!level0.is_edge_boundary(edge));

    let boundary = level0.find_edge(Index(0), Index(1)).unwrap();
    assert_eq!(level0.edge_faces(boundary).unwrap(), &[Index(0)]);
    assert!(level0.is_edge_boundary(boundary));
    assert!(level0.is_vertex_boundary(Index(0)));

    assert!(level0.find_edge(Index(0), Index(3)).is_none());
}

#[test]
fn test_invalid_topology_is_rejected() {
    // Three faces on one edge.
    let result = TopologyDescriptor::new(5, &[3, 3, 3], &[0, 1, 2, 0, 1, 3, 0, 1, 4])
        .and_then(|descriptor| TopologyRefiner::new(descriptor, Default::default()));
    assert!(matches!(result, Err(Error::InvalidTopology(_))));

    // A face that visits a vertex twice.
    let result = TopologyDescriptor::new(3, &[4], &[0, 1, 2, 1])
        .and_then(|descriptor| TopologyRefiner::new(descriptor, Default::default()));
    assert!(matches!(result, Err(Error::InvalidTopology(_))));
}

#[test]
fn test_left_handed_faces_are_reversed() {
    let mut descriptor = TopologyDescriptor::new(4, &[4], &[0, 1, 2, 3]).unwrap();
    descriptor.left_handed(true);

    let refiner = TopologyRefiner::new(descriptor, Default::default()).unwrap();
    assert_eq!(
        refiner.level(0).unwrap().face_vertices(Index(0)).unwrap(),
        &[Index(3), Index(2), Index(1), Index(0)]
    );
}

#[test]
fn test_primvar_refiner() {
    let refiner = cube_refiner(1);
    let primvar_refiner = PrimvarRefiner::new(&refiner).unwrap();

    let refined_positions = primvar_refiner
        .interpolate(1, 3, &CUBE_POSITIONS)
        .expect("Failed to interpolate primvars");

    let level1_vertex_count = refiner.level(1).unwrap().vertex_count();
    assert_eq!(refined_positions.len(), level1_vertex_count * 3);

    // Face points come first; the first one is the centroid of the +z face.
    assert_eq!(&refined_positions[..3], &[0.0, 0.0, 0.5]);

    // The refined cube shrinks towards its center.
    assert!(refined_positions.iter().all(|c| c.abs() <= 0.5));
}

#[test]
fn test_stencil_table() {
    let refiner = cube_refiner(2);

    let stencil_table = StencilTable::new(&refiner, 2).unwrap();
    assert_eq!(stencil_table.len(), 98);
    assert_eq!(stencil_table.control_vertex_count(), 26);
    assert_eq!(stencil_table.sizes().len(), 98);
    assert_eq!(stencil_table.offsets().len(), 98);
    assert_eq!(
        stencil_table.control_indices().len(),
        stencil_table.weights().len()
    );

    for i in 0..stencil_table.len() {
        let stencil = stencil_table.stencil(Index::from(i)).unwrap();
        let sum: f32 = stencil.weights().iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(stencil
            .indices()
            .iter()
            .all(|&index| usize::from(index) < 26));
    }

    assert!(stencil_table.stencil(Index::from(98usize)).is_none());
    assert!(StencilTable::new(&refiner, 3).is_err());
}

#[test]
fn test_uniform_refinement_options_default() {
    let options = UniformRefinementOptions::default();
    assert_eq!(options.refinement_level, 4);
    assert!(options.order_vertices_from_faces_first);
}

#[test]
fn test_vertices_first_ordering() {
    let descriptor = TopologyDescriptor::new(4, &[4], &[0, 1, 2, 3]).unwrap();
    let mut refiner = TopologyRefiner::new(
        descriptor,
        TopologyRefinerOptions {
            scheme: Scheme::Bilinear,
            ..Default::default()
        },
    )
    .unwrap();
    refiner
        .refine_uniform(UniformRefinementOptions {
            refinement_level: 1,
            order_vertices_from_faces_first: false,
        })
        .unwrap();

    let primvar_refiner = PrimvarRefiner::new(&refiner).unwrap();
    let refined = primvar_refiner
        .interpolate(1, 2, &[0.0, 0.0, 2.0, 0.0, 2.0, 2.0, 0.0, 2.0])
        .unwrap();

    // Vertex points first, then the face point, then the edge points.
    assert_eq!(&refined[..8], &[0.0, 0.0, 2.0, 0.0, 2.0, 2.0, 0.0, 2.0]);
    assert_eq!(&refined[8..10], &[1.0, 1.0]);
    assert_eq!(&refined[10..12], &[1.0, 0.0]);
}
