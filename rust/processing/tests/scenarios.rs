// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end cut processing scenarios.

use std::f64::consts::PI;

use approx::assert_relative_eq;
use ifc_cut_geometry::{CircularArc, Curve, CurveLoop, Plane, Point3, Tolerance, Vector3};
use ifc_cut_processing::{
    AppliedCut, AppliedKind, BaseExtrusion, BodyRepresentation, Classification, ClipFace,
    ClipStep, ClippingSynthesizer, CutAttribution, CutClassifier, CutConfig, CutOperand,
    CutProcessor, CutReport, CutTopologyAnalyzer, ElementId, ExtrusionRange, OpeningKind,
    UnsupportedReason,
};
use ifc_cut_topology::{
    BoundLoop, BrepArena, FaceKey, FaceStatus, ImportConfig, LoopBuilder, LoopStatus, ShellBuilder,
};

const ELEMENT: ElementId = ElementId(101);

// ============================================================================
// Fixtures
// ============================================================================

fn rectangle(points: &[Point3<f64>; 4]) -> CurveLoop {
    CurveLoop::from_polygon(points, &Tolerance::default()).unwrap()
}

/// Column with a 4 x 2 footprint extruded along +Z over `[0, 10]`.
fn column() -> BaseExtrusion {
    let profile = rectangle(&[
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(4.0, 0.0, 0.0),
        Point3::new(4.0, 2.0, 0.0),
        Point3::new(0.0, 2.0, 0.0),
    ]);
    BaseExtrusion::new(
        Plane::from_normal(Point3::origin(), Vector3::z()).unwrap(),
        profile,
        Vector3::z(),
        ExtrusionRange::new(0.0, 10.0).unwrap(),
    )
    .unwrap()
}

/// Wall running along +X over `[0, 10]`, 10 thick (Y) and 4 high (Z from 3 to 7).
fn wall() -> BaseExtrusion {
    let profile = rectangle(&[
        Point3::new(0.0, -5.0, 3.0),
        Point3::new(0.0, 5.0, 3.0),
        Point3::new(0.0, 5.0, 7.0),
        Point3::new(0.0, -5.0, 7.0),
    ]);
    BaseExtrusion::new(
        Plane::from_normal(Point3::origin(), Vector3::x()).unwrap(),
        profile,
        Vector3::x(),
        ExtrusionRange::new(0.0, 10.0).unwrap(),
    )
    .unwrap()
}

/// Horizontal face at height `z` covering the column, normal up or down.
fn horizontal_face(arena: &mut BrepArena, z: f64, up: bool) -> FaceKey {
    let mut points = vec![
        Point3::new(-1.0, -1.0, z),
        Point3::new(5.0, -1.0, z),
        Point3::new(5.0, 3.0, z),
        Point3::new(-1.0, 3.0, z),
    ];
    if !up {
        points.reverse();
    }
    arena.make_polygon_face(&points).unwrap()
}

fn opening_corners(z: f64) -> [Point3<f64>; 4] {
    [
        Point3::new(4.0, -1.0, z),
        Point3::new(6.0, -1.0, z),
        Point3::new(6.0, 1.0, z),
        Point3::new(4.0, 1.0, z),
    ]
}

/// Four side faces of a 2 x 2 square shaft from `low` to `high`.
fn shaft(arena: &mut BrepArena, low: f64, high: f64) -> Vec<FaceKey> {
    let (lo, hi) = (opening_corners(low), opening_corners(high));
    (0..4)
        .map(|i| {
            let j = (i + 1) % 4;
            arena.make_polygon_face(&[lo[i], lo[j], hi[j], hi[i]]).unwrap()
        })
        .collect()
}

fn recess(arena: &mut BrepArena) -> Vec<FaceKey> {
    let mut faces = shaft(arena, 5.0, 7.0);
    let mut bottom = opening_corners(5.0);
    bottom.reverse();
    faces.push(arena.make_polygon_face(&bottom).unwrap());
    faces
}

fn attribute(faces: &[FaceKey], element: ElementId) -> CutAttribution {
    let mut attribution = CutAttribution::new();
    for &face in faces {
        attribution.attribute(face, element);
    }
    attribution
}

fn process(arena: &BrepArena, base: &BaseExtrusion, attribution: &CutAttribution) -> CutReport {
    CutProcessor::new(CutConfig::default()).process(arena, base, attribution)
}

// ============================================================================
// Clip planes
// ============================================================================

#[test]
fn clip_below_start_removes_everything() {
    let mut arena = BrepArena::new();
    let face = horizontal_face(&mut arena, -2.0, false);

    let report = process(&arena, &column(), &attribute(&[face], ELEMENT));
    assert!(report.state.is_fully_clipped());
    assert!(report.body().is_none());
    assert!(report.diagnostics.is_empty());
}

#[test]
fn clip_beyond_end_removes_everything() {
    let mut arena = BrepArena::new();
    let face = horizontal_face(&mut arena, 12.0, true);

    let report = process(&arena, &column(), &attribute(&[face], ELEMENT));
    assert!(report.state.is_fully_clipped());
}

#[test]
fn clip_inside_range_lowers_end() {
    let mut arena = BrepArena::new();
    let face = horizontal_face(&mut arena, 6.0, false);

    let report = process(&arena, &column(), &attribute(&[face], ELEMENT));
    assert_relative_eq!(report.range.end(), 6.0, epsilon = 1e-9);
    assert_eq!(
        report.applied,
        vec![AppliedCut {
            element: ELEMENT,
            kind: AppliedKind::ClipPlane
        }]
    );

    let body = report.body().unwrap();
    assert!(matches!(body.operands().as_slice(), [CutOperand::HalfSpace(_)]));
    assert!(body.contains(&Point3::new(1.0, 1.0, 5.0)));
    assert!(!body.contains(&Point3::new(1.0, 1.0, 7.0)));
}

#[test]
fn perpendicular_face_leaves_body_unchanged() {
    let mut arena = BrepArena::new();
    let face = arena
        .make_polygon_face(&[
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(1.0, 3.0, 0.0),
            Point3::new(1.0, 3.0, 10.0),
            Point3::new(1.0, -1.0, 10.0),
        ])
        .unwrap();
    let base = column();

    let report = process(&arena, &base, &attribute(&[face], ELEMENT));
    assert_eq!(report.body(), Some(&base.to_body()));
    assert!(report.applied.is_empty());
    assert_eq!(report.range, base.range());
}

#[test]
fn local_offset_moves_cut_faces() {
    let mut arena = BrepArena::new();
    let face = horizontal_face(&mut arena, 4.0, false);
    let base = column().with_local_offset(Vector3::new(0.0, 0.0, 2.0));

    let report = process(&arena, &base, &attribute(&[face], ELEMENT));
    assert_relative_eq!(report.range.end(), 6.0, epsilon = 1e-9);
}

#[test]
fn bounded_clip_planes_follow_config() {
    let mut arena = BrepArena::new();
    let face = horizontal_face(&mut arena, 6.0, false);
    let config = CutConfig {
        bounded_half_spaces: true,
        ..CutConfig::default()
    };

    let report = CutProcessor::new(config).process(&arena, &column(), &attribute(&[face], ELEMENT));
    let body = report.body().unwrap();
    assert!(matches!(body.operands().as_slice(), [CutOperand::BoundedHalfSpace(_)]));
    assert_relative_eq!(report.range.end(), 6.0, epsilon = 1e-9);
}

// ============================================================================
// End clips
// ============================================================================

/// Gable roof over the column: eaves at z = 6, ridge at z = 12 above x = 2.
fn gable(arena: &mut BrepArena) -> Vec<FaceKey> {
    let ridge = [Point3::new(2.0, -1.0, 12.0), Point3::new(2.0, 3.0, 12.0)];
    let left = arena
        .make_polygon_face(&[
            Point3::new(-1.0, -1.0, 6.0),
            Point3::new(-1.0, 3.0, 6.0),
            ridge[1],
            ridge[0],
        ])
        .unwrap();
    let right = arena
        .make_polygon_face(&[
            ridge[0],
            ridge[1],
            Point3::new(5.0, 3.0, 6.0),
            Point3::new(5.0, -1.0, 6.0),
        ])
        .unwrap();
    vec![left, right]
}

/// Valley over the column whose two faces tilt opposite ways.
fn valley(arena: &mut BrepArena) -> Vec<FaceKey> {
    let trough = [Point3::new(-1.0, 1.0, 9.0), Point3::new(5.0, 1.0, 9.0)];
    let near = arena
        .make_polygon_face(&[
            Point3::new(-1.0, -1.0, 11.0),
            Point3::new(5.0, -1.0, 11.0),
            trough[1],
            trough[0],
        ])
        .unwrap();
    let far = arena
        .make_polygon_face(&[
            Point3::new(-1.0, 3.0, 11.0),
            Point3::new(5.0, 3.0, 11.0),
            trough[1],
            trough[0],
        ])
        .unwrap();
    vec![near, far]
}

#[test]
fn gable_end_clip_subtracts_bounded_half_spaces() {
    let mut arena = BrepArena::new();
    let faces = gable(&mut arena);

    let report = process(&arena, &column(), &attribute(&faces, ELEMENT));
    assert_eq!(
        report.applied,
        vec![AppliedCut {
            element: ELEMENT,
            kind: AppliedKind::EndClip
        }]
    );

    let body = report.body().unwrap();
    let operands = body.operands();
    assert_eq!(operands.len(), 2);
    assert!(operands.iter().all(|op| matches!(op, CutOperand::BoundedHalfSpace(_))));

    assert!(!body.contains(&Point3::new(0.5, 1.0, 9.5)));
    assert!(!body.contains(&Point3::new(3.5, 1.0, 9.5)));
    assert!(body.contains(&Point3::new(0.5, 1.0, 8.5)));
    assert!(body.contains(&Point3::new(3.5, 1.0, 8.5)));
    assert!(body.contains(&Point3::new(2.0, 1.0, 9.9)));
}

#[test]
fn orientation_conflict_falls_back_to_unclipped_body() {
    let mut arena = BrepArena::new();
    let clip = horizontal_face(&mut arena, 6.0, false);
    let conflicting = valley(&mut arena);

    let mut attribution = attribute(&conflicting, ElementId(2));
    attribution.attribute(clip, ElementId(1));

    let base = column();
    let report = process(&arena, &base, &attribution);

    assert!(report.fell_back);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].reason, UnsupportedReason::ClipOrientationConflict);
    assert_eq!(report.diagnostics[0].element, Some(ElementId(2)));
    assert_eq!(report.range, base.range());
    assert!(report.applied.is_empty());
    assert_eq!(report.body(), Some(&base.to_body()));
}

#[test]
fn fallback_still_subtracts_openings() {
    let mut arena = BrepArena::new();
    let both_ends = arena
        .make_polygon_face(&[
            Point3::new(-1.0, -6.0, 2.0),
            Point3::new(-1.0, 6.0, 2.0),
            Point3::new(11.0, 6.0, 8.0),
            Point3::new(11.0, -6.0, 8.0),
        ])
        .unwrap();
    let closing = arena
        .make_polygon_face(&[
            Point3::new(-3.0, -6.0, 2.0),
            Point3::new(-1.0, -6.0, 2.0),
            Point3::new(-1.0, 6.0, 2.0),
            Point3::new(-3.0, 6.0, 2.0),
        ])
        .unwrap();
    let shaft_faces = shaft(&mut arena, 3.0, 7.0);

    let mut attribution = attribute(&[both_ends, closing], ElementId(1));
    for &face in &shaft_faces {
        attribution.attribute(face, ElementId(2));
    }

    let report = process(&arena, &wall(), &attribution);
    assert!(report.fell_back);
    assert_eq!(report.diagnostics[0].reason, UnsupportedReason::BothEndsClipped);
    assert_eq!(
        report.applied,
        vec![AppliedCut {
            element: ElementId(2),
            kind: AppliedKind::ThroughOpening
        }]
    );
}

// ============================================================================
// Openings
// ============================================================================

#[test]
fn shaft_through_wall_is_subtracted() {
    let mut arena = BrepArena::new();
    let faces = shaft(&mut arena, 3.0, 7.0);

    let report = process(&arena, &wall(), &attribute(&faces, ELEMENT));
    assert!(report.diagnostics.is_empty());
    assert_eq!(report.openings.len(), 1);

    let opening = &report.openings[0];
    assert_eq!(opening.kind, OpeningKind::Through);
    assert_relative_eq!(opening.solid.depth, 4.0, epsilon = 1e-9);
    assert_relative_eq!(opening.solid.volume(), 16.0, epsilon = 1e-9);
    assert_eq!(
        report.applied,
        vec![AppliedCut {
            element: ELEMENT,
            kind: AppliedKind::ThroughOpening
        }]
    );

    let body = report.body().unwrap();
    assert!(!body.contains(&Point3::new(5.0, 0.0, 5.0)));
    assert!(body.contains(&Point3::new(2.0, 0.0, 5.0)));
    assert!(body.contains(&Point3::new(5.0, 3.0, 5.0)));
}

#[test]
fn blind_hole_is_a_recess() {
    let mut arena = BrepArena::new();
    let faces = recess(&mut arena);

    let report = process(&arena, &wall(), &attribute(&faces, ELEMENT));
    let opening = &report.openings[0];
    assert_eq!(opening.kind, OpeningKind::Recess);
    assert_relative_eq!(opening.solid.volume(), 8.0, epsilon = 1e-9);
    assert_relative_eq!(opening.solid.direction, -Vector3::z(), epsilon = 1e-12);

    let body = report.body().unwrap();
    assert!(!body.contains(&Point3::new(5.0, 0.0, 6.0)));
    assert!(body.contains(&Point3::new(5.0, 0.0, 4.0)));
}

#[test]
fn round_shaft_with_ruled_sides() {
    let mut arena = BrepArena::new();
    let rise = Vector3::new(0.0, 0.0, 4.0);
    let center = Point3::new(5.0, 0.0, 3.0);
    let front = CircularArc::new(center, Vector3::x(), Vector3::z(), 1.0, 0.0, PI).unwrap();
    let back = CircularArc::new(center, Vector3::x(), Vector3::z(), 1.0, PI, 2.0 * PI).unwrap();

    let mut side = |arc: CircularArc| {
        let bottom = Curve::Arc(arc);
        let top = bottom.translated(&rise).reversed();
        let (a, b) = (bottom.start_point(), bottom.end_point());
        arena
            .make_face_from_curves(&[
                bottom,
                Curve::line(b, b + rise),
                top,
                Curve::line(a + rise, a),
            ])
            .unwrap()
    };
    let faces = vec![side(front), side(back)];

    let report = process(&arena, &wall(), &attribute(&faces, ELEMENT));
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);

    let opening = &report.openings[0];
    assert_eq!(opening.kind, OpeningKind::Through);
    assert_relative_eq!(opening.solid.depth, 4.0, epsilon = 1e-9);
    assert!((opening.solid.volume() - 4.0 * PI).abs() < 0.03 * 4.0 * PI);
    assert!(!report.body().unwrap().contains(&Point3::new(5.0, 0.0, 5.0)));
}

#[test]
fn openings_can_be_reported_without_subtraction() {
    let mut arena = BrepArena::new();
    let faces = shaft(&mut arena, 3.0, 7.0);
    let config = CutConfig {
        subtract_openings: false,
        ..CutConfig::default()
    };
    let base = wall();

    let report = CutProcessor::new(config).process(&arena, &base, &attribute(&faces, ELEMENT));
    assert_eq!(report.body(), Some(&base.to_body()));
    assert!(report.applied.is_empty());
    assert_eq!(report.openings.len(), 1);
}

#[test]
fn face_with_hole_is_reported_and_skipped() {
    let mut arena = BrepArena::new();
    let outer = horizontal_face(&mut arena, 6.0, false);
    let inner = arena
        .make_polygon_face(&[
            Point3::new(1.0, 0.5, 6.0),
            Point3::new(2.0, 0.5, 6.0),
            Point3::new(2.0, 1.5, 6.0),
            Point3::new(1.0, 1.5, 6.0),
        ])
        .unwrap();
    let outer_loop = arena.face_outer_loop(outer).unwrap();
    let hole = arena.face_outer_loop(inner).unwrap();
    let holed = arena.add_face_with_holes(outer_loop, &[hole]).unwrap();
    let base = column();

    let report = process(&arena, &base, &attribute(&[holed], ELEMENT));
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].reason, UnsupportedReason::MultipleBoundaryLoops);
    assert!(!report.fell_back);
    assert_eq!(report.body(), Some(&base.to_body()));
}

#[test]
fn report_serializes_for_writers() {
    let mut arena = BrepArena::new();
    let faces = shaft(&mut arena, 3.0, 7.0);

    let report = process(&arena, &wall(), &attribute(&faces, ELEMENT));
    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["state"]["state"], "solid");
    assert_eq!(json["state"]["body"]["type"], "difference");
    assert_eq!(json["applied"][0]["kind"], "through_opening");
    assert_eq!(json["openings"][0]["element"], 101);
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn classification_is_repeatable() {
    let mut arena = BrepArena::new();
    let faces = recess(&mut arena);
    let attribution = attribute(&faces, ELEMENT);
    let base = wall();
    let config = CutConfig::default();

    let groups = CutTopologyAnalyzer::new(&arena).analyze(&attribution);
    let collection = &groups[0].as_ref().unwrap().collections[0];
    let classifier = CutClassifier::new(&arena, &base, &config);

    let first = classifier.classify(collection).unwrap();
    let second = classifier.classify(collection).unwrap();
    assert_eq!(first, second);
    assert!(matches!(first, Classification::Opening(_)));
}

#[test]
fn opening_profiles_wind_counterclockwise() {
    for build in [shaft_3_7 as fn(&mut BrepArena) -> Vec<FaceKey>, recess] {
        let mut arena = BrepArena::new();
        let faces = build(&mut arena);
        let base = wall();
        let config = CutConfig::default();
        let groups = CutTopologyAnalyzer::new(&arena).analyze(&attribute(&faces, ELEMENT));
        let collection = &groups[0].as_ref().unwrap().collections[0];

        let Classification::Opening(plan) = CutClassifier::new(&arena, &base, &config)
            .classify(collection)
            .unwrap()
        else {
            panic!("expected opening");
        };
        let normal = plan.profile.plane().unwrap().normal();
        assert!(plan.profile.is_counterclockwise(&normal));
        assert!(plan.opposite.is_counterclockwise(&normal));
        assert_relative_eq!(plan.opposite.plane().unwrap().normal(), normal, epsilon = 1e-12);
    }
}

fn shaft_3_7(arena: &mut BrepArena) -> Vec<FaceKey> {
    shaft(arena, 3.0, 7.0)
}

#[test]
fn successive_clips_only_shrink_the_range() {
    let mut arena = BrepArena::new();
    let base = column();
    let synthesizer = ClippingSynthesizer::new(&CutConfig::default());

    let mut body: BodyRepresentation = base.to_body();
    let mut range = base.range();
    for (z, up) in [(8.0, false), (2.0, true), (9.0, false), (6.0, false), (1.0, true)] {
        let face = horizontal_face(&mut arena, z, up);
        let boundary = arena.face_curve_loop(face).unwrap();
        let clip = ClipFace {
            face,
            plane: *boundary.plane().unwrap(),
            boundary,
        };
        match synthesizer.apply(body, &base, range, &clip, false) {
            ClipStep::Unchanged(next) => body = next,
            ClipStep::Clipped {
                body: next,
                range: narrowed,
            } => {
                assert!(range.contains_range(&narrowed));
                body = next;
                range = narrowed;
            }
            ClipStep::FullyClipped => panic!("clip at z = {z} should leave material"),
        }
    }
    assert_relative_eq!(range.start(), 2.0, epsilon = 1e-9);
    assert_relative_eq!(range.end(), 6.0, epsilon = 1e-9);
    assert_eq!(body.operands().len(), 3);
}

// ============================================================================
// Import
// ============================================================================

#[test]
fn closed_ring_with_duplicates_is_cleaned() {
    let builder = LoopBuilder::new(1e-4);
    let ring = builder.build(&[
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.00001),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 0.0),
    ]);
    assert_eq!(ring.status, LoopStatus::Ok);
    assert_eq!(ring.vertices.len(), 4);

    let sliver = builder.build(&[
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.00001, 0.0, 0.0),
        Point3::new(0.0, 0.0, 0.0),
    ]);
    assert_eq!(sliver.status, LoopStatus::Degraded);
}

fn unit_square(z: f64) -> Vec<Point3<f64>> {
    vec![
        Point3::new(0.0, 0.0, z),
        Point3::new(1.0, 0.0, z),
        Point3::new(1.0, 1.0, z),
        Point3::new(0.0, 1.0, z),
    ]
}

#[test]
fn degenerate_outer_boundary_aborts_shape() {
    let mut builder = ShellBuilder::new("#55", ImportConfig::default());
    assert_eq!(builder.add_face(&[BoundLoop::outer(unit_square(0.0))]), FaceStatus::Accepted);
    let collapsed = vec![Point3::new(0.0, 0.0, 1.0), Point3::new(0.0, 0.0, 1.0)];
    assert_eq!(builder.add_face(&[BoundLoop::outer(collapsed)]), FaceStatus::Aborted);

    let mut arena = BrepArena::new();
    assert!(builder.finish(&mut arena).is_err());
    assert_eq!(arena.face_count(), 0);
}

#[test]
fn degenerate_hole_is_dropped_but_face_kept() {
    let config = ImportConfig {
        abort_shape_on_missing_outer: false,
        ..ImportConfig::default()
    };
    let mut builder = ShellBuilder::new("#56", config);
    let sliver = vec![Point3::new(0.5, 0.5, 0.0), Point3::new(0.5, 0.5, 0.0)];
    let status = builder.add_face(&[BoundLoop::outer(unit_square(0.0)), BoundLoop::hole(sliver)]);
    assert_eq!(status, FaceStatus::HolesDropped { dropped: 1 });
    builder.add_face(&[BoundLoop::outer(vec![Point3::origin(); 3])]);

    let mut arena = BrepArena::new();
    let shell = builder.finish(&mut arena).unwrap();
    assert_eq!(shell.faces.len(), 1);
    assert_eq!(shell.aborted_faces, 1);
    assert_eq!(shell.dropped_holes, 1);
    assert_eq!(arena.face(shell.faces[0]).unwrap().loop_count(), 1);
}
