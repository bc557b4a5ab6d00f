// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Opening synthesis.
//!
//! Recovers a parametric extruded opening from a collection of cut faces.
//! The collection's free edges form the opening profiles: one group for a
//! recess (closed by the face parallel to it), two for a through opening,
//! or three when one profile was split and has to be sewn back together.
//! Every side face must then join the two profiles with congruent curves:
//! one lying in each profile plane. Sides are matched by position rather
//! than by shared edge, so a side over a sewn gap still finds its curve.

use ifc_cut_geometry::{
    is_orthogonal, is_parallel, newell_normal, Curve, CurveLoop, Plane, Point3,
    TessellationParams, Tolerance, Vector3,
};
use ifc_cut_topology::BrepArena;
use serde::{Deserialize, Serialize};

use crate::body::{BodyRepresentation, CutOperand, ExtrudedSolid};
use crate::classifier::CutFace;
use crate::config::CutConfig;
use crate::congruence::curves_congruent;
use crate::error::UnsupportedReason;
use crate::extrusion::BaseExtrusion;
use crate::groups::{chain_free_edges, sew_fragments, BoundaryGroup};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpeningKind {
    /// Passes through the body; both profiles are open boundaries.
    Through,
    /// Blind opening closed by a face parallel to its profile.
    Recess,
}

/// A recognised opening and the solid that removes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningPlan {
    pub kind: OpeningKind,
    /// Profile the opening solid is swept from, counterclockwise about its plane normal.
    pub profile: CurveLoop,
    /// The matching profile on the far side.
    pub opposite: CurveLoop,
    /// Unit sweep direction from `profile` towards `opposite`.
    pub direction: Vector3<f64>,
    pub depth: f64,
    pub solid: ExtrudedSolid,
}

/// Closed, planar profile loop from one boundary group.
fn profile_loop(group: BoundaryGroup, tol: &Tolerance) -> Result<CurveLoop, UnsupportedReason> {
    if !group.closed {
        return Err(UnsupportedReason::ProfileNotClosed);
    }
    let curve_loop =
        CurveLoop::new(group.curves, tol).map_err(|_| UnsupportedReason::ProfileNotClosed)?;
    profile_plane(&curve_loop)?;
    Ok(curve_loop)
}

fn profile_plane(curve_loop: &CurveLoop) -> Result<Plane, UnsupportedReason> {
    curve_loop
        .plane()
        .copied()
        .ok_or(UnsupportedReason::ProfileNotPlanar)
}

#[derive(Debug, Clone, Copy)]
pub struct OpeningSynthesizer {
    tolerance: Tolerance,
    tessellation: TessellationParams,
}

impl OpeningSynthesizer {
    pub fn new(config: &CutConfig) -> Self {
        Self {
            tolerance: config.tolerance,
            tessellation: config.tessellation,
        }
    }

    /// Matches the faces of one collection to an extruded opening.
    pub fn plan(
        &self,
        arena: &BrepArena,
        base: &BaseExtrusion,
        faces: &[CutFace],
    ) -> Result<OpeningPlan, UnsupportedReason> {
        let keys: Vec<_> = faces.iter().map(|f| f.face).collect();
        let offset = base.local_offset();
        let groups = chain_free_edges(arena, &keys, offset.as_ref());
        let tol = &self.tolerance;

        let (kind, first, second, sides) = match groups.len() {
            1 => {
                let first = groups
                    .into_iter()
                    .next()
                    .ok_or(UnsupportedReason::ProfileNotClosed)
                    .and_then(|g| profile_loop(g, tol))?;
                let normal = profile_plane(&first)?.normal();

                let parallel: Vec<&CutFace> = faces
                    .iter()
                    .filter(|f| f.plane().is_some_and(|p| is_parallel(&p.normal(), &normal, tol)))
                    .collect();
                let [bottom] = parallel.as_slice() else {
                    return Err(UnsupportedReason::NoParallelOppositeFace);
                };
                let second = bottom.boundary.clone();
                let sides: Vec<&CutFace> = faces.iter().filter(|f| f.face != bottom.face).collect();
                (OpeningKind::Recess, first, second, sides)
            }
            2 => {
                let mut it = groups.into_iter();
                let (Some(a), Some(b)) = (it.next(), it.next()) else {
                    return Err(UnsupportedReason::ProfileNotClosed);
                };
                let first = profile_loop(a, tol)?;
                let second = profile_loop(b, tol)?;
                (OpeningKind::Through, first, second, faces.iter().collect())
            }
            3 => {
                let (a, b) = self.fold_split_profile(groups)?;
                let first = profile_loop(a, tol)?;
                let second = profile_loop(b, tol)?;
                (OpeningKind::Through, first, second, faces.iter().collect())
            }
            0 => return Err(UnsupportedReason::NoProfileGroups),
            count => return Err(UnsupportedReason::TooManyProfileGroups { count }),
        };

        self.match_profiles(arena, base, kind, first, second, &sides)
    }

    /// Reduces three boundary groups to two by sewing the odd one into the
    /// open member of the single parallel pair.
    fn fold_split_profile(
        &self,
        groups: Vec<BoundaryGroup>,
    ) -> Result<(BoundaryGroup, BoundaryGroup), UnsupportedReason> {
        let tol = &self.tolerance;
        let normals: Vec<Option<Vector3<f64>>> = groups
            .iter()
            .map(|g| {
                let mut samples = Vec::new();
                for curve in &g.curves {
                    let mut points = curve.tessellate(&self.tessellation);
                    points.pop();
                    samples.extend(points);
                }
                // an open fragment keeps its far end
                if !g.closed {
                    samples.extend(g.end_point());
                }
                let n = newell_normal(&samples);
                (n.norm() > f64::EPSILON).then_some(n)
            })
            .collect();

        let mut pairs = Vec::new();
        for i in 0..groups.len() {
            for j in (i + 1)..groups.len() {
                if let (Some(a), Some(b)) = (&normals[i], &normals[j]) {
                    if is_parallel(a, b, tol) {
                        pairs.push((i, j));
                    }
                }
            }
        }
        let (i, j) = match pairs.as_slice() {
            [] => return Err(UnsupportedReason::ProfilesNotParallel),
            [pair] => *pair,
            _ => return Err(UnsupportedReason::AmbiguousParallelGroups),
        };
        let k = 3 - i - j;

        let gap = |a: &BoundaryGroup, b: &BoundaryGroup| {
            let ends = |g: &BoundaryGroup| [g.start_point(), g.end_point()];
            let mut best = f64::INFINITY;
            for p in ends(a).into_iter().flatten() {
                for q in ends(b).into_iter().flatten() {
                    best = best.min((p - q).norm());
                }
            }
            best
        };
        let target = [i, j]
            .into_iter()
            .filter(|&m| !groups[m].closed)
            .min_by(|&x, &y| gap(&groups[x], &groups[k]).total_cmp(&gap(&groups[y], &groups[k])))
            .ok_or(UnsupportedReason::ProfileNotClosed)?;
        let keep = if target == i { j } else { i };

        let mut slots: Vec<Option<BoundaryGroup>> = groups.into_iter().map(Some).collect();
        let (Some(open), Some(odd), Some(other)) =
            (slots[target].take(), slots[k].take(), slots[keep].take())
        else {
            return Err(UnsupportedReason::ProfileNotClosed);
        };
        let sewn = sew_fragments(vec![open, odd], tol);

        Ok(if target < keep { (sewn, other) } else { (other, sewn) })
    }

    fn match_profiles(
        &self,
        arena: &BrepArena,
        base: &BaseExtrusion,
        kind: OpeningKind,
        mut first: CurveLoop,
        mut second: CurveLoop,
        sides: &[&CutFace],
    ) -> Result<OpeningPlan, UnsupportedReason> {
        let tol = &self.tolerance;
        let p1 = profile_plane(&first)?;
        let p2 = profile_plane(&second)?;
        let n1 = p1.normal();

        if !is_parallel(&n1, &p2.normal(), tol) {
            return Err(UnsupportedReason::ProfilesNotParallel);
        }
        let axis = base.direction();
        if !is_orthogonal(&n1, &axis, tol) || !is_orthogonal(&p2.normal(), &axis, tol) {
            return Err(UnsupportedReason::ProfileAlongExtrusion);
        }

        first.orient_counterclockwise(&n1);
        second.orient_counterclockwise(&n1);
        let plane1 = Plane::from_normal_and_x(p1.origin(), n1, p1.x_axis())
            .map_err(|_| UnsupportedReason::ProfileNotPlanar)?;
        let plane2 = Plane::from_normal_and_x(p2.origin(), n1, p1.x_axis())
            .map_err(|_| UnsupportedReason::ProfileNotPlanar)?;
        let profile = first.with_plane(plane1);
        let opposite = second.with_plane(plane2);

        let distance = (p2.origin() - p1.origin()).dot(&n1);
        let level = |p: &Point3<f64>| (p - p1.origin()).dot(&n1);
        if distance.abs() <= tol.distance
            || opposite
                .sample_points(&self.tessellation)
                .iter()
                .any(|p| (level(p) - distance).abs() > tol.distance)
        {
            return Err(UnsupportedReason::InconsistentOffset);
        }

        let at_level = |curve: &Curve, target: f64| {
            [curve.start_point(), curve.point_at(0.5), curve.end_point()]
                .iter()
                .all(|p| (level(p) - target).abs() <= tol.distance)
        };

        let offset = base.local_offset();
        let mut sweep: Option<Vector3<f64>> = None;
        for side in sides {
            let curves = arena
                .face_outer_loop(side.face)
                .and_then(|lp| arena.loop_curves(lp))
                .ok_or(UnsupportedReason::MissingFaceGeometry)?;

            let mut near = Vec::new();
            let mut far = Vec::new();
            for curve in curves {
                let curve = match &offset {
                    Some(v) => curve.translated(v),
                    None => curve,
                };
                if at_level(&curve, 0.0) {
                    near.push(curve);
                } else if at_level(&curve, distance) {
                    far.push(curve);
                }
            }
            let ([c1], [c2]) = (near.as_slice(), far.as_slice()) else {
                return Err(UnsupportedReason::UnmatchedSideFace);
            };

            let v = *sweep.get_or_insert(c2.end_point() - c1.start_point());
            curves_congruent(c1, c2, &v, tol)?;
        }

        let v = sweep.ok_or(UnsupportedReason::UnmatchedSideFace)?;
        if !is_parallel(&v, &n1, tol) {
            return Err(UnsupportedReason::DirectionNotNormal);
        }
        let direction = n1 * v.dot(&n1).signum();
        let depth = v.norm();

        let solid = ExtrudedSolid {
            position: plane1,
            profile: profile.clone(),
            direction,
            depth,
        };
        Ok(OpeningPlan {
            kind,
            profile,
            opposite,
            direction,
            depth,
            solid,
        })
    }

    /// Subtracts the opening solid from `body`.
    pub fn subtract(&self, body: BodyRepresentation, plan: &OpeningPlan) -> BodyRepresentation {
        body.difference(CutOperand::Extrusion(plan.solid.clone()))
    }
}
