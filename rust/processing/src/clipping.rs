// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Clip plane synthesis.
//!
//! A clip face removes the material on the side opposite its normal. Along
//! the line `v + t·d` through a profile vertex `v` the plane sits at
//!
//! ```text
//! t_v = ((o_c - v) · n_c) / (n_c · d)
//! ```
//!
//! and the kept side is `t >= t_v` when `n_c · d > 0`, `t <= t_v` otherwise.
//! Comparing the `t_v` of all profile samples with the remaining range
//! tells whether the clip is a no-op, removes everything, or narrows the
//! range.

use ifc_cut_geometry::{point_in_polygon, Plane, Point2, Point3, TessellationParams, Tolerance};
use serde::{Deserialize, Serialize};

use crate::body::{BodyRepresentation, BoundedHalfSpace, CutOperand, HalfSpace};
use crate::classifier::ClipFace;
use crate::config::CutConfig;
use crate::extrusion::{BaseExtrusion, ExtrusionRange};

/// Result of applying one clip face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ClipStep {
    /// The plane misses the remaining range (or runs along the extrusion).
    Unchanged(BodyRepresentation),
    /// A half-space was subtracted; `range` is what remains.
    Clipped {
        body: BodyRepresentation,
        range: ExtrusionRange,
    },
    /// Nothing of the body remains.
    FullyClipped,
}

#[derive(Debug, Clone, Copy)]
pub struct ClippingSynthesizer {
    tolerance: Tolerance,
    tessellation: TessellationParams,
}

impl ClippingSynthesizer {
    pub fn new(config: &CutConfig) -> Self {
        Self {
            tolerance: config.tolerance,
            tessellation: config.tessellation,
        }
    }

    /// Applies `clip` to `body`, whose uncut material spans `remaining`.
    ///
    /// With `bounded` the removed half-space is limited to the prism through
    /// the clip face's footprint; only profile points inside that footprint
    /// narrow the range.
    pub fn apply(
        &self,
        body: BodyRepresentation,
        base: &BaseExtrusion,
        remaining: ExtrusionRange,
        clip: &ClipFace,
        bounded: bool,
    ) -> ClipStep {
        let tol = &self.tolerance;
        let direction = base.direction();
        let normal = clip.plane.normal();
        let slant = normal.dot(&direction);
        if slant.abs() <= tol.angular {
            return ClipStep::Unchanged(body);
        }

        let origin = clip.plane.origin();
        let crossing = |v: &Point3<f64>| (origin - v).dot(&normal) / slant;
        let profile = base.profile().sample_points(&self.tessellation);
        let half_space = HalfSpace {
            plane: clip.plane,
            agreement_flag: true,
        };

        let (samples, covers_profile, operand) = if bounded {
            let Some(footprint) = self.footprint_plane(base, remaining) else {
                return ClipStep::Unchanged(body);
            };
            let polygon: Vec<Point2<f64>> = clip
                .boundary
                .sample_points(&self.tessellation)
                .iter()
                .map(|p| footprint.to_local(p))
                .collect();

            let mut samples = Vec::new();
            let mut covers_profile = true;
            for v in &profile {
                if point_in_polygon(&footprint.to_local(v), &polygon) {
                    samples.push(crossing(v));
                } else {
                    covers_profile = false;
                }
            }
            samples.extend(clip.boundary.vertices().iter().map(|p| base.parameter_of(p)));

            let operand = CutOperand::BoundedHalfSpace(BoundedHalfSpace {
                half_space,
                position: footprint,
                boundary: polygon,
            });
            (samples, covers_profile, operand)
        } else {
            let samples = profile.iter().map(crossing).collect();
            (samples, true, CutOperand::HalfSpace(half_space))
        };

        let Some((lo, hi)) = samples
            .iter()
            .copied()
            .fold(None, |acc: Option<(f64, f64)>, t| match acc {
                Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
                None => Some((t, t)),
            })
        else {
            return ClipStep::Unchanged(body);
        };

        let (start, end) = (remaining.start(), remaining.end());
        if slant > 0.0 {
            // keeps t >= t_v
            if hi <= start + tol.distance {
                return ClipStep::Unchanged(body);
            }
            if !covers_profile {
                return ClipStep::Clipped {
                    body: body.difference(operand),
                    range: remaining,
                };
            }
            if lo >= end - tol.distance {
                return ClipStep::FullyClipped;
            }
            ClipStep::Clipped {
                body: body.difference(operand),
                range: remaining.raise_start(lo),
            }
        } else {
            // keeps t <= t_v
            if lo >= end - tol.distance {
                return ClipStep::Unchanged(body);
            }
            if !covers_profile {
                return ClipStep::Clipped {
                    body: body.difference(operand),
                    range: remaining,
                };
            }
            if hi <= start + tol.distance {
                return ClipStep::FullyClipped;
            }
            ClipStep::Clipped {
                body: body.difference(operand),
                range: remaining.lower_end(hi),
            }
        }
    }

    /// Reference plane for bounded half-spaces: the profile plane moved to the
    /// start of the remaining range, with the extrusion direction as normal.
    fn footprint_plane(&self, base: &BaseExtrusion, remaining: ExtrusionRange) -> Option<Plane> {
        let direction = base.direction();
        let origin = base.position().origin() + direction * remaining.start();
        Plane::from_normal_and_x(origin, direction, base.position().x_axis())
            .or_else(|_| Plane::from_normal(origin, direction))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ifc_cut_geometry::{CurveLoop, Vector3};
    use ifc_cut_topology::FaceKey;

    fn column() -> BaseExtrusion {
        let tol = Tolerance::default();
        let profile = CurveLoop::from_polygon(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(2.0, 2.0, 0.0),
                Point3::new(0.0, 2.0, 0.0),
            ],
            &tol,
        )
        .unwrap();
        BaseExtrusion::new(
            Plane::from_normal(Point3::origin(), Vector3::z()).unwrap(),
            profile,
            Vector3::z(),
            ExtrusionRange::new(0.0, 10.0).unwrap(),
        )
        .unwrap()
    }

    /// Square clip face at height `z` spanning `[x0, x1] × [-1, 3]`, facing `up` or down.
    fn clip_at(z: f64, x0: f64, x1: f64, up: bool) -> ClipFace {
        let tol = Tolerance::default();
        let mut points = vec![
            Point3::new(x0, -1.0, z),
            Point3::new(x1, -1.0, z),
            Point3::new(x1, 3.0, z),
            Point3::new(x0, 3.0, z),
        ];
        if !up {
            points.reverse();
        }
        let boundary = CurveLoop::from_polygon(&points, &tol).unwrap();
        let plane = *boundary.plane().unwrap();
        ClipFace {
            face: FaceKey::default(),
            boundary,
            plane,
        }
    }

    fn apply(clip: &ClipFace, bounded: bool) -> ClipStep {
        let base = column();
        ClippingSynthesizer::new(&CutConfig::default()).apply(base.to_body(), &base, base.range(), clip, bounded)
    }

    #[test]
    fn downward_face_lowers_end() {
        let ClipStep::Clipped { body, range } = apply(&clip_at(6.0, -1.0, 3.0, false), false) else {
            panic!("expected clip");
        };
        assert_relative_eq!(range.start(), 0.0);
        assert_relative_eq!(range.end(), 6.0, epsilon = 1e-9);
        assert_eq!(body.operands().len(), 1);
        assert!(body.contains(&Point3::new(1.0, 1.0, 5.0)));
        assert!(!body.contains(&Point3::new(1.0, 1.0, 7.0)));
    }

    #[test]
    fn upward_face_raises_start() {
        let ClipStep::Clipped { range, .. } = apply(&clip_at(4.0, -1.0, 3.0, true), false) else {
            panic!("expected clip");
        };
        assert_relative_eq!(range.start(), 4.0, epsilon = 1e-9);
        assert_relative_eq!(range.end(), 10.0);
    }

    #[test]
    fn planes_outside_the_range() {
        assert_eq!(apply(&clip_at(-2.0, -1.0, 3.0, false), false), ClipStep::FullyClipped);
        assert_eq!(apply(&clip_at(12.0, -1.0, 3.0, true), false), ClipStep::FullyClipped);
        assert!(matches!(apply(&clip_at(12.0, -1.0, 3.0, false), false), ClipStep::Unchanged(_)));
        assert!(matches!(apply(&clip_at(-2.0, -1.0, 3.0, true), false), ClipStep::Unchanged(_)));
    }

    #[test]
    fn full_clip_holds_for_sub_ranges() {
        let base = column();
        let synthesizer = ClippingSynthesizer::new(&CutConfig::default());
        for (z, up) in [(-2.0, false), (12.0, true), (0.0, false), (10.0, true)] {
            let clip = clip_at(z, -1.0, 3.0, up);
            assert_eq!(
                synthesizer.apply(base.to_body(), &base, base.range(), &clip, false),
                ClipStep::FullyClipped
            );
            for (start, end) in [(0.0, 5.0), (3.0, 7.0), (5.0, 10.0)] {
                let sub = ExtrusionRange::new(start, end).unwrap();
                assert_eq!(
                    synthesizer.apply(base.to_body(), &base, sub, &clip, false),
                    ClipStep::FullyClipped
                );
            }
        }
    }

    #[test]
    fn partial_footprint_keeps_range() {
        let ClipStep::Clipped { body, range } = apply(&clip_at(6.0, 1.0, 3.0, false), true) else {
            panic!("expected clip");
        };
        assert_eq!(range, column().range());
        let [CutOperand::BoundedHalfSpace(_)] = body.operands().as_slice() else {
            panic!("expected bounded half-space");
        };
        assert!(!body.contains(&Point3::new(1.5, 1.0, 8.0)));
        assert!(body.contains(&Point3::new(0.5, 1.0, 8.0)));
    }

    #[test]
    fn covering_footprint_narrows_like_unbounded() {
        let ClipStep::Clipped { range, .. } = apply(&clip_at(6.0, -1.0, 3.0, false), true) else {
            panic!("expected clip");
        };
        assert_relative_eq!(range.end(), 6.0, epsilon = 1e-9);
    }
}
