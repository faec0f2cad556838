//! Path generation: turning control points into line fragments
//!
//! Each algorithm is a lazy iterator over [`Fragment`]s. The iterators own
//! their control points and cannot be restarted. Renderers and the hit tester
//! consume the same sequence, so what is drawn is exactly what is clickable.

use serde::Deserialize;

use crate::geometry::PointF;

/// Fragments a bezier connector is sampled into unless configured otherwise
pub const DEFAULT_BEZIER_FRAGMENTS: usize = 100;

/// How connectors are drawn between their control points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineType {
    /// Smooth curve through the control points' de Casteljau evaluation
    #[default]
    Bezier,
    /// The control polygon itself, one fragment per pair
    FourWay,
    /// A single segment from the first to the last control point
    Straight,
}

impl std::fmt::Display for LineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LineType::Bezier => "bezier",
            LineType::FourWay => "four-way",
            LineType::Straight => "straight",
        })
    }
}

/// One straight piece of a connector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub start: PointF,
    pub end: PointF,
    /// Position along the connector in `[0, 1]`; exactly 1 on the last piece
    pub progress: f64,
}

impl Fragment {
    /// The fragment that ends at the destination and carries the arrowhead
    pub fn is_terminal(&self) -> bool {
        self.progress == 1.0
    }

    pub fn midpoint(&self) -> PointF {
        self.start.lerp(self.end, 0.5)
    }
}

/// Generate the fragments for `points` with the given algorithm
pub fn fragments(line_type: LineType, points: Vec<PointF>, bezier_fragments: usize) -> Fragments {
    match line_type {
        LineType::Bezier => Fragments::Bezier(BezierFragments::new(points, bezier_fragments)),
        LineType::FourWay => Fragments::FourWay(FourWayFragments::new(points)),
        LineType::Straight => Fragments::Straight(StraightFragments::new(points)),
    }
}

/// Call `action(start, end, progress)` for every fragment
pub fn for_each_fragment<F>(line_type: LineType, points: &[PointF], bezier_fragments: usize, mut action: F)
where
    F: FnMut(PointF, PointF, f64),
{
    for fragment in fragments(line_type, points.to_vec(), bezier_fragments) {
        action(fragment.start, fragment.end, fragment.progress);
    }
}

/// Call `action(start, end)` for every fragment, dropping the progress
pub fn for_each_segment<F>(line_type: LineType, points: &[PointF], bezier_fragments: usize, mut action: F)
where
    F: FnMut(PointF, PointF),
{
    for_each_fragment(line_type, points, bezier_fragments, |start, end, _| {
        action(start, end)
    });
}

/// Fragment iterator for any [`LineType`]
#[derive(Debug, Clone)]
pub enum Fragments {
    Bezier(BezierFragments),
    FourWay(FourWayFragments),
    Straight(StraightFragments),
}

impl Iterator for Fragments {
    type Item = Fragment;

    fn next(&mut self) -> Option<Fragment> {
        match self {
            Fragments::Bezier(it) => it.next(),
            Fragments::FourWay(it) => it.next(),
            Fragments::Straight(it) => it.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Fragments::Bezier(it) => it.size_hint(),
            Fragments::FourWay(it) => it.size_hint(),
            Fragments::Straight(it) => it.size_hint(),
        }
    }
}

/// Samples the curve at `count` evenly spaced parameters.
///
/// Sample `k` sits at `t = k / (count - 1)` and its fragment runs from the
/// previous sample, so the first fragment starts and ends on the first
/// control point. A single requested fragment is the chord from the first to
/// the last control point.
#[derive(Debug, Clone)]
pub struct BezierFragments {
    points: Vec<PointF>,
    scratch: Vec<PointF>,
    count: usize,
    index: usize,
    last: PointF,
}

impl BezierFragments {
    pub fn new(points: Vec<PointF>, count: usize) -> Self {
        let count = if points.len() < 2 { 0 } else { count };
        let last = points.first().copied().unwrap_or_default();
        Self {
            scratch: Vec::with_capacity(points.len()),
            points,
            count,
            index: 0,
            last,
        }
    }

    fn evaluate(&mut self, t: f64) -> PointF {
        self.scratch.clear();
        self.scratch.extend_from_slice(&self.points);
        // collapse the polygon one point at a time
        for level in (1..self.scratch.len()).rev() {
            for j in 0..level {
                self.scratch[j] = self.scratch[j].lerp(self.scratch[j + 1], t);
            }
        }
        self.scratch[0]
    }
}

impl Iterator for BezierFragments {
    type Item = Fragment;

    fn next(&mut self) -> Option<Fragment> {
        if self.index >= self.count {
            return None;
        }
        let (end, progress) = if self.count == 1 {
            (self.points[self.points.len() - 1], 1.0)
        } else {
            let t = self.index as f64 / (self.count - 1) as f64;
            (self.evaluate(t), t)
        };
        let fragment = Fragment {
            start: self.last,
            end,
            progress,
        };
        self.last = end;
        self.index += 1;
        Some(fragment)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.index;
        (remaining, Some(remaining))
    }
}

/// The control polygon: N points give N - 1 fragments, the i-th carrying
/// progress `(i + 1) / (N - 1)`
#[derive(Debug, Clone)]
pub struct FourWayFragments {
    points: Vec<PointF>,
    index: usize,
}

impl FourWayFragments {
    pub fn new(points: Vec<PointF>) -> Self {
        Self { points, index: 0 }
    }
}

impl Iterator for FourWayFragments {
    type Item = Fragment;

    fn next(&mut self) -> Option<Fragment> {
        let segments = self.points.len().saturating_sub(1);
        if self.index >= segments {
            return None;
        }
        let i = self.index;
        self.index += 1;
        Some(Fragment {
            start: self.points[i],
            end: self.points[i + 1],
            progress: (i + 1) as f64 / segments as f64,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.points.len().saturating_sub(1).saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

/// First to last control point in one fragment
#[derive(Debug, Clone)]
pub struct StraightFragments {
    segment: Option<(PointF, PointF)>,
}

impl StraightFragments {
    pub fn new(points: Vec<PointF>) -> Self {
        let segment = match (points.first(), points.last()) {
            (Some(first), Some(last)) if points.len() >= 2 => Some((*first, *last)),
            _ => None,
        };
        Self { segment }
    }
}

impl Iterator for StraightFragments {
    type Item = Fragment;

    fn next(&mut self) -> Option<Fragment> {
        self.segment.take().map(|(start, end)| Fragment {
            start,
            end,
            progress: 1.0,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::from(self.segment.is_some());
        (remaining, Some(remaining))
    }
}
