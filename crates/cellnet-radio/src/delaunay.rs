//! Planar Delaunay triangulation (Bowyer-Watson).
//!
//! Positions are treated as planar `(lon, lat)` points. Input is rescaled to
//! the unit square before triangulating so the circumcircle tests work at any
//! map scale.

use cellnet_geo::Coord;
use std::collections::BTreeMap;

/// Half-size of the enclosing super triangle, in unit-square widths.
const SUPER_TRIANGLE_SCALE: f64 = 100.0;

/// Twice-area below which three points count as collinear.
const DEGENERATE_AREA: f64 = 1e-14;

/// Distance from the fitted line, in unit-square widths, below which a point
/// set counts as collinear.
const COLLINEAR_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Point {
    x: f64,
    y: f64,
}

#[derive(Debug, Clone, Copy)]
struct Triangle {
    vertices: [usize; 3],
    center: Point,
    radius_sq: f64,
}

impl Triangle {
    fn new(vertices: [usize; 3], points: &[Point]) -> Self {
        let [a, b, c] = vertices.map(|v| points[v]);
        let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
        if d.abs() < DEGENERATE_AREA {
            // Collinear: its circle is unbounded, so any later point evicts it.
            return Self {
                vertices,
                center: a,
                radius_sq: f64::INFINITY,
            };
        }
        let (a2, b2, c2) = (
            a.x * a.x + a.y * a.y,
            b.x * b.x + b.y * b.y,
            c.x * c.x + c.y * c.y,
        );
        let center = Point {
            x: (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d,
            y: (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d,
        };
        let radius_sq = (a.x - center.x).powi(2) + (a.y - center.y).powi(2);
        Self {
            vertices,
            center,
            radius_sq,
        }
    }

    fn circumcircle_contains(&self, p: Point) -> bool {
        if !self.radius_sq.is_finite() {
            return true;
        }
        (p.x - self.center.x).powi(2) + (p.y - self.center.y).powi(2) < self.radius_sq
    }

    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }
}

/// Rescale to the unit square. `None` when every point coincides.
fn normalize(points: &[Coord]) -> Option<Vec<Point>> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.lon, first.lat, first.lon, first.lat);
    for p in points {
        min_x = min_x.min(p.lon);
        min_y = min_y.min(p.lat);
        max_x = max_x.max(p.lon);
        max_y = max_y.max(p.lat);
    }
    let extent = (max_x - min_x).max(max_y - min_y);
    if !(extent > 0.0) {
        return None;
    }
    Some(
        points
            .iter()
            .map(|p| Point {
                x: (p.lon - min_x) / extent,
                y: (p.lat - min_y) / extent,
            })
            .collect(),
    )
}

/// Order along the line through the points, or `None` if they are not
/// collinear.
fn collinear_order(points: &[Point]) -> Option<Vec<usize>> {
    let origin = *points.first()?;
    let dist = |p: &Point| (p.x - origin.x).hypot(p.y - origin.y);
    let far = points
        .iter()
        .copied()
        .max_by(|a, b| dist(a).total_cmp(&dist(b)))?;
    let len = dist(&far);
    if len == 0.0 {
        return Some((0..points.len()).collect());
    }
    let (ux, uy) = ((far.x - origin.x) / len, (far.y - origin.y) / len);

    let mut along = Vec::with_capacity(points.len());
    for (i, p) in points.iter().enumerate() {
        let (dx, dy) = (p.x - origin.x, p.y - origin.y);
        if (dx * uy - dy * ux).abs() > COLLINEAR_TOLERANCE {
            return None;
        }
        along.push((dx * ux + dy * uy, i));
    }
    along.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    Some(along.into_iter().map(|(_, i)| i).collect())
}

/// Delaunay triangles over distinct `points`, as index triples.
///
/// Fewer than three points, or a collinear set, has no triangles. Coincident
/// points are not merged here; see [`delaunay_edges`].
pub fn triangulate(points: &[Coord]) -> Vec<[usize; 3]> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }
    let Some(mut pts) = normalize(points) else {
        return Vec::new();
    };
    if collinear_order(&pts).is_some() {
        return Vec::new();
    }

    let m = SUPER_TRIANGLE_SCALE;
    pts.push(Point { x: 0.5 - 2.0 * m, y: -m });
    pts.push(Point { x: 0.5 + 2.0 * m, y: -m });
    pts.push(Point { x: 0.5, y: 2.0 * m });

    let mut triangles = vec![Triangle::new([n, n + 1, n + 2], &pts)];
    for i in 0..n {
        let p = pts[i];
        let (bad, good): (Vec<Triangle>, Vec<Triangle>) = triangles
            .into_iter()
            .partition(|t| t.circumcircle_contains(p));

        // The cavity boundary is every edge used by exactly one bad triangle.
        let mut edge_use: BTreeMap<(usize, usize), (usize, (usize, usize))> = BTreeMap::new();
        for t in &bad {
            for (a, b) in t.edges() {
                edge_use
                    .entry((a.min(b), a.max(b)))
                    .and_modify(|(count, _)| *count += 1)
                    .or_insert((1, (a, b)));
            }
        }

        triangles = good;
        for (count, (a, b)) in edge_use.into_values() {
            if count == 1 {
                triangles.push(Triangle::new([a, b, i], &pts));
            }
        }
    }

    triangles
        .into_iter()
        .filter(|t| t.vertices.iter().all(|&v| v < n))
        .map(|t| t.vertices)
        .collect()
}

/// Undirected Delaunay edges `(i, j)` with `i < j`, sorted.
///
/// Coincident points are all joined to each other and share the edges of
/// their common position. A collinear set is joined as a path along its
/// line.
pub fn delaunay_edges(points: &[Coord]) -> Vec<(usize, usize)> {
    // Group coincident positions; the first index of each group represents it.
    let mut groups: BTreeMap<(u64, u64), Vec<usize>> = BTreeMap::new();
    for (i, p) in points.iter().enumerate() {
        groups
            .entry(((p.lon + 0.0).to_bits(), (p.lat + 0.0).to_bits()))
            .or_default()
            .push(i);
    }
    let mut members: Vec<Vec<usize>> = groups.into_values().collect();
    members.sort_by_key(|m| m[0]);
    let unique: Vec<Coord> = members.iter().map(|m| points[m[0]]).collect();

    let mut unique_edges = Vec::new();
    if unique.len() == 2 {
        unique_edges.push((0, 1));
    } else if let Some(order) = normalize(&unique).and_then(|pts| collinear_order(&pts)) {
        unique_edges.extend(order.windows(2).map(|w| (w[0], w[1])));
    } else {
        for [a, b, c] in triangulate(&unique) {
            unique_edges.extend([(a, b), (b, c), (c, a)]);
        }
    }

    let mut edges = Vec::new();
    for group in &members {
        for (k, &a) in group.iter().enumerate() {
            edges.extend(group[k + 1..].iter().map(|&b| (a.min(b), a.max(b))));
        }
    }
    for (u, v) in unique_edges {
        for &a in &members[u] {
            edges.extend(members[v].iter().map(|&b| (a.min(b), a.max(b))));
        }
    }
    edges.sort_unstable();
    edges.dedup();
    edges
}
