//! Polyline strand graphs: the vertex/edge soup produced by the level builder and
//! walked by the flyaway generator.
use std::ops::Range;

use glam::{Quat, Vec3};

/// A set of vertices and edges, usually a union of disjoint open polylines.
///
/// Graphs assembled with [`StrandGraph::push_polyline`] and [`StrandGraph::append`]
/// keep track of the vertex range of each polyline; graphs created from raw parts
/// with [`StrandGraph::from_parts`] carry no polyline bookkeeping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrandGraph {
    pub vertices: Vec<Vec3>,
    pub edges: Vec<[u32; 2]>,
    polylines: Vec<Range<u32>>,
}

impl StrandGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, polylines: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            edges: Vec::with_capacity(vertices.saturating_sub(polylines)),
            polylines: Vec::with_capacity(polylines),
        }
    }

    /// Build a graph from arbitrary vertex and edge lists.
    pub fn from_parts(vertices: Vec<Vec3>, edges: Vec<[u32; 2]>) -> Self {
        debug_assert!(
            edges
                .iter()
                .all(|e| (e[0] as usize) < vertices.len() && (e[1] as usize) < vertices.len()),
            "edge references a vertex out of range"
        );
        Self {
            vertices,
            edges,
            polylines: Vec::new(),
        }
    }

    /// Straight fibre template along +Z: `count` vertices at `z = i * length / count`.
    pub fn straight_line(length: f32, count: usize) -> Self {
        let mut graph = Self::with_capacity(count, 1);
        let step = if count == 0 {
            0.0
        } else {
            length / count as f32
        };
        graph.push_polyline((0..count).map(|i| Vec3::new(0.0, 0.0, i as f32 * step)));
        graph
    }

    /// Append an open polyline through `points`.
    pub fn push_polyline<I>(&mut self, points: I)
    where
        I: IntoIterator<Item = Vec3>,
    {
        let start = self.vertices.len() as u32;
        self.vertices.extend(points);
        let end = self.vertices.len() as u32;
        if end == start {
            return;
        }
        self.edges.extend((start..end - 1).map(|i| [i, i + 1]));
        self.polylines.push(start..end);
    }

    /// Union with `other`. Vertices are never shared between the two.
    pub fn append(&mut self, other: &StrandGraph) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.edges
            .extend(other.edges.iter().map(|e| [e[0] + offset, e[1] + offset]));
        self.polylines.extend(
            other
                .polylines
                .iter()
                .map(|r| (r.start + offset)..(r.end + offset)),
        );
    }

    /// Union of all `graphs`.
    pub fn merge<'a, I>(graphs: I) -> Self
    where
        I: IntoIterator<Item = &'a StrandGraph>,
    {
        let mut out = Self::new();
        for g in graphs {
            out.append(g);
        }
        out
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Number of tracked polylines.
    pub fn polyline_count(&self) -> usize {
        self.polylines.len()
    }

    /// Vertex slices of the tracked polylines, in insertion order.
    pub fn polylines(&self) -> impl Iterator<Item = &[Vec3]> + '_ {
        self.polylines
            .iter()
            .map(|r| &self.vertices[r.start as usize..r.end as usize])
    }

    /// Largest local z over all vertices, or 0 for an empty graph.
    pub fn max_z(&self) -> f32 {
        self.vertices
            .iter()
            .map(|v| v.z)
            .fold(None, |acc: Option<f32>, z| Some(acc.map_or(z, |a| a.max(z))))
            .unwrap_or(0.0)
    }

    /// Scale the cross-section about the local origin; z is untouched.
    pub fn scale_xy(&mut self, sx: f32, sy: f32) {
        for v in &mut self.vertices {
            v.x *= sx;
            v.y *= sy;
        }
    }

    /// Rotate about the +Z axis through the local origin.
    pub fn rotate_z(&mut self, angle: f32) {
        let q = Quat::from_rotation_z(angle);
        for v in &mut self.vertices {
            *v = q * *v;
        }
    }

    pub fn map_vertices<F>(&mut self, mut f: F)
    where
        F: FnMut(Vec3) -> Vec3,
    {
        for v in &mut self.vertices {
            *v = f(*v);
        }
    }

    /// Per-vertex incident edge lists.
    pub fn adjacency(&self) -> Adjacency {
        Adjacency::build(self.vertices.len(), &self.edges)
    }
}

/// Compressed incident-edge lists for a [`StrandGraph`].
///
/// Edges incident to a vertex are listed in edge-index order.
#[derive(Debug, Clone)]
pub struct Adjacency {
    offsets: Vec<u32>,
    incident: Vec<u32>,
}

impl Adjacency {
    fn build(vertex_count: usize, edges: &[[u32; 2]]) -> Self {
        let mut degree = vec![0u32; vertex_count];
        for e in edges {
            degree[e[0] as usize] += 1;
            if e[1] != e[0] {
                degree[e[1] as usize] += 1;
            }
        }

        let mut offsets = Vec::with_capacity(vertex_count + 1);
        offsets.push(0u32);
        for d in &degree {
            let last = *offsets.last().unwrap_or(&0);
            offsets.push(last + d);
        }

        let mut fill: Vec<u32> = offsets[..vertex_count].to_vec();
        let mut incident = vec![0u32; *offsets.last().unwrap_or(&0) as usize];
        for (i, e) in edges.iter().enumerate() {
            for (k, &v) in e.iter().enumerate() {
                if k == 1 && e[1] == e[0] {
                    continue;
                }
                let slot = &mut fill[v as usize];
                incident[*slot as usize] = i as u32;
                *slot += 1;
            }
        }

        Self { offsets, incident }
    }

    pub fn vertex_count(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn degree(&self, vertex: usize) -> usize {
        (self.offsets[vertex + 1] - self.offsets[vertex]) as usize
    }

    pub fn incident_edges(&self, vertex: usize) -> &[u32] {
        &self.incident[self.offsets[vertex] as usize..self.offsets[vertex + 1] as usize]
    }
}

/// The endpoint of `edge` opposite to `vertex`.
#[inline]
pub fn other_end(edge: [u32; 2], vertex: u32) -> u32 {
    if edge[0] == vertex {
        edge[1]
    } else {
        edge[0]
    }
}
