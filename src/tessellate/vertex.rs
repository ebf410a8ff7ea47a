use glam::DVec2;

/// A projected point with its validity, as produced during arc subdivision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenVertex {
    pub pos: DVec2,
    pub valid: bool,
}

impl ScreenVertex {
    #[inline(always)]
    pub fn new(pos: DVec2, valid: bool) -> Self {
        Self { pos, valid }
    }

    /// Same position, flagged as a break in the line.
    #[inline(always)]
    pub fn broken(self) -> Self {
        Self { valid: false, ..self }
    }
}

/// Primitive layout of a vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    Lines,
    LineStrip,
    LineLoop,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl Topology {
    /// Vertex index pairs of the segments described by `n` vertices.
    pub fn segments(self, n: usize) -> Vec<(usize, usize)> {
        match self {
            Self::Lines => (0..n / 2).map(|i| (2 * i, 2 * i + 1)).collect(),
            Self::LineStrip => (1..n).map(|i| (i - 1, i)).collect(),
            Self::LineLoop => {
                let mut segs: Vec<_> = (1..n).map(|i| (i - 1, i)).collect();
                if n > 2 {
                    segs.push((n - 1, 0));
                }
                segs
            }
            Self::Triangles | Self::TriangleStrip | Self::TriangleFan => Vec::new(),
        }
    }

    /// Vertex index triples of the triangles described by `n` vertices.
    pub fn triangles(self, n: usize) -> Vec<[usize; 3]> {
        match self {
            Self::Triangles => (0..n / 3).map(|i| [3 * i, 3 * i + 1, 3 * i + 2]).collect(),
            Self::TriangleStrip => (2..n)
                .map(|i| if i % 2 == 0 { [i - 2, i - 1, i] } else { [i - 1, i - 2, i] })
                .collect(),
            Self::TriangleFan => (2..n).map(|i| [0, i - 1, i]).collect(),
            Self::Lines | Self::LineStrip | Self::LineLoop => Vec::new(),
        }
    }
}

/// Screen-space vertices tagged with how a renderer should assemble them.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexArray {
    pub topology: Topology,
    pub vertices: Vec<DVec2>,
}

impl VertexArray {
    pub fn new(topology: Topology) -> Self {
        Self { topology, vertices: Vec::new() }
    }

    pub fn line_strip(vertices: Vec<DVec2>) -> Self {
        Self { topology: Topology::LineStrip, vertices }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}
