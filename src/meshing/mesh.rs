//! Quad buffer types handed to the host renderer.

/// Geometry for one render-material slot: quad vertices as triangle lists,
/// with per-vertex normals, merged-extent UVs, and a packed color whose
/// alpha channel carries the texture-atlas index.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub colors: Vec<[u8; 4]>,
}

impl MeshData {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of quads in this buffer; every quad contributes 4 vertices.
    pub fn quad_count(&self) -> usize {
        self.positions.len() / 4
    }
}

/// One mesh per configured render material.
#[derive(Clone, Debug, Default)]
pub struct ChunkMesh {
    pub buffers: Vec<MeshData>,
}

impl ChunkMesh {
    pub fn new(material_count: usize) -> Self {
        Self {
            buffers: vec![MeshData::default(); material_count],
        }
    }

    pub fn quad_count(&self) -> usize {
        self.buffers.iter().map(MeshData::quad_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.iter().all(MeshData::is_empty)
    }
}
