//! Dense chunk storage and chunk grid coordinates.

use std::collections::HashSet;

use glam::{IVec3, Vec3};

use super::block::Block;

/// Integer coordinate identifying a chunk in the world grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Chunk containing the given world-space block position.
    pub fn from_block_pos(pos: IVec3, dims: IVec3) -> Self {
        Self {
            x: pos.x.div_euclid(dims.x),
            y: pos.y.div_euclid(dims.y),
            z: pos.z.div_euclid(dims.z),
        }
    }

    /// Chunk containing a world-space point, given the block scale.
    pub fn from_world_pos(pos: Vec3, dims: IVec3, block_scale: f32) -> Self {
        Self {
            x: (pos.x / (dims.x as f32 * block_scale)).floor() as i32,
            y: (pos.y / (dims.y as f32 * block_scale)).floor() as i32,
            z: (pos.z / (dims.z as f32 * block_scale)).floor() as i32,
        }
    }

    /// World-space block position of this chunk's minimum corner.
    pub fn origin_blocks(&self, dims: IVec3) -> IVec3 {
        IVec3::new(self.x * dims.x, self.y * dims.y, self.z * dims.z)
    }

    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// The four horizontal neighbors, the set whose availability gates a
    /// seam-free re-mesh in heightmap worlds.
    pub fn horizontal_neighbors(&self) -> [ChunkCoord; 4] {
        [
            self.offset(1, 0, 0),
            self.offset(-1, 0, 0),
            self.offset(0, 1, 0),
            self.offset(0, -1, 0),
        ]
    }
}

/// A fixed-size block of dense voxel storage addressed by a grid coordinate.
///
/// Blocks and their metadata bytes are laid out in the same row-major order;
/// every component that addresses voxels goes through [`Chunk::index`], since
/// any divergence would break face visibility and fluid addressing.
pub struct Chunk {
    pub coord: ChunkCoord,
    dims: IVec3,
    blocks: Vec<Block>,
    meta: Vec<u8>,
    /// Chunk-local positions of cactus top blocks as originally generated.
    /// The mesher picks a different atlas tile for these tops.
    pub top_cactus: HashSet<IVec3>,
}

impl Chunk {
    /// Creates a chunk filled with air.
    pub fn new(coord: ChunkCoord, dims: IVec3) -> Self {
        let len = (dims.x * dims.y * dims.z) as usize;
        Self {
            coord,
            dims,
            blocks: vec![Block::Air; len],
            meta: vec![0; len],
            top_cactus: HashSet::new(),
        }
    }

    pub fn dims(&self) -> IVec3 {
        self.dims
    }

    /// World-space block position of this chunk's minimum corner.
    pub fn origin_blocks(&self) -> IVec3 {
        self.coord.origin_blocks(self.dims)
    }

    /// Row-major index: z-major, then y, then x.
    #[inline]
    pub fn index(&self, x: i32, y: i32, z: i32) -> usize {
        (z * self.dims.y * self.dims.x + y * self.dims.x + x) as usize
    }

    pub fn contains_local(&self, p: IVec3) -> bool {
        p.cmpge(IVec3::ZERO).all() && p.cmplt(self.dims).all()
    }

    /// Block at a chunk-local position. Callers must stay in bounds; use the
    /// registry for positions that may fall into a neighbor.
    #[inline]
    pub fn block(&self, p: IVec3) -> Block {
        self.blocks[self.index(p.x, p.y, p.z)]
    }

    #[inline]
    pub fn set_block(&mut self, p: IVec3, block: Block) {
        let idx = self.index(p.x, p.y, p.z);
        self.blocks[idx] = block;
    }

    #[inline]
    pub fn meta(&self, p: IVec3) -> u8 {
        self.meta[self.index(p.x, p.y, p.z)]
    }

    #[inline]
    pub fn set_meta(&mut self, p: IVec3, value: u8) {
        let idx = self.index(p.x, p.y, p.z);
        self.meta[idx] = value;
    }
}
