//! Chunk registry: the session-owned map from grid coordinate to chunk.
//!
//! The registry is the sole mechanism components use to resolve neighbor
//! chunks. Boundary queries against an unregistered coordinate resolve as
//! air rather than an error, so the unexplored edge of the loaded world
//! renders as open faces instead of crashing or stalling generation.

use std::collections::HashMap;

use glam::IVec3;

use super::block::Block;
use super::chunk::{Chunk, ChunkCoord};

/// At most one chunk per coordinate; populated as chunks are generated and
/// trimmed as they fall out of draw distance.
pub struct ChunkRegistry {
    dims: IVec3,
    chunks: HashMap<ChunkCoord, Chunk>,
}

impl ChunkRegistry {
    pub fn new(dims: IVec3) -> Self {
        Self {
            dims,
            chunks: HashMap::new(),
        }
    }

    pub fn dims(&self) -> IVec3 {
        self.dims
    }

    pub fn insert(&mut self, chunk: Chunk) {
        self.chunks.insert(chunk.coord, chunk);
    }

    pub fn remove(&mut self, coord: ChunkCoord) -> Option<Chunk> {
        self.chunks.remove(&coord)
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    pub fn get_mut(&mut self, coord: ChunkCoord) -> Option<&mut Chunk> {
        self.chunks.get_mut(&coord)
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.chunks.keys().copied()
    }

    /// Chunk coordinate owning a world-space block position.
    pub fn coord_of(&self, pos: IVec3) -> ChunkCoord {
        ChunkCoord::from_block_pos(pos, self.dims)
    }

    /// Block lookup for a position expressed relative to `coord`'s local
    /// grid but possibly overflowing it. The overflow is translated into a
    /// neighbor coordinate (shifted one chunk per overflowed axis, local
    /// position wrapped into the neighbor's range); a missing neighbor
    /// reads as air. This is what lets the mesher sweep one cell past the
    /// chunk on every axis.
    pub fn block_relative(&self, coord: ChunkCoord, local: IVec3) -> Block {
        let mut neighbor = coord;
        let mut wrapped = local;
        for axis in 0..3 {
            if wrapped[axis] < 0 {
                match axis {
                    0 => neighbor.x -= 1,
                    1 => neighbor.y -= 1,
                    _ => neighbor.z -= 1,
                }
                wrapped[axis] += self.dims[axis];
            } else if wrapped[axis] >= self.dims[axis] {
                match axis {
                    0 => neighbor.x += 1,
                    1 => neighbor.y += 1,
                    _ => neighbor.z += 1,
                }
                wrapped[axis] -= self.dims[axis];
            }
        }
        match self.chunks.get(&neighbor) {
            Some(chunk) if chunk.contains_local(wrapped) => chunk.block(wrapped),
            _ => Block::Air,
        }
    }

    /// Block at a world-space position; air when no chunk owns it.
    pub fn block_at(&self, pos: IVec3) -> Block {
        let coord = self.coord_of(pos);
        match self.chunks.get(&coord) {
            Some(chunk) => chunk.block(pos - chunk.origin_blocks()),
            None => Block::Air,
        }
    }

    /// Metadata byte at a world-space position; 0 when no chunk owns it.
    pub fn meta_at(&self, pos: IVec3) -> u8 {
        let coord = self.coord_of(pos);
        match self.chunks.get(&coord) {
            Some(chunk) => chunk.meta(pos - chunk.origin_blocks()),
            None => 0,
        }
    }

    /// Write a block at a world-space position. Silent no-op when no chunk
    /// owns the position.
    pub fn set_block_at(&mut self, pos: IVec3, block: Block) {
        let coord = self.coord_of(pos);
        if let Some(chunk) = self.chunks.get_mut(&coord) {
            let local = pos - chunk.origin_blocks();
            chunk.set_block(local, block);
        }
    }

    /// Write a metadata byte at a world-space position. Silent no-op when
    /// no chunk owns the position.
    pub fn set_meta_at(&mut self, pos: IVec3, value: u8) {
        let coord = self.coord_of(pos);
        if let Some(chunk) = self.chunks.get_mut(&coord) {
            let local = pos - chunk.origin_blocks();
            chunk.set_meta(local, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_chunk(coord: ChunkCoord) -> ChunkRegistry {
        let dims = IVec3::new(16, 16, 256);
        let mut registry = ChunkRegistry::new(dims);
        registry.insert(Chunk::new(coord, dims));
        registry
    }

    #[test]
    fn test_world_round_trip_inside_chunk() {
        let mut registry = registry_with_chunk(ChunkCoord::new(0, 0, 0));
        let pos = IVec3::new(5, 5, 40);
        registry.set_block_at(pos, Block::Stone);
        assert_eq!(registry.block_at(pos), Block::Stone);
    }

    #[test]
    fn test_world_round_trip_through_neighbor() {
        let dims = IVec3::new(16, 16, 256);
        let mut registry = ChunkRegistry::new(dims);
        registry.insert(Chunk::new(ChunkCoord::new(0, 0, 0), dims));
        registry.insert(Chunk::new(ChunkCoord::new(1, 0, 0), dims));

        // Position owned by the (1,0,0) chunk.
        let pos = IVec3::new(17, 2, 60);
        registry.set_block_at(pos, Block::Sand);
        assert_eq!(registry.block_at(pos), Block::Sand);
        assert_eq!(registry.get(ChunkCoord::new(1, 0, 0)).unwrap().block(IVec3::new(1, 2, 60)), Block::Sand);
    }

    #[test]
    fn test_missing_chunk_reads_as_air_and_ignores_writes() {
        let mut registry = registry_with_chunk(ChunkCoord::new(0, 0, 0));
        let far = IVec3::new(1000, 1000, 10);
        assert_eq!(registry.block_at(far), Block::Air);
        assert_eq!(registry.meta_at(far), 0);
        registry.set_block_at(far, Block::Stone);
        assert_eq!(registry.block_at(far), Block::Air);
    }

    #[test]
    fn test_block_relative_wraps_into_neighbor() {
        let dims = IVec3::new(16, 16, 256);
        let mut registry = ChunkRegistry::new(dims);
        registry.insert(Chunk::new(ChunkCoord::new(0, 0, 0), dims));
        let mut neighbor = Chunk::new(ChunkCoord::new(-1, 0, 0), dims);
        neighbor.set_block(IVec3::new(15, 3, 10), Block::Dirt);
        registry.insert(neighbor);

        // One step past the -x face of chunk (0,0,0).
        let block = registry.block_relative(ChunkCoord::new(0, 0, 0), IVec3::new(-1, 3, 10));
        assert_eq!(block, Block::Dirt);
    }

    #[test]
    fn test_block_relative_missing_neighbor_is_air() {
        let registry = registry_with_chunk(ChunkCoord::new(0, 0, 0));
        let block = registry.block_relative(ChunkCoord::new(0, 0, 0), IVec3::new(16, 0, 0));
        assert_eq!(block, Block::Air);
    }
}
