//! Greedy quad extraction over a chunk's dense grid.
//!
//! The mesher sweeps each axis one slice at a time, comparing every cell
//! with its neighbor along the sweep to decide whether a face is visible
//! and which way it points. Visible faces land in a 2D mask which is then
//! merged into maximal rectangles, so a flat run of identical faces costs
//! one quad instead of one per cell. The sweep starts one slice before the
//! chunk so faces against the neighboring chunk are captured too; those
//! lookups go through the registry and resolve as air when the neighbor is
//! not loaded.

use glam::IVec3;
use log::warn;

use crate::voxel::block::Block;
use crate::voxel::chunk::Chunk;
use crate::voxel::registry::ChunkRegistry;

use super::mesh::ChunkMesh;

/// One cell of the face-visibility mask: the block contributing the face
/// and the face direction along the sweep axis (0 means no face).
#[derive(Clone, Copy, PartialEq, Eq)]
struct MaskCell {
    block: Block,
    normal: i8,
}

impl MaskCell {
    const EMPTY: Self = Self {
        block: Block::Null,
        normal: 0,
    };
}

/// Extracts per-material quad buffers for `chunk`. Boundary faces consult
/// the registry for neighbor occupancy; `block_scale` converts cell
/// coordinates to world units.
pub fn mesh_chunk(
    chunk: &Chunk,
    registry: &ChunkRegistry,
    material_count: usize,
    block_scale: f32,
) -> ChunkMesh {
    let dims = chunk.dims();
    let mut mesh = ChunkMesh::new(material_count);

    for axis in 0..3usize {
        let axis1 = (axis + 1) % 3;
        let axis2 = (axis + 2) % 3;

        let main_limit = dims[axis];
        let limit1 = dims[axis1];
        let limit2 = dims[axis2];

        let mut axis_mask = IVec3::ZERO;
        axis_mask[axis] = 1;

        let mut mask = vec![MaskCell::EMPTY; (limit1 * limit2) as usize];
        let mut itr = IVec3::ZERO;

        itr[axis] = -1;
        while itr[axis] < main_limit {
            // Fill the mask for the face plane between this slice and the next.
            let mut n = 0usize;
            for j in 0..limit2 {
                itr[axis2] = j;
                for i in 0..limit1 {
                    itr[axis1] = i;
                    let current = block_for_sweep(chunk, registry, itr);
                    let compare = block_for_sweep(chunk, registry, itr + axis_mask);
                    mask[n] = face_between(current, compare);
                    n += 1;
                }
            }

            itr[axis] += 1;

            // Merge mask cells into maximal rectangles, widest run first,
            // then grown downward while every row matches.
            let mut n = 0usize;
            for j in 0..limit2 {
                let mut i = 0;
                while i < limit1 {
                    let cell = mask[n];
                    if cell.normal == 0 {
                        i += 1;
                        n += 1;
                        continue;
                    }

                    let mut width = 1;
                    while i + width < limit1 && mask[n + width as usize] == cell {
                        width += 1;
                    }

                    let mut height = 1;
                    'grow: while j + height < limit2 {
                        for k in 0..width {
                            if mask[n + (k + height * limit1) as usize] != cell {
                                break 'grow;
                            }
                        }
                        height += 1;
                    }

                    itr[axis1] = i;
                    itr[axis2] = j;
                    let mut delta1 = IVec3::ZERO;
                    delta1[axis1] = width;
                    let mut delta2 = IVec3::ZERO;
                    delta2[axis2] = height;

                    emit_quad(
                        &mut mesh,
                        chunk,
                        cell,
                        axis_mask,
                        width,
                        height,
                        [itr, itr + delta1, itr + delta2, itr + delta1 + delta2],
                        block_scale,
                    );

                    for l in 0..height {
                        for k in 0..width {
                            mask[n + (k + l * limit1) as usize] = MaskCell::EMPTY;
                        }
                    }

                    i += width;
                    n += width as usize;
                }
            }
        }
    }

    mesh
}

/// Block lookup for the sweep position, which ranges one cell past the
/// chunk on every axis.
#[inline]
fn block_for_sweep(chunk: &Chunk, registry: &ChunkRegistry, p: IVec3) -> Block {
    if chunk.contains_local(p) {
        chunk.block(p)
    } else {
        registry.block_relative(chunk.coord, p)
    }
}

/// Decides whether the plane between `current` and `compare` carries a
/// face, and which of the two blocks owns it. Opaque blocks face any
/// non-solid neighbor; water faces air; logs and leaves always face each
/// other so canopies read correctly from inside.
fn face_between(current: Block, compare: Block) -> MaskCell {
    let current_solid = current.is_solid();
    let compare_solid = compare.is_solid();

    if current_solid && !compare_solid {
        MaskCell { block: current, normal: 1 }
    } else if compare_solid && !current_solid {
        MaskCell { block: compare, normal: -1 }
    } else if current == Block::Water && compare == Block::Air {
        MaskCell { block: Block::Water, normal: 1 }
    } else if compare == Block::Water && current == Block::Air {
        MaskCell { block: Block::Water, normal: -1 }
    } else if current == Block::Log && compare == Block::Leaves {
        MaskCell { block: current, normal: 1 }
    } else if compare == Block::Log && current == Block::Leaves {
        MaskCell { block: compare, normal: -1 }
    } else {
        MaskCell::EMPTY
    }
}

/// Appends one merged quad to the buffer for the block's material slot.
fn emit_quad(
    mesh: &mut ChunkMesh,
    chunk: &Chunk,
    cell: MaskCell,
    axis_mask: IVec3,
    width: i32,
    height: i32,
    corners: [IVec3; 4],
    block_scale: f32,
) {
    let slot = cell.block.material_slot();
    if slot >= mesh.buffers.len() {
        warn!(
            "dropping quad for {:?}: material slot {} exceeds configured count {}",
            cell.block,
            slot,
            mesh.buffers.len()
        );
        return;
    }

    let d = i32::from(cell.normal);
    let normal = axis_mask * d;
    // The cell that owns the face sits behind a positive-facing plane and
    // on it for a negative-facing one.
    let owner = if d > 0 { corners[0] - axis_mask } else { corners[0] };
    let atlas = texture_index(cell.block, normal, owner, chunk);

    let buffer = &mut mesh.buffers[slot];
    let base = buffer.positions.len() as i32;

    for corner in corners {
        buffer.positions.push([
            corner.x as f32 * block_scale,
            corner.y as f32 * block_scale,
            corner.z as f32 * block_scale,
        ]);
        buffer.normals.push([normal.x as f32, normal.y as f32, normal.z as f32]);
        buffer.colors.push([0, 0, 0, atlas]);
    }

    // Two triangles, wound by the face direction so front faces point along
    // the normal.
    for offset in [0, 2 + d, 2 - d, 3, 1 - d, 1 + d] {
        buffer.indices.push((base + offset) as u32);
    }

    // UVs stretch with the merged extent so a repeating atlas tile stays at
    // one texel per cell. Axis roles swap on the X sweep.
    let (w, h) = (width as f32, height as f32);
    if normal.x != 0 {
        buffer.uvs.extend_from_slice(&[[w, h], [0.0, h], [w, 0.0], [0.0, 0.0]]);
    } else {
        buffer.uvs.extend_from_slice(&[[h, w], [h, 0.0], [0.0, w], [0.0, 0.0]]);
    }
}

/// Atlas tile for a face. Grass and logs vary by face direction; cactus
/// tops keep the flower tile only on the column's original top block.
fn texture_index(block: Block, normal: IVec3, owner: IVec3, chunk: &Chunk) -> u8 {
    let up = normal.z > 0;
    let down = normal.z < 0;
    match block {
        Block::Grass => {
            if up {
                0
            } else if down {
                2
            } else {
                1
            }
        }
        Block::Dirt => 2,
        Block::Stone => 3,
        Block::Log => {
            if up || down {
                4
            } else {
                5
            }
        }
        Block::Leaves => 6,
        Block::Sand => 7,
        Block::Snow => 8,
        Block::Cactus => {
            if up {
                if chunk.top_cactus.contains(&owner) { 9 } else { 10 }
            } else if down {
                10
            } else {
                11
            }
        }
        Block::Sandstone => 12,
        Block::Water => 13,
        Block::Air | Block::Null => {
            warn!("face attributed to {block:?}; no atlas tile");
            255
        }
    }
}
