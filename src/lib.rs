//! Voxelforge - a streaming voxel terrain core
//!
//! Generates an infinite chunked voxel world from layered noise fields,
//! converts chunks into minimal per-material quad meshes with a greedy
//! mesher, and simulates gravity-driven water spreading across chunk
//! boundaries. Rendering is left to the host; the crate's output is quad
//! buffers ready for GPU upload plus a voxel-edit entry point.

pub mod core;
pub mod voxel;
pub mod generation;
pub mod meshing;
pub mod water;
pub mod world;
