//! Physics Module - bounding volumes used for culling and ground collision

pub mod aabb;

// Simple re-exports
pub use aabb::AABB;
