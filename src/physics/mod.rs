//! Physics Module - bounding volumes used by traces

pub mod aabb;

pub use aabb::{
    aabb_center, aabb_clip_segment, aabb_contains_point, aabb_for_cell,
    aabb_from_center_half_extents, aabb_intersects, aabb_translated, create_aabb, AABB,
};
