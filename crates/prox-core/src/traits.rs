use crate::error::Result;

/// Validate structural integrity of a geometric/topological entity.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Compute an axis-aligned bounding box that contains the whole entity.
///
/// Implementations must be conservative: the box may be larger than the
/// entity but never smaller, since distance pruning relies on it.
pub trait BoundingBox {
    type Bounds;
    fn bounding_box(&self) -> Self::Bounds;
}
