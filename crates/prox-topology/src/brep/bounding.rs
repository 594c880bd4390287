use prox_core::traits::BoundingBox;
use prox_math::Aabb3;

use super::face::Face;
use super::shell::Shell;

impl BoundingBox for Face {
    type Bounds = Aabb3;

    /// Box of the surface patch over the face's parameter rectangle.
    fn bounding_box(&self) -> Aabb3 {
        let (u_range, v_range) = self.param_bounds();
        self.surface().patch_bounds(u_range, v_range)
    }
}

impl BoundingBox for Shell {
    type Bounds = Aabb3;

    fn bounding_box(&self) -> Aabb3 {
        let mut boxes = self.faces().iter().map(BoundingBox::bounding_box);
        let first = boxes.next().unwrap_or_else(|| Aabb3::from_point(Default::default()));
        boxes.fold(first, |acc, b| acc.merge(&b))
    }
}
