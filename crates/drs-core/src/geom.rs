use serde::{Deserialize, Serialize};

use crate::Vector2;

/// An axis-aligned box in image coordinates (origin top-left, `y` pointing down), in
/// pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PixelBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl PixelBox {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Center of the bottom edge. This is where an upright object touches the ground.
    pub fn bottom_center(&self) -> Vector2 {
        Vector2::new(self.x + self.w / 2.0, self.bottom())
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &PixelBox) -> PixelBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        PixelBox {
            x,
            y,
            w: self.right().max(other.right()) - x,
            h: self.bottom().max(other.bottom()) - y,
        }
    }

    /// Union of all given boxes, or `None` if there are none.
    pub fn union_all<'a>(boxes: impl IntoIterator<Item = &'a PixelBox>) -> Option<PixelBox> {
        boxes
            .into_iter()
            .fold(None, |acc: Option<PixelBox>, b| match acc {
                Some(acc) => Some(acc.union(b)),
                None => Some(*b),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union() {
        let a = PixelBox::new(10.0, 20.0, 5.0, 5.0);
        let b = PixelBox::new(30.0, 0.0, 10.0, 10.0);
        let u = a.union(&b);
        assert_eq!(u, PixelBox::new(10.0, 0.0, 30.0, 25.0));
    }

    #[test]
    fn test_union_all_empty() {
        assert!(PixelBox::union_all(&Vec::<PixelBox>::new()).is_none());
    }

    #[test]
    fn test_bottom_center() {
        let b = PixelBox::new(100.0, 50.0, 20.0, 40.0);
        assert_eq!(b.bottom_center(), Vector2::new(110.0, 90.0));
    }
}
