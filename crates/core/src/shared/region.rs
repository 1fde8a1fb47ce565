/// An axis-aligned face rectangle in frame coordinates.
///
/// Regions carry no identity: the same face in consecutive frames yields
/// unrelated regions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Intersection with a `frame_width` × `frame_height` frame, or `None`
    /// if nothing of the region is visible.
    pub fn clamp_to(&self, frame_width: u32, frame_height: u32) -> Option<Region> {
        let x1 = self.x.max(0);
        let y1 = self.y.max(0);
        let x2 = self.right().min(frame_width as i32);
        let y2 = self.bottom().min(frame_height as i32);
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(Region::new(x1, y1, x2 - x1, y2 - y1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_edges() {
        let r = Region::new(10, 20, 30, 40);
        assert_eq!(r.right(), 40);
        assert_eq!(r.bottom(), 60);
    }

    #[test]
    fn test_negative_size_never_clamps() {
        assert_eq!(Region::new(0, 0, -5, 10).clamp_to(100, 100), None);
    }

    #[test]
    fn test_clamp_inside_is_unchanged() {
        let r = Region::new(10, 10, 20, 20);
        assert_eq!(r.clamp_to(100, 100), Some(r));
    }

    #[rstest]
    #[case::left_edge(Region::new(-10, 0, 30, 30), Region::new(0, 0, 20, 30))]
    #[case::top_edge(Region::new(5, -5, 10, 10), Region::new(5, 0, 10, 5))]
    #[case::bottom_right(Region::new(90, 90, 30, 30), Region::new(90, 90, 10, 10))]
    #[case::covers_frame(Region::new(-50, -50, 500, 500), Region::new(0, 0, 100, 100))]
    fn test_clamp_partial(#[case] input: Region, #[case] expected: Region) {
        assert_eq!(input.clamp_to(100, 100), Some(expected));
    }

    #[rstest]
    #[case::fully_right(Region::new(100, 0, 10, 10))]
    #[case::fully_above(Region::new(0, -20, 10, 10))]
    #[case::zero_width(Region::new(10, 10, 0, 10))]
    #[case::zero_height(Region::new(10, 10, 10, 0))]
    fn test_clamp_outside_is_none(#[case] input: Region) {
        assert_eq!(input.clamp_to(100, 100), None);
    }
}
