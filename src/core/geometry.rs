//! Rectangle geometry with inclusive corners.
//!
//! A [`Rect`] carries both its size and its bottom-right corner; the two are
//! kept consistent at construction (`corner = origin + size − 1`) and the
//! value is immutable afterwards — layout code builds a fresh `Rect` per
//! resize instead of mutating one in place.

use thiserror::Error;

/// Failure to derive a consistent rectangle from the given origin/size/corner.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("zero-sized rectangle: {width}x{height}")]
    EmptySize { width: u16, height: u16 },
    #[error("corner ({corner_x},{corner_y}) lies above or left of origin ({origin_x},{origin_y})")]
    InvertedCorner {
        origin_x: u16,
        origin_y: u16,
        corner_x: u16,
        corner_y: u16,
    },
}

/// A cell position on the terminal (column, row), top-left is (0, 0).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

impl Point {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// Width/height pair in terminal cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

impl Size {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Which corner of a [`Rect`] to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// An axis-aligned rectangle with inclusive bounds.
///
/// Exactly one of {size, corner} is authoritative, picked by the constructor:
/// [`Rect::new`] derives the corner from the size, [`Rect::from_corners`]
/// derives the size from the corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    origin: Point,
    corner: Point,
    size: Size,
}

impl Rect {
    /// Build from origin + size. The corner is `origin + size − 1`, so a
    /// zero dimension would make it negative — rejected.
    pub fn new(origin: Point, size: Size) -> Result<Self, GeometryError> {
        if size.width == 0 || size.height == 0 {
            return Err(GeometryError::EmptySize {
                width: size.width,
                height: size.height,
            });
        }
        let corner = Point::new(origin.x + size.width - 1, origin.y + size.height - 1);
        Ok(Self { origin, corner, size })
    }

    /// Build from two corner points (both inclusive).
    pub fn from_corners(origin: Point, corner: Point) -> Result<Self, GeometryError> {
        if corner.x < origin.x || corner.y < origin.y {
            return Err(GeometryError::InvertedCorner {
                origin_x: origin.x,
                origin_y: origin.y,
                corner_x: corner.x,
                corner_y: corner.y,
            });
        }
        let size = Size::new(corner.x - origin.x + 1, corner.y - origin.y + 1);
        Ok(Self { origin, corner, size })
    }

    /// A copy of this rectangle with a new size, same origin.
    pub fn resize(&self, size: Size) -> Result<Self, GeometryError> {
        Self::new(self.origin, size)
    }

    pub fn corner_point(&self, which: Corner) -> Point {
        match which {
            Corner::TopLeft => self.origin,
            Corner::TopRight => Point::new(self.corner.x, self.origin.y),
            Corner::BottomLeft => Point::new(self.origin.x, self.corner.y),
            Corner::BottomRight => self.corner,
        }
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn width(&self) -> u16 {
        self.size.width
    }

    pub fn height(&self) -> u16 {
        self.size.height
    }

    pub fn x_min(&self) -> u16 {
        self.origin.x
    }

    pub fn x_max(&self) -> u16 {
        self.corner.x
    }

    pub fn y_min(&self) -> u16 {
        self.origin.y
    }

    pub fn y_max(&self) -> u16 {
        self.corner.y
    }
}

impl From<Rect> for ratatui::layout::Rect {
    fn from(r: Rect) -> Self {
        ratatui::layout::Rect::new(r.x_min(), r.y_min(), r.width(), r.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_derived_from_size() {
        let r = Rect::new(Point::new(2, 3), Size::new(10, 5)).unwrap();
        assert_eq!(r.corner_point(Corner::BottomRight), Point::new(11, 7));
        assert_eq!(r.corner_point(Corner::TopRight), Point::new(11, 3));
        assert_eq!(r.corner_point(Corner::BottomLeft), Point::new(2, 7));
    }

    #[test]
    fn size_derived_from_corner() {
        let r = Rect::from_corners(Point::new(2, 3), Point::new(11, 7)).unwrap();
        assert_eq!(r.size(), Size::new(10, 5));
    }

    #[test]
    fn round_trip_size_corner_size() {
        let a = Rect::new(Point::new(4, 1), Size::new(7, 9)).unwrap();
        let b = Rect::from_corners(a.origin(), a.corner_point(Corner::BottomRight)).unwrap();
        assert_eq!(a.size(), b.size());
        assert_eq!(a, b);
    }

    #[test]
    fn single_cell_rect() {
        let r = Rect::from_corners(Point::new(5, 5), Point::new(5, 5)).unwrap();
        assert_eq!(r.size(), Size::new(1, 1));
    }

    #[test]
    fn zero_size_rejected() {
        assert!(matches!(
            Rect::new(Point::default(), Size::new(0, 4)),
            Err(GeometryError::EmptySize { .. })
        ));
    }

    #[test]
    fn inverted_corner_rejected() {
        assert!(matches!(
            Rect::from_corners(Point::new(3, 3), Point::new(1, 5)),
            Err(GeometryError::InvertedCorner { .. })
        ));
    }

    #[test]
    fn resize_keeps_origin() {
        let r = Rect::new(Point::new(1, 1), Size::new(4, 4)).unwrap();
        let r2 = r.resize(Size::new(8, 2)).unwrap();
        assert_eq!(r2.origin(), Point::new(1, 1));
        assert_eq!(r2.corner_point(Corner::BottomRight), Point::new(8, 2));
    }
}
