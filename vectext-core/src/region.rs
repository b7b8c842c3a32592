//! Clipping region used when exporting point lists.

use geo::{Coord, Intersects, Rect};

use crate::Vertex;

/// Axis-aligned extent with an optional vertical range.
///
/// Containment includes boundary points on every axis.
///
/// # Examples
/// ```
/// use vectext_core::{Region, Vertex};
///
/// let region = Region::new(0.0, 0.0, 10.0, 10.0);
/// assert!(region.contains_xy(&Vertex::planar(10.0, 5.0)));
/// assert!(!region.contains_xy(&Vertex::planar(10.5, 5.0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    bounds: Rect<f64>,
    bottom: f64,
    top: f64,
}

impl Region {
    /// Build a region from its west, south, east and north edges.
    ///
    /// Inverted edges are swapped, so `west > east` or `south > north`
    /// describes the same extent as the ordered pair. Callers that must
    /// reject inverted input validate it before building the region.
    /// The vertical range is unbounded until [`Self::with_depth`] is applied.
    ///
    /// # Examples
    /// ```
    /// use vectext_core::Region;
    ///
    /// assert_eq!(
    ///     Region::new(10.0, 0.0, 0.0, 10.0),
    ///     Region::new(0.0, 0.0, 10.0, 10.0)
    /// );
    /// ```
    #[must_use]
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            bounds: Rect::new(Coord { x: west, y: south }, Coord { x: east, y: north }),
            bottom: f64::NEG_INFINITY,
            top: f64::INFINITY,
        }
    }

    /// Restrict the vertical range to `bottom..=top`.
    #[must_use]
    pub const fn with_depth(mut self, bottom: f64, top: f64) -> Self {
        self.bottom = bottom;
        self.top = top;
        self
    }

    /// Horizontal extent.
    #[must_use]
    pub const fn bounds(&self) -> Rect<f64> {
        self.bounds
    }

    /// Whether the vertex lies inside the horizontal extent.
    #[must_use]
    pub fn contains_xy(&self, vertex: &Vertex) -> bool {
        // `Intersects` treats boundary points as inside the rectangle.
        self.bounds.intersects(&vertex.xy())
    }

    /// Whether the vertex elevation lies inside the vertical range.
    #[must_use]
    pub fn contains_z(&self, vertex: &Vertex) -> bool {
        (self.bottom..=self.top).contains(&vertex.z)
    }
}
