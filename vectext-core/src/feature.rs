//! Geometric features and their category tags.

use std::fmt;

use geo::Coord;

/// Revision of the ASCII exchange format.
///
/// The current revision writes `x y [z]` vertex lines and a category block
/// per record. The legacy revision writes `y x` vertex lines, tags boundaries
/// as `A`, and moves category information to a companion attribute file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FormatVersion {
    /// Revision 4 of the format.
    Legacy,
    /// Revision 5 of the format.
    #[default]
    Current,
}

impl FormatVersion {
    /// Map a numeric revision to a [`FormatVersion`].
    ///
    /// Revisions below 5 are treated as legacy; 5 and above are current.
    ///
    /// # Examples
    /// ```
    /// use vectext_core::FormatVersion;
    ///
    /// assert_eq!(FormatVersion::from_number(4), FormatVersion::Legacy);
    /// assert_eq!(FormatVersion::from_number(5), FormatVersion::Current);
    /// ```
    #[must_use]
    pub const fn from_number(number: u8) -> Self {
        if number < 5 {
            Self::Legacy
        } else {
            Self::Current
        }
    }

    /// Numeric revision written in documentation and configuration.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Legacy => 4,
            Self::Current => 5,
        }
    }
}

/// Kind of a feature record.
///
/// `Dead` records are parsed but never committed. `Unknown` only appears when
/// a store hands back a kind the format has no tag for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FeatureType {
    /// Area edge.
    Boundary,
    /// Label point of an area.
    Centroid,
    /// Linear feature.
    Line,
    /// Point feature.
    Point,
    /// 3-D face.
    Face,
    /// Label point of a volume.
    Kernel,
    /// Deleted record, skipped on input.
    Dead,
    /// Kind without a text tag.
    Unknown,
}

impl FeatureType {
    /// Resolve a record tag character.
    ///
    /// Lower-case tags denote deleted records and resolve to [`Self::Dead`].
    /// Any character outside the table resolves to [`Self::Unknown`].
    ///
    /// # Examples
    /// ```
    /// use vectext_core::FeatureType;
    ///
    /// assert_eq!(FeatureType::from_tag('B'), FeatureType::Boundary);
    /// assert_eq!(FeatureType::from_tag('A'), FeatureType::Boundary);
    /// assert_eq!(FeatureType::from_tag('l'), FeatureType::Dead);
    /// assert_eq!(FeatureType::from_tag('Q'), FeatureType::Unknown);
    /// ```
    #[must_use]
    pub const fn from_tag(tag: char) -> Self {
        match tag {
            'A' | 'B' => Self::Boundary,
            'C' => Self::Centroid,
            'L' => Self::Line,
            'P' => Self::Point,
            'F' => Self::Face,
            'K' => Self::Kernel,
            'a' | 'b' | 'c' | 'l' | 'p' => Self::Dead,
            _ => Self::Unknown,
        }
    }

    /// Tag written for this kind in the given format revision.
    ///
    /// Kinds without a tag fall back to `X`.
    #[must_use]
    pub const fn tag(self, version: FormatVersion) -> char {
        match (self, version) {
            (Self::Boundary, FormatVersion::Current) => 'B',
            (Self::Boundary, FormatVersion::Legacy) => 'A',
            (Self::Centroid, _) => 'C',
            (Self::Line, _) => 'L',
            (Self::Point, _) => 'P',
            (Self::Face, _) => 'F',
            (Self::Kernel, _) => 'K',
            (Self::Dead | Self::Unknown, _) => 'X',
        }
    }

    /// Whether the kind has a dedicated output tag.
    #[must_use]
    pub const fn has_tag(self) -> bool {
        !matches!(self, Self::Dead | Self::Unknown)
    }

    /// Points and centroids: kinds located by a single vertex.
    #[must_use]
    pub const fn is_point_like(self) -> bool {
        matches!(self, Self::Point | Self::Centroid)
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Boundary => "boundary",
            Self::Centroid => "centroid",
            Self::Line => "line",
            Self::Point => "point",
            Self::Face => "face",
            Self::Kernel => "kernel",
            Self::Dead => "dead",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A single vertex. `z` is zero for planar data.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vertex {
    /// Easting.
    pub x: f64,
    /// Northing.
    pub y: f64,
    /// Elevation; zero for planar data.
    pub z: f64,
}

impl Vertex {
    /// Construct a vertex from all three ordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Construct a planar vertex with `z = 0`.
    #[must_use]
    pub const fn planar(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Horizontal position of the vertex.
    #[must_use]
    pub const fn xy(&self) -> Coord<f64> {
        Coord {
            x: self.x,
            y: self.y,
        }
    }
}

/// Association between a feature and an attribute-table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CategoryTag {
    /// Layer (field) the category belongs to.
    pub field: u32,
    /// Category identifier within the layer.
    pub category: u32,
}

impl CategoryTag {
    /// Construct a tag.
    #[must_use]
    pub const fn new(field: u32, category: u32) -> Self {
        Self { field, category }
    }
}

/// One geometric record: kind, vertices and category tags.
///
/// Categories form a multiset: duplicates are kept and order is whatever the
/// producer supplied.
///
/// # Examples
/// ```
/// use vectext_core::{CategoryTag, Feature, FeatureType, Vertex};
///
/// let feature = Feature::new(
///     FeatureType::Point,
///     vec![Vertex::planar(5.0, 5.0)],
///     vec![CategoryTag::new(1, 42)],
/// );
/// assert_eq!(feature.first_category(1), Some(42));
/// assert_eq!(feature.first_category(2), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Geometry kind.
    pub kind: FeatureType,
    /// Vertices in record order.
    pub vertices: Vec<Vertex>,
    /// Category tags in record order, duplicates included.
    pub categories: Vec<CategoryTag>,
}

impl Feature {
    /// Construct a feature from its parts.
    #[must_use]
    pub const fn new(kind: FeatureType, vertices: Vec<Vertex>, categories: Vec<CategoryTag>) -> Self {
        Self {
            kind,
            vertices,
            categories,
        }
    }

    /// Category ids attached in `field`, in stored order.
    pub fn categories_in(&self, field: u32) -> impl Iterator<Item = u32> + '_ {
        self.categories
            .iter()
            .filter(move |tag| tag.field == field)
            .map(|tag| tag.category)
    }

    /// First category id attached in `field`, if any.
    #[must_use]
    pub fn first_category(&self, field: u32) -> Option<u32> {
        self.categories_in(field).next()
    }

    /// First vertex of the feature, if any.
    #[must_use]
    pub fn first_vertex(&self) -> Option<&Vertex> {
        self.vertices.first()
    }
}
