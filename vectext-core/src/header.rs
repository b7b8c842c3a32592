//! Map header metadata.

/// Descriptive metadata preceding the feature stream.
///
/// The values are free-form and only ever written by the header codec;
/// numeric fields keep whatever the source declared.
///
/// # Examples
/// ```
/// use vectext_core::HeaderMetadata;
///
/// let header = HeaderMetadata {
///     organization: "Survey Office".into(),
///     scale: 24_000,
///     ..HeaderMetadata::default()
/// };
/// assert_eq!(header.zone, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeaderMetadata {
    /// Organisation that produced the map (`ORGANIZATION`).
    pub organization: String,
    /// Digitisation date (`DIGIT DATE`).
    pub digitization_date: String,
    /// Person who digitised the map (`DIGIT NAME`).
    pub digitizer: String,
    /// Map title (`MAP NAME`).
    pub map_name: String,
    /// Source map date (`MAP DATE`).
    pub map_date: String,
    /// Source map scale denominator (`MAP SCALE`).
    pub scale: i32,
    /// Free-form remarks (`OTHER INFO`).
    pub comment: String,
    /// Projection zone (`ZONE`).
    pub zone: i32,
    /// Digitising threshold (`MAP THRESH`).
    pub threshold: f64,
}
