//! Feature stream encoder.

use std::io::Write;

use log::{debug, info};
use vectext_core::{
    AttributeDriver, Feature, FeatureStore, FeatureType, FormatVersion, Region, Vertex,
};

use super::{
    HEADER_SENTINEL,
    error::{EncodeError, Warning, record},
    format::format_decimal,
    header::write_header,
    select::CategorySelector,
};

/// Layer whose first category is written to the legacy companion file.
const COMPANION_LAYER: u32 = 1;

/// Shape of the encoder output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Multi-line records: header, vertices and categories.
    #[default]
    Standard,
    /// One separator-joined line per point-like feature.
    Point,
}

/// Encoder configuration.
///
/// # Examples
/// ```
/// use vectext_data::{EncodeOptions, OutputMode};
///
/// let options = EncodeOptions {
///     mode: OutputMode::Point,
///     precision: 2,
///     separator: ",".into(),
///     ..EncodeOptions::default()
/// };
/// assert_eq!(options.layer, 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeOptions {
    /// Format version controlling tags, ordering and companion output.
    pub version: FormatVersion,
    /// Standard records or point list.
    pub mode: OutputMode,
    /// Decimal places before trimming.
    pub precision: usize,
    /// Field separator in point mode.
    pub separator: String,
    /// Clipping region for point mode; `None` disables clipping.
    pub region: Option<Region>,
    /// Attribute layer used for filtering and column export.
    pub layer: u32,
    /// Row filter clause evaluated by the attribute driver.
    pub filter: Option<String>,
    /// Attribute columns appended to each point line.
    pub columns: Vec<String>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            version: FormatVersion::Current,
            mode: OutputMode::Standard,
            precision: 8,
            separator: "|".to_owned(),
            region: None,
            layer: 1,
            filter: None,
            columns: Vec::new(),
        }
    }
}

/// Outcome of a successful encode pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeSummary {
    /// Features written to the main output.
    pub written: usize,
    /// Features left out of the main output.
    pub skipped: usize,
    /// Records written to the companion output.
    pub companion: usize,
    /// Non-fatal conditions met along the way.
    pub warnings: Vec<Warning>,
}

/// Writes stored features in the ASCII vector format.
///
/// # Examples
/// ```
/// use vectext_core::{CategoryTag, Feature, FeatureType, MemoryFeatureStore, Vertex};
/// use vectext_data::{AsciiEncoder, EncodeOptions, OutputMode};
///
/// # fn main() -> Result<(), vectext_data::EncodeError> {
/// let mut store = MemoryFeatureStore::with_features([Feature::new(
///     FeatureType::Point,
///     vec![Vertex::planar(5.0, 5.0)],
///     vec![CategoryTag::new(1, 42)],
/// )]);
/// let options = EncodeOptions {
///     mode: OutputMode::Point,
///     precision: 1,
///     ..EncodeOptions::default()
/// };
/// let mut out = Vec::new();
/// AsciiEncoder::new(&options).encode(&mut store, &mut out, None)?;
/// assert_eq!(out, b"5|5|42\n");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Copy)]
pub struct AsciiEncoder<'a> {
    options: &'a EncodeOptions,
    driver: Option<&'a dyn AttributeDriver>,
}

impl std::fmt::Debug for AsciiEncoder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsciiEncoder")
            .field("options", self.options)
            .field("driver", &self.driver.is_some())
            .finish()
    }
}

/// Per-pass state shared by the feature writers.
struct Pass<'p, 'c, W: ?Sized> {
    options: &'p EncodeOptions,
    with_z: bool,
    output: &'p mut W,
    companion: Option<&'p mut (dyn Write + 'c)>,
    selector: CategorySelector,
    summary: EncodeSummary,
    line: String,
}

impl<'a> AsciiEncoder<'a> {
    /// Encoder without attribute access.
    #[must_use]
    pub const fn new(options: &'a EncodeOptions) -> Self {
        Self {
            options,
            driver: None,
        }
    }

    /// Use `driver` to resolve filter clauses and export columns.
    #[must_use]
    pub const fn with_attribute_driver(mut self, driver: &'a dyn AttributeDriver) -> Self {
        self.driver = Some(driver);
        self
    }

    /// Write every live feature of `store` to `output`.
    ///
    /// Legacy companion records go to `companion` when one is supplied.
    /// Any store, driver or write failure aborts the pass; the attribute
    /// connection is released on every exit path.
    pub fn encode<S, W>(
        &self,
        store: &mut S,
        output: &mut W,
        companion: Option<&mut dyn Write>,
    ) -> Result<EncodeSummary, EncodeError>
    where
        S: FeatureStore + ?Sized,
        W: Write + ?Sized,
    {
        let selector = CategorySelector::resolve(
            store,
            self.options.layer,
            self.options.filter.as_deref(),
            &self.options.columns,
            self.driver,
        )?;
        let mut pass = Pass {
            options: self.options,
            with_z: store.is_3d(),
            output,
            companion,
            selector,
            summary: EncodeSummary::default(),
            line: String::new(),
        };
        store.rewind()?;
        while let Some(feature) = store.read_next()? {
            pass.feature(&feature)?;
        }
        pass.output.flush()?;
        if let Some(companion) = pass.companion.as_mut() {
            companion.flush()?;
        }
        info!(
            "encoded {} features ({} skipped)",
            pass.summary.written, pass.summary.skipped
        );
        Ok(pass.summary)
    }

    /// Write the header block and sentinel, then the features.
    ///
    /// Point mode has no header, so only the features are written.
    pub fn encode_document<S, W>(
        &self,
        store: &mut S,
        output: &mut W,
        companion: Option<&mut dyn Write>,
    ) -> Result<EncodeSummary, EncodeError>
    where
        S: FeatureStore + ?Sized,
        W: Write + ?Sized,
    {
        if self.options.mode == OutputMode::Standard {
            write_header(output, store.header())?;
            writeln!(output, "{HEADER_SENTINEL}")?;
        }
        self.encode(store, output, companion)
    }
}

impl<W: Write + ?Sized> Pass<'_, '_, W> {
    fn feature(&mut self, feature: &Feature) -> Result<(), EncodeError> {
        if !self.selector.accepts(feature) {
            return self.skip(feature, "not selected");
        }
        if self.options.mode == OutputMode::Point && !feature.kind.is_point_like() {
            return self.skip(feature, "not point-like");
        }
        if !feature.kind.has_tag() {
            record(
                &mut self.summary.warnings,
                Warning::UnknownFeatureType { kind: feature.kind },
            );
        }
        let legacy = self.options.version == FormatVersion::Legacy;
        if legacy && feature.kind == FeatureType::Centroid {
            self.write_companion(feature, 'A')?;
            return self.skip(feature, "legacy centroid");
        }
        match self.options.mode {
            OutputMode::Point => self.write_point(feature),
            OutputMode::Standard => self.write_standard(feature),
        }
    }

    fn skip(&mut self, feature: &Feature, reason: &str) -> Result<(), EncodeError> {
        debug!("skipping {} feature: {reason}", feature.kind);
        self.summary.skipped += 1;
        Ok(())
    }

    fn number(&self, value: f64) -> String {
        format_decimal(value, self.options.precision)
    }

    fn write_point(&mut self, feature: &Feature) -> Result<(), EncodeError> {
        let Some(vertex) = feature.first_vertex() else {
            return self.skip(feature, "no vertices");
        };
        let options = self.options;
        let with_z = self.with_z && options.version == FormatVersion::Current;
        if let Some(region) = &options.region {
            if !region.contains_xy(vertex) || (with_z && !region.contains_z(vertex)) {
                return self.skip(feature, "outside region");
            }
        }
        let separator = options.separator.as_str();
        let mut line = std::mem::take(&mut self.line);
        line.clear();
        line.push_str(&self.number(vertex.x));
        line.push_str(separator);
        line.push_str(&self.number(vertex.y));
        if with_z {
            line.push_str(separator);
            line.push_str(&self.number(vertex.z));
        }
        let categories: Vec<u32> = feature.categories_in(options.layer).collect();
        if let Some(&first) = categories.first() {
            if categories.len() > 1 {
                record(
                    &mut self.summary.warnings,
                    Warning::ExtraCategories {
                        exported: first,
                        count: categories.len(),
                    },
                );
            }
            line.push_str(separator);
            line.push_str(&first.to_string());
            self.selector
                .append_columns(&mut line, first, separator, options.precision)?;
        }
        line.push('\n');
        self.output.write_all(line.as_bytes())?;
        self.line = line;
        self.summary.written += 1;
        Ok(())
    }

    fn write_standard(&mut self, feature: &Feature) -> Result<(), EncodeError> {
        let version = self.options.version;
        let tag = feature.kind.tag(version);
        let count = feature.vertices.len();
        if version == FormatVersion::Current && !feature.categories.is_empty() {
            writeln!(self.output, "{tag}  {count} {}", feature.categories.len())?;
        } else {
            writeln!(self.output, "{tag}  {count}")?;
        }
        for vertex in &feature.vertices {
            let x = self.number(vertex.x);
            let y = self.number(vertex.y);
            match version {
                FormatVersion::Current if self.with_z => {
                    let z = self.number(vertex.z);
                    writeln!(self.output, " {x:<12} {y:<12} {z:<12}")?;
                }
                FormatVersion::Current => writeln!(self.output, " {x:<12} {y:<12}")?,
                FormatVersion::Legacy => writeln!(self.output, " {y:<12} {x:<12}")?,
            }
        }
        match version {
            FormatVersion::Current => {
                for tag in &feature.categories {
                    writeln!(self.output, " {:<5} {:<10}", tag.field, tag.category)?;
                }
            }
            FormatVersion::Legacy => {
                let marker = if feature.kind == FeatureType::Point { 'P' } else { 'L' };
                self.write_companion(feature, marker)?;
            }
        }
        self.summary.written += 1;
        Ok(())
    }

    /// Legacy attribute record: marker, label position and primary category.
    fn write_companion(&mut self, feature: &Feature, marker: char) -> Result<(), EncodeError> {
        let Some(category) = feature
            .first_category(COMPANION_LAYER)
            .filter(|category| *category > 0)
        else {
            return Ok(());
        };
        let Some(position) = label_position(feature, marker) else {
            return Ok(());
        };
        let x = self.number(position.x);
        let y = self.number(position.y);
        if let Some(companion) = self.companion.as_mut() {
            writeln!(companion, "{marker} {x} {y} {category}")?;
            self.summary.companion += 1;
        }
        Ok(())
    }
}

/// Single vertex for points and centroids, midpoint of the first segment
/// otherwise.
fn label_position(feature: &Feature, marker: char) -> Option<Vertex> {
    match (marker, feature.vertices.as_slice()) {
        ('L', [first, second, ..]) => Some(Vertex::planar(
            (first.x + second.x) / 2.0,
            (first.y + second.y) / 2.0,
        )),
        (_, [first, ..]) => Some(*first),
        (_, []) => None,
    }
}

#[cfg(test)]
mod tests;
