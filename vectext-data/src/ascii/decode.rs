//! Feature stream decoder.

use std::io::BufRead;

use log::{debug, trace};
use vectext_core::{
    CategoryTag, CoordinateBuffer, Feature, FeatureStore, FeatureType, HeaderMetadata, Vertex,
};

use super::{
    COMMENT_MARKER,
    error::{DecodeError, RecordSection, Warning},
    header,
    line::{Field, Line, LineReader, Tokens},
};

/// Outcome of a successful decode pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeSummary {
    /// Features handed to the store.
    pub committed: usize,
    /// Dead records parsed and discarded.
    pub dead: usize,
    /// Non-fatal conditions met along the way.
    pub warnings: Vec<Warning>,
}

/// Parsed `<type> <vertex-count> [<category-count>]` line.
struct RecordHeader {
    line_number: usize,
    kind: FeatureType,
    vertices: usize,
    categories: usize,
}

impl RecordHeader {
    /// `None` for comment lines.
    fn parse(line: Line) -> Result<Option<Self>, DecodeError> {
        let mut chars = line.text.chars();
        let Some(tag) = chars.next() else {
            return Ok(None);
        };
        if tag == COMMENT_MARKER {
            trace!("skipping comment line {}", line.number);
            return Ok(None);
        }
        let mut tokens = Tokens::new(chars.as_str());
        let Some(vertices) = tokens.required::<i64>() else {
            return Err(DecodeError::MalformedRecordHeader {
                line_number: line.number,
                line: line.text,
            });
        };
        let categories = match tokens.optional::<i64>() {
            Field::Absent => 0,
            Field::Present(count) => count,
            Field::Malformed => {
                return Err(DecodeError::MalformedRecordHeader {
                    line_number: line.number,
                    line: line.text,
                });
            }
        };
        let (Ok(vertices), Ok(categories)) =
            (usize::try_from(vertices), usize::try_from(categories))
        else {
            return Err(DecodeError::NegativeCount {
                line_number: line.number,
                line: line.text,
            });
        };
        let kind = FeatureType::from_tag(tag);
        if kind == FeatureType::Unknown {
            return Err(DecodeError::UnknownFeatureType {
                line_number: line.number,
                tag,
                line: line.text,
            });
        }
        Ok(Some(Self {
            line_number: line.number,
            kind,
            vertices,
            categories,
        }))
    }
}

fn parse_vertex(line: Line) -> Result<Vertex, DecodeError> {
    let mut tokens = Tokens::new(&line.text);
    let planar = tokens.required::<f64>().zip(tokens.required::<f64>());
    let z = tokens.optional::<f64>();
    match (planar, z) {
        (Some((x, y)), Field::Absent) => Ok(Vertex::planar(x, y)),
        (Some((x, y)), Field::Present(z)) => Ok(Vertex::new(x, y, z)),
        _ => Err(DecodeError::MalformedVertex {
            line_number: line.number,
            line: line.text,
        }),
    }
}

fn parse_category(line: Line) -> Result<CategoryTag, DecodeError> {
    let mut tokens = Tokens::new(&line.text);
    match tokens.required::<u32>().zip(tokens.required::<u32>()) {
        Some((field, category)) => Ok(CategoryTag::new(field, category)),
        None => Err(DecodeError::MalformedCategory {
            line_number: line.number,
            line: line.text,
        }),
    }
}

/// Reads the ASCII vector format from a buffered source.
///
/// A reader owns its scratch buffers; separate readers never share state.
///
/// # Examples
/// ```
/// use std::io::Cursor;
/// use vectext_core::{FeatureStore, FeatureType, MemoryFeatureStore};
/// use vectext_data::AsciiReader;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut store = MemoryFeatureStore::new();
/// let mut reader = AsciiReader::new(Cursor::new("P  1 1\n 5.0 5.0\n 1 42\n"));
/// let summary = reader.read_features(&mut store)?;
/// assert_eq!(summary.committed, 1);
///
/// store.rewind()?;
/// let point = store.read_next()?.expect("one feature");
/// assert_eq!(point.kind, FeatureType::Point);
/// assert_eq!(point.first_category(1), Some(42));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AsciiReader<R> {
    lines: LineReader<R>,
    coordinates: CoordinateBuffer,
    categories: Vec<CategoryTag>,
}

impl<R: BufRead> AsciiReader<R> {
    /// Wrap a buffered source.
    pub const fn new(source: R) -> Self {
        Self {
            lines: LineReader::new(source),
            coordinates: CoordinateBuffer::new(),
            categories: Vec::new(),
        }
    }

    /// Read the header block into `header`.
    ///
    /// Stops after the `VERTI:` sentinel or at end of input.
    pub fn read_header(&mut self, header: &mut HeaderMetadata) -> Result<Vec<Warning>, DecodeError> {
        header::read_header(&mut self.lines, header)
    }

    /// Decode every remaining feature record into `store`.
    ///
    /// Any malformed record aborts the pass; features committed before the
    /// failure stay in the store.
    pub fn read_features<S>(&mut self, store: &mut S) -> Result<DecodeSummary, DecodeError>
    where
        S: FeatureStore + ?Sized,
    {
        let mut summary = DecodeSummary::default();
        while let Some(line) = self.lines.next_content_line()? {
            let Some(record) = RecordHeader::parse(line)? else {
                continue;
            };
            self.collect_vertices(&record)?;
            self.collect_categories(&record)?;
            let feature = Feature::new(
                record.kind,
                self.coordinates.drain_vertices(),
                std::mem::take(&mut self.categories),
            );
            if feature.kind == FeatureType::Dead {
                debug!("discarding dead record at line {}", record.line_number);
                summary.dead += 1;
                continue;
            }
            store.append_feature(&feature)?;
            summary.committed += 1;
        }
        Ok(summary)
    }

    /// Read the optional header, then the feature stream.
    ///
    /// Header metadata lands in the store's header.
    pub fn read_document<S>(
        &mut self,
        store: &mut S,
        with_header: bool,
    ) -> Result<DecodeSummary, DecodeError>
    where
        S: FeatureStore + ?Sized,
    {
        let mut warnings = if with_header {
            self.read_header(store.header_mut())?
        } else {
            Vec::new()
        };
        let mut summary = self.read_features(store)?;
        warnings.append(&mut summary.warnings);
        summary.warnings = warnings;
        Ok(summary)
    }

    fn collect_vertices(&mut self, record: &RecordHeader) -> Result<(), DecodeError> {
        self.coordinates.clear();
        for _ in 0..record.vertices {
            let line = self.next_record_line(record, RecordSection::Coordinates)?;
            self.coordinates.push(parse_vertex(line)?)?;
        }
        Ok(())
    }

    fn collect_categories(&mut self, record: &RecordHeader) -> Result<(), DecodeError> {
        self.categories.clear();
        for _ in 0..record.categories {
            let line = self.next_record_line(record, RecordSection::Categories)?;
            self.categories.push(parse_category(line)?);
        }
        Ok(())
    }

    fn next_record_line(
        &mut self,
        record: &RecordHeader,
        section: RecordSection,
    ) -> Result<Line, DecodeError> {
        self.lines
            .next_content_line()?
            .ok_or(DecodeError::UnexpectedEof {
                section,
                record_line: record.line_number,
            })
    }
}
