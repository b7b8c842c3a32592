//! Header block codec.
//!
//! The header is a run of `KEYWORD: value` lines ending at the `VERTI:`
//! sentinel (or end of input). Writing uses a fixed order and aligns every
//! value at column 14.

use std::io::{self, BufRead, Write};

use vectext_core::HeaderMetadata;

use super::{
    HEADER_SENTINEL,
    error::{DecodeError, Warning, record},
    line::{Line, LineReader},
};

enum Keyword {
    Organization,
    DigitizationDate,
    Digitizer,
    MapName,
    MapDate,
    Scale,
    Comment,
    Zone,
    Threshold,
    Edge,
}

impl Keyword {
    fn parse(text: &str) -> Option<Self> {
        Some(match text {
            "ORGANIZATION" => Self::Organization,
            "DIGIT DATE" => Self::DigitizationDate,
            "DIGIT NAME" => Self::Digitizer,
            "MAP NAME" => Self::MapName,
            "MAP DATE" => Self::MapDate,
            "MAP SCALE" => Self::Scale,
            "OTHER INFO" => Self::Comment,
            "ZONE" | "UTM ZONE" => Self::Zone,
            "MAP THRESH" => Self::Threshold,
            "WEST EDGE" | "EAST EDGE" | "SOUTH EDGE" | "NORTH EDGE" => Self::Edge,
            _ => return None,
        })
    }
}

/// Read header lines into `header` until the sentinel or end of input.
pub(crate) fn read_header<R: BufRead>(
    lines: &mut LineReader<R>,
    header: &mut HeaderMetadata,
) -> Result<Vec<Warning>, DecodeError> {
    let mut warnings = Vec::new();
    while let Some(line) = lines.next_line()? {
        if line.text.starts_with(HEADER_SENTINEL) {
            return Ok(warnings);
        }
        let Some((keyword, value)) = line.text.split_once(':') else {
            return Err(DecodeError::MalformedHeaderLine {
                line_number: line.number,
                line: line.text,
            });
        };
        let value = value.trim_start_matches(' ');
        match Keyword::parse(keyword.trim_end()) {
            Some(Keyword::Organization) => header.organization = value.to_owned(),
            Some(Keyword::DigitizationDate) => header.digitization_date = value.to_owned(),
            Some(Keyword::Digitizer) => header.digitizer = value.to_owned(),
            Some(Keyword::MapName) => header.map_name = value.to_owned(),
            Some(Keyword::MapDate) => header.map_date = value.to_owned(),
            Some(Keyword::Comment) => header.comment = value.to_owned(),
            Some(Keyword::Scale) => header.scale = parse_number(&line, keyword, value, &mut warnings),
            Some(Keyword::Zone) => header.zone = parse_number(&line, keyword, value, &mut warnings),
            Some(Keyword::Threshold) => {
                header.threshold = parse_number(&line, keyword, value, &mut warnings);
            }
            Some(Keyword::Edge) => {}
            None => record(
                &mut warnings,
                Warning::UnknownHeaderKeyword {
                    line_number: line.number,
                    line: line.text.clone(),
                },
            ),
        }
    }
    Ok(warnings)
}

/// Read the leading number of `value`, like C's `atoi` and `atof`.
///
/// Empty or non-numeric values read as zero. Text after the number is
/// ignored with a warning.
fn parse_number<T>(line: &Line, keyword: &str, value: &str, warnings: &mut Vec<Warning>) -> T
where
    T: std::str::FromStr + Default,
{
    let trimmed = value.trim();
    let (number, consumed) = (0..=trimmed.len())
        .rev()
        .filter_map(|end| trimmed.get(..end))
        .find_map(|prefix| prefix.parse().ok().map(|number| (number, prefix.len())))
        .unwrap_or_default();
    if consumed < trimmed.len() {
        record(
            warnings,
            Warning::LooseHeaderValue {
                line_number: line.number,
                keyword: keyword.trim_end().to_owned(),
                value: value.to_owned(),
            },
        );
    }
    number
}

/// Write `header` in the canonical layout, without the sentinel.
///
/// # Examples
/// ```
/// use vectext_core::HeaderMetadata;
/// use vectext_data::write_header;
///
/// let header = HeaderMetadata {
///     map_name: "Roads".into(),
///     scale: 24000,
///     ..HeaderMetadata::default()
/// };
/// let mut out = Vec::new();
/// write_header(&mut out, &header).expect("write to a Vec");
/// let text = String::from_utf8(out).expect("utf-8");
/// assert!(text.contains("MAP NAME:     Roads\n"));
/// assert!(text.ends_with("MAP THRESH:   0.000000\n"));
/// ```
pub fn write_header<W: Write + ?Sized>(out: &mut W, header: &HeaderMetadata) -> io::Result<()> {
    writeln!(out, "ORGANIZATION: {}", header.organization)?;
    writeln!(out, "DIGIT DATE:   {}", header.digitization_date)?;
    writeln!(out, "DIGIT NAME:   {}", header.digitizer)?;
    writeln!(out, "MAP NAME:     {}", header.map_name)?;
    writeln!(out, "MAP DATE:     {}", header.map_date)?;
    writeln!(out, "MAP SCALE:    {}", header.scale)?;
    writeln!(out, "OTHER INFO:   {}", header.comment)?;
    writeln!(out, "ZONE:         {}", header.zone)?;
    writeln!(out, "MAP THRESH:   {:.6}", header.threshold)
}
