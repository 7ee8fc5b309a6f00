use log::{debug, warn};
use std::io::{self, BufRead};

use crate::config::MAX_ZOOM;
use crate::error::{BlockError, ParseError, ParseErrorKind};
use crate::map::block::{MapBlock, Polygon, Polyline};
use crate::map::geometry::{BBox, Point16, Point32};
use crate::surface::Rgb565;

/// Longest field kept in memory; anything longer cannot be a valid number
const MAX_FIELD_LEN: usize = 64;

/// Resource limits applied while parsing one block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseLimits {
    /// Total polygon + polyline vertices allowed in one block
    pub max_points: Option<usize>,
}

/// Parse one block from a buffered reader positioned at the file start.
/// The returned block has a zero offset and is not in view.
///
/// ```text
/// Polygons:<count>
/// <color 0xRRRR>
/// <max zoom, may be empty>
/// bbox:<minX>,<minY>,<maxX>,<maxY>
/// coords:<x>,<y>;<x>,<y>;...
/// Polylines:<count>
/// <color 0xRRRR>
/// <width, may be empty>
/// <max zoom, may be empty>
/// bbox:...
/// coords:...
/// ```
///
/// Fields end at a newline, comma or semicolon. Broken numbers inside a
/// feature are logged and replaced by their default; a wrong tag or an
/// unreadable count fails the whole block.
pub fn parse_block<R: BufRead>(reader: R, limits: ParseLimits) -> Result<MapBlock, BlockError> {
    BlockParser {
        fields: Fields::new(reader),
        limits,
        points: 0,
    }
    .parse()
}

/// One raw field and the byte that ended it (`None` at end of stream)
struct Field {
    text: String,
    end: Option<u8>,
    line: usize,
    overflow: bool,
}

impl Field {
    fn trimmed(&self) -> &str {
        self.text.trim()
    }

    fn is_blank(&self) -> bool {
        self.trimmed().is_empty()
    }
}

/// Byte-level field splitter with line tracking
struct Fields<R> {
    reader: R,
    line: usize,
}

impl<R: BufRead> Fields<R> {
    fn new(reader: R) -> Self {
        Self { reader, line: 1 }
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let byte = match self.reader.fill_buf()? {
            [] => return Ok(None),
            buf => buf[0],
        };
        self.reader.consume(1);
        Ok(Some(byte))
    }

    /// Read up to (and consume) the first byte in `stops`, or end of stream.
    /// Carriage returns are dropped.
    fn read_until(&mut self, stops: &[u8]) -> io::Result<Field> {
        let line = self.line;
        let mut bytes = Vec::new();
        let mut overflow = false;
        let end = loop {
            match self.next_byte()? {
                None => break None,
                Some(b) => {
                    if b == b'\n' {
                        self.line += 1;
                    }
                    if stops.contains(&b) {
                        break Some(b);
                    }
                    if b == b'\r' {
                        continue;
                    }
                    if bytes.len() < MAX_FIELD_LEN {
                        bytes.push(b);
                    } else {
                        overflow = true;
                    }
                }
            }
        };
        Ok(Field {
            text: String::from_utf8_lossy(&bytes).into_owned(),
            end,
            line,
            overflow,
        })
    }
}

struct BlockParser<R> {
    fields: Fields<R>,
    limits: ParseLimits,
    /// Vertices accepted so far
    points: usize,
}

impl<R: BufRead> BlockParser<R> {
    fn parse(mut self) -> Result<MapBlock, BlockError> {
        let mut block = MapBlock::default();

        let count = self.section("Polygons")?;
        block.polygons.reserve(count.min(1024));
        for _ in 0..count {
            let polygon = self.polygon()?;
            block.polygons.push(polygon);
        }

        let count = self.section("Polylines")?;
        block.polylines.reserve(count.min(1024));
        for _ in 0..count {
            let polyline = self.polyline()?;
            block.polylines.push(polyline);
        }

        debug!(
            "parsed block: {} polygons, {} polylines, {} points",
            block.polygons.len(),
            block.polylines.len(),
            self.points
        );
        Ok(block)
    }

    /// `<tag>:<count>`
    fn section(&mut self, tag: &str) -> Result<usize, BlockError> {
        self.expect_tag(tag)?;
        let field = self.fields.read_until(b",;\n")?;
        if field.is_blank() {
            return Ok(0);
        }
        match field.trimmed().parse::<usize>() {
            Ok(n) if !field.overflow => Ok(n),
            _ => Err(ParseError::new(
                ParseErrorKind::MalformedNumber,
                field.line,
                format!("invalid {tag} count `{}`", field.trimmed()),
            )
            .into()),
        }
    }

    fn polygon(&mut self) -> Result<Polygon, BlockError> {
        let color = self.color()?;
        let max_zoom = self.style_number("max zoom", MAX_ZOOM)?;
        let bbox = self.bbox()?;
        let points = self.coords()?;
        Ok(Polygon {
            points,
            bbox,
            color,
            max_zoom,
        })
    }

    fn polyline(&mut self) -> Result<Polyline, BlockError> {
        let color = self.color()?;
        let width = self.style_number("width", 1)?;
        let max_zoom = self.style_number("max zoom", MAX_ZOOM)?;
        let bbox = self.bbox()?;
        let points = self.coords()?;
        Ok(Polyline {
            points,
            bbox,
            color,
            width,
            max_zoom,
        })
    }

    /// Consume `<tag>:`, skipping blank lines before it
    fn expect_tag(&mut self, tag: &str) -> Result<(), BlockError> {
        let field = loop {
            let field = self.fields.read_until(b":\n")?;
            if field.end == Some(b'\n') && field.is_blank() {
                continue;
            }
            break field;
        };
        if field.end == Some(b':') && field.trimmed() == tag {
            return Ok(());
        }
        let found = if field.end.is_none() && field.is_blank() {
            "end of file".to_string()
        } else {
            format!("`{}`", field.trimmed())
        };
        Err(ParseError::new(
            ParseErrorKind::MalformedTag,
            field.line,
            format!("expected `{tag}:`, found {found}"),
        )
        .into())
    }

    /// `0x`-prefixed RGB565 on its own line; black when unreadable
    fn color(&mut self) -> Result<Rgb565, BlockError> {
        let field = self.fields.read_until(b"\n")?;
        let text = field.trimmed();
        let parsed = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .and_then(|hex| u16::from_str_radix(hex, 16).ok());
        match parsed {
            Some(c) if !field.overflow => Ok(Rgb565(c)),
            _ => {
                warn!("line {}: invalid color `{}`, using black", field.line, text);
                Ok(Rgb565::BLACK)
            }
        }
    }

    /// Optional small number on its own line
    fn style_number(&mut self, what: &str, default: u8) -> Result<u8, BlockError> {
        let field = self.fields.read_until(b"\n")?;
        if field.is_blank() {
            return Ok(default);
        }
        match field.trimmed().parse::<u8>() {
            Ok(n) if !field.overflow => Ok(n),
            _ => {
                warn!(
                    "line {}: invalid {} `{}`, using {}",
                    field.line,
                    what,
                    field.trimmed(),
                    default
                );
                Ok(default)
            }
        }
    }

    fn bbox(&mut self) -> Result<BBox, BlockError> {
        self.expect_tag("bbox")?;
        let mut v = [0i32; 4];
        for slot in &mut v {
            let field = self.fields.read_until(b",;\n")?;
            *slot = number_or_zero::<i32>(&field);
        }
        Ok(BBox::new(Point32::new(v[0], v[1]), Point32::new(v[2], v[3])))
    }

    /// `coords:` then `x,y;` pairs up to the end of the line
    fn coords(&mut self) -> Result<Vec<Point16>, BlockError> {
        self.expect_tag("coords")?;
        let mut points = Vec::new();
        loop {
            let x = self.fields.read_until(b",\n")?;
            if x.is_blank() && x.end != Some(b',') {
                break;
            }
            let px = number_or_zero::<i16>(&x);

            let (py, end) = if x.end == Some(b',') {
                let y = self.fields.read_until(b";\n")?;
                (number_or_zero::<i16>(&y), y.end)
            } else {
                warn!("line {}: coordinate `{}` has no y, using 0", x.line, x.trimmed());
                (0, x.end)
            };

            self.charge(x.line)?;
            points.push(Point16::new(px, py));

            if end != Some(b';') {
                break;
            }
        }
        Ok(points)
    }

    /// Account for one more vertex against the point budget
    fn charge(&mut self, line: usize) -> Result<(), BlockError> {
        self.points += 1;
        match self.limits.max_points {
            Some(max) if self.points > max => Err(ParseError::new(
                ParseErrorKind::PointBudgetExceeded,
                line,
                format!("more than {max} points in block"),
            )
            .into()),
            _ => Ok(()),
        }
    }
}

/// Numeric field where empty means zero and garbage is logged as zero
fn number_or_zero<T>(field: &Field) -> T
where
    T: std::str::FromStr + Default,
{
    if field.is_blank() {
        return T::default();
    }
    match field.trimmed().parse::<T>() {
        Ok(v) if !field.overflow => v,
        _ => {
            warn!("line {}: invalid number `{}`, using 0", field.line, field.trimmed());
            T::default()
        }
    }
}
