//! Hit table reader.
//!
//! The input is a comma separated table whose first line is a header. Every
//! data row carries at least the eight columns listed in [`COLUMNS`]; extra
//! columns are ignored. Rows that cannot be turned into a [`Hit`] are skipped
//! and counted, only the first [`MAX_REPORTED_ERRORS`] of them are logged.

use std::fmt;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, info, warn};
use trackcore::data::hit::Hit;

use crate::error::{TrackError, TrackResult};

pub const COLUMNS: [&str; 8] = [
    "hit_id",
    "x",
    "y",
    "z",
    "volume_id",
    "layer_id",
    "module_id",
    "particle_id",
];

pub const MAX_REPORTED_ERRORS: usize = 10;

const PROGRESS_EVERY: usize = 100_000;

/// A field that could not be parsed into its column type.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldError {
    pub column: &'static str,
    pub token: String,
    pub reason: String,
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "column `{}`: cannot parse '{}' ({})", self.column, self.token, self.reason)
    }
}

/// Why a data row was skipped.
#[derive(Clone, Debug, PartialEq)]
pub enum RowError {
    TooFewColumns { found: usize },
    Field(FieldError),
    /// The record itself could not be decoded, e.g. invalid UTF-8.
    Unreadable(String),
}

impl Display for RowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RowError::TooFewColumns { found } => {
                write!(f, "only {} columns, expected at least {}", found, COLUMNS.len())
            }
            RowError::Field(e) => write!(f, "{}", e),
            RowError::Unreadable(reason) => write!(f, "unreadable record: {}", reason),
        }
    }
}

impl From<FieldError> for RowError {
    fn from(e: FieldError) -> Self {
        RowError::Field(e)
    }
}

/// The hits of one input table together with load bookkeeping.
#[derive(Clone, Debug, Default)]
pub struct HitTable {
    pub header: Option<String>,
    pub hits: Vec<Hit>,
    /// Lines after the header, blank ones included.
    pub lines: usize,
    pub row_errors: usize,
}

/// Remove every whitespace character from a raw token.
pub fn clean_token(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Value types of the hit columns.
pub trait ColumnValue: FromStr + Default {
    /// Integer columns stop at the first non-digit, float columns accept a
    /// fraction and an exponent.
    const INTEGRAL: bool;
}

impl ColumnValue for i32 {
    const INTEGRAL: bool = true;
}

impl ColumnValue for i64 {
    const INTEGRAL: bool = true;
}

impl ColumnValue for f64 {
    const INTEGRAL: bool = false;
}

/// Longest leading part of `token` that reads as a number, empty if it does
/// not start with one. `"2.0"` gives `"2"` for integers, `"1.5e3x"` gives
/// `"1.5e3"` for floats.
pub fn numeric_prefix(token: &str, integral: bool) -> &str {
    let bytes = token.as_bytes();
    let digits = |from: usize| bytes.iter().skip(from).take_while(|b| b.is_ascii_digit()).count();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let mut mantissa = digits(end);
    end += mantissa;

    if !integral {
        if bytes.get(end) == Some(&b'.') {
            let fraction = digits(end + 1);
            if mantissa + fraction > 0 {
                end += 1 + fraction;
                mantissa += fraction;
            }
        }
        if mantissa > 0 && matches!(bytes.get(end), Some(b'e' | b'E')) {
            let mut exp_start = end + 1;
            if matches!(bytes.get(exp_start), Some(b'+' | b'-')) {
                exp_start += 1;
            }
            let exponent = digits(exp_start);
            if exponent > 0 {
                end = exp_start + exponent;
            }
        }
    }

    if mantissa == 0 {
        return "";
    }
    &token[..end]
}

/// Parse one cleaned token from its leading number; trailing characters are
/// ignored. An empty token yields the type's zero value.
pub fn parse_field<T>(token: &str, column: &'static str) -> Result<T, FieldError>
where
    T: ColumnValue,
    T::Err: Display,
{
    if token.is_empty() {
        return Ok(T::default());
    }

    let prefix = numeric_prefix(token, T::INTEGRAL);
    // inf and nan have no digits
    let candidate = if prefix.is_empty() && !T::INTEGRAL { token } else { prefix };

    candidate.parse::<T>().map_err(|e| FieldError {
        column,
        token: token.to_string(),
        reason: e.to_string(),
    })
}

/// Turn the cleaned tokens of one data row into a hit.
pub fn parse_row<S: AsRef<str>>(tokens: &[S]) -> Result<Hit, RowError> {
    if tokens.len() < COLUMNS.len() {
        return Err(RowError::TooFewColumns { found: tokens.len() });
    }
    let t = |i: usize| tokens[i].as_ref();

    Ok(Hit::new(
        parse_field(t(0), COLUMNS[0])?,
        parse_field(t(1), COLUMNS[1])?,
        parse_field(t(2), COLUMNS[2])?,
        parse_field(t(3), COLUMNS[3])?,
        parse_field(t(4), COLUMNS[4])?,
        parse_field(t(5), COLUMNS[5])?,
        parse_field(t(6), COLUMNS[6])?,
        parse_field(t(7), COLUMNS[7])?,
    ))
}

/// Open `path` for reading, decompressing on the fly when it ends in `.zst`.
pub(crate) fn open_input(path: &Path) -> TrackResult<Box<dyn Read>> {
    let file = File::open(path).map_err(|e| TrackError::io(path, e))?;
    if is_zstd(path) {
        let decoder = zstd::Decoder::new(file).map_err(|e| TrackError::io(path, e))?;
        Ok(Box::new(decoder))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

pub(crate) fn is_zstd(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "zst")
}

/// Counts the lines passing through a reader, blank ones included.
struct LineCounter<R> {
    inner: R,
    newlines: usize,
    last: Option<u8>,
}

impl<R> LineCounter<R> {
    fn new(inner: R) -> Self {
        LineCounter { inner, newlines: 0, last: None }
    }

    /// Lines seen so far; an unterminated last line counts too.
    fn lines(&self) -> usize {
        match self.last {
            None => 0,
            Some(b'\n') => self.newlines,
            Some(_) => self.newlines + 1,
        }
    }
}

impl<R: Read> Read for LineCounter<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.newlines += buf[..n].iter().filter(|&&b| b == b'\n').count();
            self.last = Some(buf[n - 1]);
        }
        Ok(n)
    }
}

/// Read a hit table from any reader. Malformed rows are skipped and counted;
/// only I/O failures of the underlying reader are returned as errors.
pub fn read_hits_from<R: Read>(source: R) -> Result<HitTable, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(LineCounter::new(source));

    let mut table = HitTable::default();

    let header = reader.headers()?.iter().collect::<Vec<_>>().join(",");
    if !header.is_empty() {
        info!("Header detected: {}", header);
        table.header = Some(header);
    }

    let mut records = 0_u64;
    let mut next_progress = PROGRESS_EVERY;

    for result in reader.records() {
        records += 1;
        let position = match &result {
            Ok(record) => record.position(),
            Err(e) => e.position(),
        };
        let line = position.map_or(records + 1, |p| p.line());

        let parsed = match result {
            Ok(record) => {
                let tokens: Vec<String> = record.iter().map(clean_token).collect();
                parse_row(&tokens).map_err(|e| (e, tokens))
            }
            Err(e) if e.is_io_error() => return Err(e),
            Err(e) => Err((RowError::Unreadable(e.to_string()), Vec::new())),
        };

        match parsed {
            Ok(hit) => table.hits.push(hit),
            Err((error, tokens)) => {
                if table.row_errors < MAX_REPORTED_ERRORS {
                    warn!("Line {} skipped: {}", line, error);
                    if let RowError::Field(_) = error {
                        for (i, token) in tokens.iter().take(COLUMNS.len()).enumerate() {
                            debug!("  token {} ({}): '{}'", i, COLUMNS[i], token);
                        }
                    }
                }
                table.row_errors += 1;
            }
        }

        // header is line 1
        let data_lines = line.saturating_sub(1) as usize;
        if data_lines >= next_progress {
            info!("Lines processed: {} | valid hits: {}", data_lines, table.hits.len());
            next_progress = (data_lines / PROGRESS_EVERY + 1) * PROGRESS_EVERY;
        }
    }

    table.lines = reader.into_inner().lines().saturating_sub(1);

    info!(
        "Read {} lines: {} valid hits, {} errors",
        table.lines,
        table.hits.len(),
        table.row_errors
    );
    for (i, hit) in table.hits.iter().take(3).enumerate() {
        debug!("Hit {}: {}", i, hit);
    }

    Ok(table)
}

/// Read the hit table at `path`.
///
/// Fails when the file cannot be opened or when not a single valid hit was read.
pub fn read_hits(path: &Path) -> TrackResult<HitTable> {
    info!("Reading hits from {}", path.display());
    let source = open_input(path)?;
    let table = read_hits_from(source).map_err(|e| TrackError::csv(path, e))?;

    if table.hits.is_empty() {
        return Err(TrackError::EmptyDataset { path: path.to_path_buf() });
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "hit_id,x,y,z,volume_id,layer_id,module_id,particle_id\n";

    fn read(body: &str) -> HitTable {
        read_hits_from(format!("{}{}", HEADER, body).as_bytes()).unwrap()
    }

    #[test]
    fn test_reads_valid_rows() {
        let table = read("1,1.5,-2.0,30.0,8,2,14,4503737066323968\n2,3.0,4.0,5.0,8,3,1,0\n");

        assert_eq!(table.header.as_deref(), Some(HEADER.trim_end()));
        assert_eq!(table.lines, 2);
        assert_eq!(table.row_errors, 0);
        assert_eq!(
            table.hits[0],
            Hit::new(1, 1.5, -2.0, 30.0, 8, 2, 14, 4_503_737_066_323_968)
        );
        assert_eq!(table.hits[1].particle_id, 0);
    }

    #[test]
    fn test_whitespace_and_empty_tokens() {
        let table = read(" 7 , 1 .5,\t2.0 ,3,8, 4,,  \r\n");

        assert_eq!(table.row_errors, 0);
        let hit = table.hits[0];
        assert_eq!(hit.hit_id, 7);
        assert_eq!(hit.x, 1.5);
        assert_eq!(hit.layer_id, 4);
        assert_eq!(hit.module_id, 0);
        assert_eq!(hit.particle_id, 0);
    }

    #[test]
    fn test_short_row_is_counted() {
        let table = read("1,1.0,2.0,3.0,8\n2,1.0,2.0,3.0,8,1,1,5\n");

        assert_eq!(table.lines, 2);
        assert_eq!(table.row_errors, 1);
        assert_eq!(table.hits.len(), 1);
        assert_eq!(table.hits[0].hit_id, 2);
    }

    #[test]
    fn test_bad_number_is_counted() {
        let table = read("1,abc,2.0,3.0,8,1,1,5\n2,1.0,2.0,3.0,8,x1,1,5\n3,1.0,2.0,3.0,8,1,1,5\n");

        assert_eq!(table.row_errors, 2);
        assert_eq!(table.hits.len(), 1);
        assert_eq!(table.hits[0].hit_id, 3);
    }

    #[test]
    fn test_leading_number_is_used() {
        let table = read("1,1.0,2.0,3.0,8.0,2.0,1,5\n2,1.5abc,-2e1x,+3.,8,3.9,1e3,7.0\n");

        assert_eq!(table.row_errors, 0);
        assert_eq!(table.hits[0], Hit::new(1, 1.0, 2.0, 3.0, 8, 2, 1, 5));

        let hit = table.hits[1];
        assert_eq!(hit.x, 1.5);
        assert_eq!(hit.y, -20.0);
        assert_eq!(hit.z, 3.0);
        assert_eq!(hit.layer_id, 3);
        assert_eq!(hit.module_id, 1);
        assert_eq!(hit.particle_id, 7);
    }

    #[test]
    fn test_numeric_prefix() {
        assert_eq!(numeric_prefix("2.0", true), "2");
        assert_eq!(numeric_prefix("-17abc", true), "-17");
        assert_eq!(numeric_prefix("+", true), "");
        assert_eq!(numeric_prefix("abc", true), "");
        assert_eq!(numeric_prefix("2.5e-3x", false), "2.5e-3");
        assert_eq!(numeric_prefix(".5", false), ".5");
        assert_eq!(numeric_prefix("4e", false), "4");
        assert_eq!(numeric_prefix(".", false), "");

        assert_eq!(parse_field::<f64>("inf", "x").unwrap(), f64::INFINITY);
        assert!(parse_field::<i32>("inf", "layer_id").is_err());
        assert_eq!(parse_field::<i32>("", "layer_id").unwrap(), 0);
    }

    #[test]
    fn test_stray_quote_only_affects_its_row() {
        let table = read("\"1,1.0,2.0,3.0,8,1,1,5\n2,1.0,2.0,3.0,8,1,1,5\n3,1.0,2.0,3.0,8,1,1,5\n4,1.0,2.0,3.0,8,1,1,5\n");

        assert_eq!(table.lines, 4);
        assert_eq!(table.row_errors, 1);
        assert_eq!(table.hits.iter().map(|h| h.hit_id).collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[test]
    fn test_empty_lines_are_counted_not_parsed() {
        let table = read("\n1,1.0,2.0,3.0,8,1,1,5\n\n\n");

        assert_eq!(table.lines, 4);
        assert_eq!(table.row_errors, 0);
        assert_eq!(table.hits.len(), 1);
    }

    #[test]
    fn test_unterminated_last_line_is_counted() {
        let table = read("1,1.0,2.0,3.0,8,1,1,5\n2,1.0,2.0,3.0,8,1,1,5");

        assert_eq!(table.lines, 2);
        assert_eq!(table.hits.len(), 2);
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let table = read("1,1.0,2.0,3.0,8,1,1,5,0.7,extra\n");
        assert_eq!(table.hits.len(), 1);
    }

    #[test]
    fn test_parse_row_errors() {
        assert_eq!(parse_row(&["1", "2"][..]), Err(RowError::TooFewColumns { found: 2 }));

        match parse_row(&["1", "0", "0", "0", "8", "1", "1", "99999999999999999999"][..]) {
            Err(RowError::Field(e)) => assert_eq!(e.column, "particle_id"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_header_only_input() {
        let table = read("");
        assert!(table.hits.is_empty());
        assert_eq!(table.lines, 0);
    }
}
