// Copyright 2025 Tyler Neely (tylerneely@gmail.com).
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE.
//
// See http://creativecommons.org/licenses/MIT/ for more information.

//! Scala scale files (`.scl`).
//!
//! A scale file is a description line, a degree count, and one degree per
//! line, with `!` comments allowed anywhere:
//!
//! ```text
//! ! meantone.scl
//! !
//! 1/4-comma meantone
//!  12
//! !
//!  76.04900
//!  193.15686
//!  ...
//!  2/1
//! ```
//!
//! The 1/1 unison is implicit and always stored at index 0.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::degree::ScaleDegree;
use crate::error::{Result, TuningError};
use crate::line::{leading_token, parse_unsigned, DegreeToken, Line};

/// File name used until a comment line provides one.
pub const DEFAULT_FILE_NAME: &str = "untitled.scl";

/// Where the parser is within the non-comment lines of a scale file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SclStage {
    Description,
    DegreeCount,
    Degrees,
}

impl SclStage {
    fn next(self) -> Self {
        match self {
            SclStage::Description => SclStage::DegreeCount,
            SclStage::DegreeCount | SclStage::Degrees => SclStage::Degrees,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct SclCursor {
    stage: SclStage,
    comment_seen: bool,
    line_no: usize,
}

impl SclCursor {
    fn new() -> Self {
        Self {
            stage: SclStage::Description,
            comment_seen: false,
            line_no: 0,
        }
    }

    /// Consume one raw line into `scale`, returning the cursor for the next
    /// line.
    fn advance(self, raw: &str, scale: &mut ScaleFile) -> Result<Self> {
        let line_no = self.line_no + 1;
        scale.add_scala_content(raw);

        let mut next = SclCursor { line_no, ..self };

        match Line::classify(raw) {
            Line::Comment(text) => {
                scale.add_description(raw);
                if !self.comment_seen {
                    scale.file_name = text.to_string();
                    next.comment_seen = true;
                }
            }
            // Blank lines still count as a non-comment line.
            Line::Blank => next.stage = self.stage.next(),
            Line::Content(text) => {
                match self.stage {
                    SclStage::Description => scale.add_description(text),
                    SclStage::DegreeCount => {
                        scale.declared_count = Some(parse_unsigned(leading_token(text), line_no)?);
                    }
                    SclStage::Degrees => {
                        let token = DegreeToken::parse(leading_token(text), line_no)?;
                        scale.add_degree(token.into());
                    }
                }
                next.stage = self.stage.next();
            }
        }

        Ok(next)
    }
}

/// A parsed scale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScaleRecord")]
pub struct ScaleFile {
    degrees: Vec<ScaleDegree>,
    description: String,
    file_name: String,
    raw_content: String,
    declared_count: Option<u64>,
}

/// Serialized form of a [`ScaleFile`], checked before it becomes one.
#[derive(Deserialize)]
struct ScaleRecord {
    degrees: Vec<ScaleDegree>,
    description: String,
    file_name: String,
    raw_content: String,
    declared_count: Option<u64>,
}

impl TryFrom<ScaleRecord> for ScaleFile {
    type Error = String;

    fn try_from(record: ScaleRecord) -> std::result::Result<Self, Self::Error> {
        match record.degrees.first() {
            None => return Err("scale has no degrees, expected a leading unison".to_string()),
            Some(first) if first.get_ratio() != 1.0 => {
                return Err(format!(
                    "scale starts with ratio {}, expected the unison",
                    first.get_ratio()
                ))
            }
            Some(_) => {}
        }

        Ok(Self {
            degrees: record.degrees,
            description: record.description,
            file_name: record.file_name,
            raw_content: record.raw_content,
            declared_count: record.declared_count,
        })
    }
}

impl Default for ScaleFile {
    fn default() -> Self {
        Self::new()
    }
}

impl ScaleFile {
    /// An empty scale holding only the implicit unison.
    pub fn new() -> Self {
        Self {
            degrees: vec![ScaleDegree::unison()],
            description: String::new(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            raw_content: String::new(),
            declared_count: None,
        }
    }

    /// Parse a scale from any line source. Either the whole input parses or
    /// an error is returned.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self> {
        let mut scale = ScaleFile::new();
        let mut cursor = SclCursor::new();

        for line in reader.lines() {
            cursor = cursor.advance(&line?, &mut scale)?;
        }

        if let Some(declared) = scale.declared_count {
            let actual = scale.degrees.len() - 1;
            if declared != actual as u64 {
                debug!(
                    "SCL: '{}' declares {} degrees but lists {}",
                    scale.file_name, declared, actual
                );
            }
        }

        debug!(
            "SCL: parsed '{}' with {} degrees over {} lines",
            scale.file_name,
            scale.degrees.len(),
            cursor.line_no
        );

        Ok(scale)
    }

    /// Parse a scale held in memory.
    pub fn parse_str(text: &str) -> Result<Self> {
        if text.is_empty() {
            warn!("SCL: parsing empty input, scale holds only the unison");
        }
        Self::parse(text.as_bytes())
    }

    /// Open and parse a `.scl` file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::parse(BufReader::new(file))
    }

    /// An equal division of the octave into `steps` parts, as if read from
    /// a generated `.scl` file.
    pub fn equal_temperament(steps: u32) -> Self {
        let mut scale = ScaleFile::new();
        let name = format!("{}-EDO.scl", steps);

        let comment = format!("! {}", name);
        let description = format!("{} equal divisions of the octave", steps);
        scale.add_scala_content(&comment);
        scale.add_description(&comment);
        scale.add_scala_content("!");
        scale.add_description("!");
        scale.add_scala_content(&description);
        scale.add_description(&description);
        scale.add_scala_content(&format!(" {}", steps));
        scale.add_scala_content("!");
        scale.add_description("!");
        scale.file_name = name;
        scale.declared_count = Some(u64::from(steps));

        for step in 1..steps {
            let cents = step as f64 * 1200.0 / steps as f64;
            // Debug formatting keeps the decimal point and reads back exactly.
            scale.add_scala_content(&format!(" {:?}", cents));
            scale.add_degree(ScaleDegree::from_cents(cents));
        }
        scale.add_scala_content(" 2/1");
        scale.add_degree(ScaleDegree::from_ratio(2, 1));

        scale
    }

    /// Degree `i`, where 0 is the unison.
    pub fn get_degree(&self, i: usize) -> Result<&ScaleDegree> {
        self.degrees.get(i).ok_or(TuningError::IndexOutOfRange {
            index: i,
            len: self.degrees.len(),
        })
    }

    /// Ratio of degree `i`.
    pub fn get_ratio(&self, i: usize) -> Result<f64> {
        self.get_degree(i).map(ScaleDegree::get_ratio)
    }

    /// Display text of degree `i`.
    pub fn get_desc(&self, i: usize) -> Result<&str> {
        self.get_degree(i).map(ScaleDegree::get_desc)
    }

    /// Rewrite the display text of degree `i`.
    pub fn set_desc(&mut self, i: usize, desc: impl Into<String>) -> Result<()> {
        let len = self.degrees.len();
        let degree = self
            .degrees
            .get_mut(i)
            .ok_or(TuningError::IndexOutOfRange { index: i, len })?;
        degree.set_desc(desc);
        Ok(())
    }

    /// Number of stored degrees, counting the unison and the closing
    /// interval.
    pub fn get_scale_length(&self) -> usize {
        self.degrees.len()
    }

    /// Ratio of the last degree: the interval at which the scale repeats.
    pub fn get_period(&self) -> f64 {
        self.degrees.last().map_or(1.0, ScaleDegree::get_ratio)
    }

    /// All degrees in file order.
    pub fn get_degrees(&self) -> &[ScaleDegree] {
        &self.degrees
    }

    /// Ratio of an arbitrary step, wrapping by the period in both
    /// directions. `None` for a scale with nothing beyond the unison.
    pub fn get_step_ratio(&self, step: i64) -> Option<f64> {
        let steps = i64::try_from(self.degrees.len().checked_sub(1)?).ok()?;
        if steps == 0 {
            return None;
        }

        let periods = step.div_euclid(steps);
        let index = step.rem_euclid(steps) as usize;
        let periods = i32::try_from(periods).ok()?;

        Some(self.get_period().powi(periods) * self.degrees[index].get_ratio())
    }

    /// The degree count written in the file, if any. Never checked against
    /// the degrees actually listed.
    pub fn get_declared_count(&self) -> Option<u64> {
        self.declared_count
    }

    /// Name taken from the first comment line.
    pub fn get_filename(&self) -> &str {
        &self.file_name
    }

    /// Every comment and description line, newline joined.
    pub fn get_description(&self) -> &str {
        &self.description
    }

    /// Verbatim text of every line read.
    pub fn get_scala_content(&self) -> &str {
        &self.raw_content
    }

    /// Append a degree.
    pub fn add_degree(&mut self, degree: ScaleDegree) {
        self.degrees.push(degree);
    }

    /// Append one line to the description.
    pub fn add_description(&mut self, line: &str) {
        self.description.push_str(line);
        self.description.push('\n');
    }

    /// Append one line to the verbatim content.
    pub fn add_scala_content(&mut self, line: &str) {
        self.raw_content.push_str(line);
        self.raw_content.push('\n');
    }
}

impl FromStr for ScaleFile {
    type Err = TuningError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;

    const MEANTONE: &str = "! meanquar.scl
!
1/4-comma meantone scale. Pietro Aaron's temperament (1523)
 12
!
 76.04900
 193.15686
 310.26471
 5/4
 503.42157
 579.47057
 696.57843
 25/16
 889.73529
 1006.84314
 1082.89214
 2/1 octave
";

    #[test]
    fn test_new_holds_unison() {
        let scale = ScaleFile::new();
        assert_eq!(scale.get_scale_length(), 1);
        assert_eq!(scale.get_ratio(0).unwrap(), 1.0);
        assert_eq!(scale.get_desc(0).unwrap(), "1");
        assert_eq!(scale.get_period(), 1.0);
        assert_eq!(scale.get_filename(), DEFAULT_FILE_NAME);
    }

    #[test]
    fn test_parse_meantone() {
        let scale = ScaleFile::parse_str(MEANTONE).unwrap();

        assert_eq!(scale.get_scale_length(), 13);
        assert_eq!(scale.get_filename(), "meanquar.scl");
        assert_eq!(scale.get_declared_count(), Some(12));
        assert_eq!(scale.get_desc(4).unwrap(), "5/4");
        assert_eq!(scale.get_ratio(4).unwrap(), 1.25);
        assert_eq!(scale.get_desc(12).unwrap(), "2");
        assert_eq!(scale.get_period(), 2.0);
        assert_abs_diff_eq!(scale.get_degree(7).unwrap().cents(), 696.57843, epsilon = 1e-6);
    }

    #[test]
    fn test_description_collects_comments_and_header() {
        let scale = ScaleFile::parse_str(MEANTONE).unwrap();
        assert_eq!(
            scale.get_description(),
            "! meanquar.scl\n!\n1/4-comma meantone scale. Pietro Aaron's temperament (1523)\n!\n"
        );
    }

    #[test]
    fn test_round_trip_content() {
        let scale = ScaleFile::parse_str(MEANTONE).unwrap();
        assert_eq!(scale.get_scala_content(), MEANTONE);
    }

    #[test]
    fn test_stream_and_string_agree() {
        let from_str = ScaleFile::parse_str(MEANTONE).unwrap();
        let from_reader = ScaleFile::parse(std::io::Cursor::new(MEANTONE)).unwrap();
        assert_eq!(from_str, from_reader);
    }

    #[test]
    fn test_crlf_lines() {
        let scale = ScaleFile::parse_str("! crlf.scl\r\nTwo notes\r\n 2\r\n 3/2\r\n 2/1\r\n").unwrap();
        assert_eq!(scale.get_scale_length(), 3);
        assert_eq!(scale.get_filename(), "crlf.scl");
        assert_eq!(scale.get_scala_content(), "! crlf.scl\nTwo notes\n 2\n 3/2\n 2/1\n");
    }

    #[test]
    fn test_blank_line_advances_stage() {
        // The blank line takes the description slot, so "3" is the count.
        let scale = ScaleFile::parse_str("\n3\n 9/8\n 3/2\n 2/1\n").unwrap();
        assert_eq!(scale.get_declared_count(), Some(3));
        assert_eq!(scale.get_description(), "");
        assert_eq!(scale.get_scale_length(), 4);
    }

    #[test]
    fn test_declared_count_not_enforced() {
        let scale = ScaleFile::parse_str("short\n 5\n 3/2\n 2/1\n").unwrap();
        assert_eq!(scale.get_declared_count(), Some(5));
        assert_eq!(scale.get_scale_length(), 3);
    }

    #[test]
    fn test_empty_input_is_lenient() {
        let scale = ScaleFile::parse_str("").unwrap();
        assert_eq!(scale.get_scale_length(), 1);
        assert_eq!(scale.get_scala_content(), "");
    }

    #[test]
    fn test_malformed_degree_fails() {
        let err = ScaleFile::parse_str("bad\n 2\n 3/2\n abc\n").unwrap_err();
        assert!(matches!(err, TuningError::MalformedDegree { line: 4, .. }));
    }

    #[test]
    fn test_malformed_count_fails() {
        let err = ScaleFile::parse_str("bad\n twelve\n 2/1\n").unwrap_err();
        assert!(matches!(err, TuningError::MalformedNumber { line: 2, .. }));
    }

    #[test]
    fn test_index_out_of_range() {
        let scale = ScaleFile::parse_str(MEANTONE).unwrap();
        let len = scale.get_scale_length();
        for i in [len, len + 1, 100] {
            assert!(matches!(
                scale.get_degree(i),
                Err(TuningError::IndexOutOfRange { index, len: 13 }) if index == i
            ));
        }
        assert!(scale.get_ratio(len).is_err());
        assert!(scale.get_desc(len).is_err());
    }

    #[test]
    fn test_set_desc() {
        let mut scale = ScaleFile::parse_str(MEANTONE).unwrap();
        scale.set_desc(12, "octave").unwrap();
        assert_eq!(scale.get_desc(12).unwrap(), "octave");
        assert_eq!(scale.get_ratio(12).unwrap(), 2.0);
        assert!(scale.set_desc(13, "nope").is_err());
    }

    #[test]
    fn test_step_ratio_wraps_by_period() {
        let scale = ScaleFile::parse_str("fifths\n 2\n 3/2\n 2/1\n").unwrap();
        assert_eq!(scale.get_step_ratio(0), Some(1.0));
        assert_eq!(scale.get_step_ratio(1), Some(1.5));
        assert_eq!(scale.get_step_ratio(2), Some(2.0));
        assert_eq!(scale.get_step_ratio(3), Some(3.0));
        assert_eq!(scale.get_step_ratio(-1), Some(0.75));
        assert_eq!(scale.get_step_ratio(-2), Some(0.5));

        assert_eq!(ScaleFile::new().get_step_ratio(0), None);
    }

    #[test]
    fn test_equal_temperament() {
        let scale = ScaleFile::equal_temperament(12);
        assert_eq!(scale.get_scale_length(), 13);
        assert_eq!(scale.get_filename(), "12-EDO.scl");
        assert_eq!(scale.get_period(), 2.0);
        assert_abs_diff_eq!(scale.get_ratio(7).unwrap(), 2.0_f64.powf(7.0 / 12.0), epsilon = 1e-6);

        // The generated text parses back to the same scale.
        let reparsed = ScaleFile::parse_str(scale.get_scala_content()).unwrap();
        assert_eq!(reparsed, scale);
    }

    #[test]
    fn test_equal_temperament_uneven_division() {
        let scale = ScaleFile::equal_temperament(7);
        assert_eq!(scale.get_scale_length(), 8);
        assert_eq!(scale.get_declared_count(), Some(7));
        assert_abs_diff_eq!(scale.get_degree(3).unwrap().cents(), 3.0 * 1200.0 / 7.0, epsilon = 1e-9);

        let reparsed = ScaleFile::parse_str(scale.get_scala_content()).unwrap();
        assert_eq!(reparsed, scale);
    }

    #[test]
    fn test_json_round_trip() {
        let scale = ScaleFile::parse_str(MEANTONE).unwrap();
        let json = serde_json::to_string(&scale).unwrap();
        let restored: ScaleFile = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, scale);
    }

    #[test]
    fn test_deserialize_rejects_missing_unison() {
        let empty = r#"{"degrees":[],"description":"","file_name":"x.scl","raw_content":"","declared_count":null}"#;
        assert!(serde_json::from_str::<ScaleFile>(empty).is_err());

        let shifted = r#"{"degrees":[{"ratio":1.5,"description":"3/2"}],"description":"","file_name":"x.scl","raw_content":"","declared_count":null}"#;
        assert!(serde_json::from_str::<ScaleFile>(shifted).is_err());

        let unison_only = r#"{"degrees":[{"ratio":1.0,"description":"1"}],"description":"","file_name":"x.scl","raw_content":"","declared_count":null}"#;
        let scale: ScaleFile = serde_json::from_str(unison_only).unwrap();
        assert_eq!(scale.get_step_ratio(0), None);
    }
}
