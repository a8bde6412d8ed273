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

//! Scala keyboard mapping files (`.kbm`).
//!
//! Seven header values followed by the mapping entries, one per line:
//!
//! ```text
//! ! map size
//! 12
//! ! first / last MIDI note
//! 0
//! 127
//! ! middle note, reference note, reference frequency
//! 60
//! 69
//! 440.0
//! ! scale degree of the formal octave
//! 12
//! ! mapping
//! 0
//! 1
//! x
//! ...
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{MappingSizeMismatch, Result, TuningError};
use crate::line::{leading_token, parse_float, parse_int, Line};

/// Raw value of an unmapped key.
pub const NON_ENTRY: i32 = -1;

/// One slot of the keyboard mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MappingEntry {
    /// Key plays this scale degree.
    Degree(i32),
    /// Key is intentionally silent (`x` in the file).
    Unmapped,
}

impl MappingEntry {
    /// Convert from the raw integer form, where [`NON_ENTRY`] means unmapped.
    pub fn from_raw(raw: i32) -> Self {
        if raw == NON_ENTRY {
            MappingEntry::Unmapped
        } else {
            MappingEntry::Degree(raw)
        }
    }

    /// Raw integer form, [`NON_ENTRY`] for unmapped keys.
    pub fn as_raw(self) -> i32 {
        match self {
            MappingEntry::Degree(degree) => degree,
            MappingEntry::Unmapped => NON_ENTRY,
        }
    }

    /// The scale degree, if mapped.
    pub fn degree(self) -> Option<i32> {
        match self {
            MappingEntry::Degree(degree) => Some(degree),
            MappingEntry::Unmapped => None,
        }
    }
}

/// Which line of the file the parser expects next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum KbmField {
    MapSize,
    FirstNote,
    LastNote,
    MiddleNote,
    ReferenceNote,
    ReferenceFrequency,
    OctaveDegree,
    MappingEntries,
}

impl KbmField {
    fn next(self) -> Self {
        match self {
            KbmField::MapSize => KbmField::FirstNote,
            KbmField::FirstNote => KbmField::LastNote,
            KbmField::LastNote => KbmField::MiddleNote,
            KbmField::MiddleNote => KbmField::ReferenceNote,
            KbmField::ReferenceNote => KbmField::ReferenceFrequency,
            KbmField::ReferenceFrequency => KbmField::OctaveDegree,
            KbmField::OctaveDegree | KbmField::MappingEntries => KbmField::MappingEntries,
        }
    }

    /// Consume one content line into `kbm`, returning the next field.
    fn advance(self, text: &str, line_no: usize, kbm: &mut KeyboardMapping) -> Result<Self> {
        let token = leading_token(text);

        match self {
            KbmField::MapSize => kbm.map_size = parse_int(token, line_no)?,
            KbmField::FirstNote => kbm.first_note = parse_int(token, line_no)?,
            KbmField::LastNote => kbm.last_note = parse_int(token, line_no)?,
            KbmField::MiddleNote => kbm.middle_note = parse_int(token, line_no)?,
            KbmField::ReferenceNote => kbm.reference_note = parse_int(token, line_no)?,
            KbmField::ReferenceFrequency => {
                kbm.reference_frequency = parse_float(token, line_no)?
            }
            KbmField::OctaveDegree => kbm.octave_degree = parse_int(token, line_no)?,
            KbmField::MappingEntries => {
                let entry = if text.eq_ignore_ascii_case("x") {
                    MappingEntry::Unmapped
                } else {
                    MappingEntry::from_raw(parse_int(token, line_no)?)
                };
                kbm.mapping.push(entry);
            }
        }

        Ok(self.next())
    }
}

/// A parsed keyboard mapping.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyboardMapping {
    map_size: i32,
    first_note: i32,
    last_note: i32,
    middle_note: i32,
    reference_note: i32,
    reference_frequency: f64,
    octave_degree: i32,
    mapping: Vec<MappingEntry>,
    raw_content: String,
}

impl KeyboardMapping {
    /// Parse a mapping from any line source.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self> {
        let mut kbm = KeyboardMapping::default();
        let mut field = KbmField::MapSize;

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            kbm.raw_content.push_str(&line);
            kbm.raw_content.push('\n');

            // Comments and blanks never move the cursor.
            if let Line::Content(text) = Line::classify(&line) {
                field = field.advance(text, idx + 1, &mut kbm)?;
            }
        }

        if field != KbmField::MappingEntries {
            warn!("KBM: input ended while expecting {:?}", field);
        }

        if let Some(mismatch) = kbm.get_size_mismatch() {
            warn!("KBM: {}", mismatch);
        }

        debug!(
            "KBM: parsed mapping of {} entries, reference note {} at {} Hz",
            kbm.mapping.len(),
            kbm.reference_note,
            kbm.reference_frequency
        );

        Ok(kbm)
    }

    /// Parse a mapping held in memory.
    pub fn parse_str(text: &str) -> Result<Self> {
        Self::parse(text.as_bytes())
    }

    /// Open and parse a `.kbm` file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::parse(BufReader::new(file))
    }

    /// A mapping with no explicit entries: every key plays
    /// `note - middle_note` scale steps.
    pub fn linear(middle_note: i32, reference_note: i32, reference_frequency: f64) -> Self {
        Self {
            map_size: 0,
            first_note: 0,
            last_note: 127,
            middle_note,
            reference_note,
            reference_frequency,
            octave_degree: 0,
            mapping: Vec::new(),
            raw_content: format!(
                "! linear keyboard mapping\n0\n0\n127\n{}\n{}\n{}\n0\n",
                middle_note, reference_note, reference_frequency
            ),
        }
    }

    /// Declared number of mapping entries.
    pub fn get_map_size(&self) -> i32 {
        self.map_size
    }

    /// First MIDI note the mapping applies to.
    pub fn get_first_note(&self) -> i32 {
        self.first_note
    }

    /// Last MIDI note the mapping applies to.
    pub fn get_last_note(&self) -> i32 {
        self.last_note
    }

    /// Key where the first mapping entry sits.
    pub fn get_middle_note(&self) -> i32 {
        self.middle_note
    }

    /// Key tuned to [`KeyboardMapping::get_reference_frequency`].
    pub fn get_reference_note(&self) -> i32 {
        self.reference_note
    }

    /// Frequency of the reference note in Hz.
    pub fn get_reference_frequency(&self) -> f64 {
        self.reference_frequency
    }

    /// Scale degree that acts as the formal octave of the mapping.
    pub fn get_octave_degree(&self) -> i32 {
        self.octave_degree
    }

    /// Mapping entries in file order.
    pub fn get_mapping(&self) -> &[MappingEntry] {
        &self.mapping
    }

    /// Mapping entries with unmapped keys as [`NON_ENTRY`].
    pub fn get_raw_mapping(&self) -> Vec<i32> {
        self.mapping.iter().map(|entry| entry.as_raw()).collect()
    }

    /// Verbatim text of every line read.
    pub fn get_kbm_content(&self) -> &str {
        &self.raw_content
    }

    /// The size mismatch, if the declared size and parsed entries disagree.
    pub fn get_size_mismatch(&self) -> Option<MappingSizeMismatch> {
        let actual = self.mapping.len();
        if i32::try_from(actual).map_or(true, |len| len != self.map_size) {
            Some(MappingSizeMismatch {
                declared: self.map_size,
                actual,
            })
        } else {
            None
        }
    }

    /// Strict check for callers that want to reject sloppy files.
    pub fn validate(&self) -> std::result::Result<(), MappingSizeMismatch> {
        match self.get_size_mismatch() {
            Some(mismatch) => Err(mismatch),
            None => Ok(()),
        }
    }
}

impl FromStr for KeyboardMapping {
    type Err = TuningError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_str(s)
    }
}
