//! Microtuning support for non-equal temperament scales
//!
//! Combines an SCL (scale) and a KBM (keyboard mapping) file into a
//! frequency for every MIDI note.

use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::kbm::KeyboardMapping;
use crate::scl::ScaleFile;

/// Number of MIDI notes covered by a [`TuningTable`].
pub const MIDI_NOTES: usize = 128;

/// A scale and keyboard mapping that together describe one tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TuningFile {
    /// Display name of the tuning.
    pub file_name: String,

    /// Scale degrees
    pub scale: ScaleFile,

    /// Key to degree assignment and reference pitch
    pub keyboard_mapping: KeyboardMapping,
}

impl TuningFile {
    /// Assemble a tuning from already parsed parts.
    pub fn new(
        file_name: impl Into<String>,
        scale: ScaleFile,
        keyboard_mapping: KeyboardMapping,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            scale,
            keyboard_mapping,
        }
    }

    /// Read both files, naming the tuning after the scale file.
    pub fn from_files<P: AsRef<Path>, Q: AsRef<Path>>(scl_path: P, kbm_path: Q) -> Result<Self> {
        let scl_path = scl_path.as_ref();
        let scale = ScaleFile::from_file(scl_path)?;
        let keyboard_mapping = KeyboardMapping::from_file(kbm_path)?;

        let file_name = scl_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| scale.get_filename().to_string());

        Ok(Self::new(file_name, scale, keyboard_mapping))
    }
}

/// Frequencies for every MIDI note under one tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TuningTable {
    frequencies: Vec<Option<f64>>,
}

impl Default for TuningTable {
    fn default() -> Self {
        Self::equal_temperament()
    }
}

impl From<&TuningFile> for TuningTable {
    fn from(tuning: &TuningFile) -> Self {
        Self::new(&tuning.scale, &tuning.keyboard_mapping)
    }
}

impl TuningTable {
    /// Resolve every MIDI note through `mapping` into `scale`.
    pub fn new(scale: &ScaleFile, mapping: &KeyboardMapping) -> Self {
        let reference_degree = key_degree(mapping, mapping.get_reference_note());
        let reference_ratio = reference_degree.and_then(|degree| scale.get_step_ratio(degree));

        if reference_ratio.is_none() {
            debug!(
                "tuning: reference note {} has no scale degree, table is empty",
                mapping.get_reference_note()
            );
        }

        let frequencies = (0..MIDI_NOTES as i32)
            .map(|note| {
                let reference_ratio = reference_ratio?;
                if note < mapping.get_first_note() || note > mapping.get_last_note() {
                    return None;
                }
                let ratio = scale.get_step_ratio(key_degree(mapping, note)?)?;
                Some(mapping.get_reference_frequency() * ratio / reference_ratio)
            })
            .collect();

        Self { frequencies }
    }

    /// Standard 12-tone equal temperament with A4 = 440 Hz.
    pub fn equal_temperament() -> Self {
        Self::new(
            &ScaleFile::equal_temperament(12),
            &KeyboardMapping::linear(60, 69, 440.0),
        )
    }

    /// Get frequency for a MIDI note number, `None` for silent keys.
    pub fn get_frequency(&self, midi_note: u8) -> Option<f64> {
        self.frequencies.get(midi_note as usize).copied().flatten()
    }

    /// Get cents deviation from 12-TET (A4 = 440 Hz) for a MIDI note.
    pub fn get_cents_deviation(&self, midi_note: u8) -> Option<f64> {
        let freq = self.get_frequency(midi_note)?;
        let equal_freq = 440.0 * 2.0_f64.powf((midi_note as f64 - 69.0) / 12.0);
        Some(1200.0 * (freq / equal_freq).log2())
    }

    /// Whether the key produces a pitch at all.
    pub fn is_mapped(&self, midi_note: u8) -> bool {
        self.get_frequency(midi_note).is_some()
    }

    /// All notes in MIDI order.
    pub fn get_frequencies(&self) -> &[Option<f64>] {
        &self.frequencies
    }
}

/// Scale step played by `note`, ignoring the first/last note range.
fn key_degree(mapping: &KeyboardMapping, note: i32) -> Option<i64> {
    let offset = i64::from(note) - i64::from(mapping.get_middle_note());
    let size = i64::from(mapping.get_map_size());

    if size <= 0 {
        return Some(offset);
    }

    let index = offset.rem_euclid(size) as usize;
    let octaves = offset.div_euclid(size);
    let degree = mapping.get_mapping().get(index)?.degree()?;

    Some(i64::from(degree) + octaves * i64::from(mapping.get_octave_degree()))
}
