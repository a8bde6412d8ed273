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

//! Reader for the Scala microtonal tuning archive formats.
//!
//! [`ScaleFile`] parses `.scl` scales, [`KeyboardMapping`] parses `.kbm`
//! keyboard mappings, and [`TuningTable`] turns a pair of them into a
//! frequency for every MIDI note.

#![warn(missing_docs)]

pub mod degree;
pub mod error;
pub mod kbm;
pub mod line;
pub mod scl;
pub mod tuning;

pub use degree::ScaleDegree;
pub use error::{MappingSizeMismatch, Result, TuningError};
pub use kbm::{KeyboardMapping, MappingEntry, NON_ENTRY};
pub use scl::ScaleFile;
pub use tuning::{TuningFile, TuningTable};
