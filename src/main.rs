use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scala::{KeyboardMapping, ScaleFile, TuningTable};

/// Inspect Scala scale (.scl) and keyboard mapping (.kbm) files
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the degrees of a scale file
    Scale {
        /// Path to the .scl file
        scl_file: PathBuf,
    },
    /// Show the header and entries of a keyboard mapping file
    Mapping {
        /// Path to the .kbm file
        kbm_file: PathBuf,
    },
    /// Print the frequency of every MIDI note
    Table {
        /// Path to the .scl file
        scl_file: PathBuf,

        /// Keyboard mapping; defaults to a linear mapping with A4 = 440 Hz
        #[arg(long)]
        kbm: Option<PathBuf>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print a scale file as it was read
    Export {
        /// Path to the .scl file
        scl_file: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Scale { scl_file } => {
            let scale = load_scale(&scl_file)?;

            println!("name: {}", scale.get_filename());
            for line in scale.get_description().lines() {
                println!("  {}", line);
            }

            for (i, degree) in scale.get_degrees().iter().enumerate() {
                println!(
                    "{:3}: {:>20} {:12.6} {:10.4}c",
                    i,
                    degree.get_desc(),
                    degree.get_ratio(),
                    degree.cents()
                );
            }
            println!("period: {:.6}", scale.get_period());
        }
        Commands::Mapping { kbm_file } => {
            let kbm = load_mapping(&kbm_file)?;

            println!("map size:            {}", kbm.get_map_size());
            println!(
                "note range:          {}..={}",
                kbm.get_first_note(),
                kbm.get_last_note()
            );
            println!("middle note:         {}", kbm.get_middle_note());
            println!(
                "reference:           {} = {} Hz",
                kbm.get_reference_note(),
                kbm.get_reference_frequency()
            );
            println!("octave degree:       {}", kbm.get_octave_degree());

            for (i, entry) in kbm.get_mapping().iter().enumerate() {
                match entry.degree() {
                    Some(degree) => println!("{:3}: {}", i, degree),
                    None => println!("{:3}: x", i),
                }
            }

            if let Some(mismatch) = kbm.get_size_mismatch() {
                eprintln!("Warning: {}", mismatch);
            }
        }
        Commands::Table {
            scl_file,
            kbm,
            json,
        } => {
            let scale = load_scale(&scl_file)?;
            let mapping = match kbm {
                Some(path) => load_mapping(&path)?,
                None => KeyboardMapping::linear(60, 69, 440.0),
            };

            let table = TuningTable::new(&scale, &mapping);

            if json {
                println!("{}", serde_json::to_string_pretty(&table)?);
            } else {
                for (note, freq) in table.get_frequencies().iter().enumerate() {
                    match freq {
                        Some(freq) => println!("{:3}: {:.4} Hz", note, freq),
                        None => println!("{:3}: -", note),
                    }
                }
            }
        }
        Commands::Export { scl_file } => {
            let scale = load_scale(&scl_file)?;
            print!("{}", scale.get_scala_content());
        }
    }

    Ok(())
}

fn load_scale(path: &Path) -> Result<ScaleFile> {
    ScaleFile::from_file(path)
        .with_context(|| format!("Error reading scale file '{}'", path.display()))
}

fn load_mapping(path: &Path) -> Result<KeyboardMapping> {
    KeyboardMapping::from_file(path)
        .with_context(|| format!("Error reading keyboard mapping '{}'", path.display()))
}
