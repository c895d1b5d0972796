//! Whole-file reading and writing
//!
//! File layout:
//!   "CkMp"
//!   string table
//!   top-level sections until end of data

mod read;
mod write;

pub use read::{read_map, MapReader, ReadOptions, UnknownSectionPolicy};
pub use write::{write_map, Layout, MapWriter};

pub const SIGNATURE: [u8; 4] = *b"CkMp";
