//! On-disk format for reciprocal tables.
//!
//! A table file is a bincode-encoded [`TableFile`] behind a zlib stream. Tables are
//! loaded once, before any kernel use, and then only borrowed.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use crate::error::{FixedError, Result};
use crate::fixed_math::{ReciprocalTable, FRAC_BITS};

pub const TABLE_FILE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TableFile {
    pub version: u32,
    /// Fractional bits of the format the table was generated for.
    pub frac_bits: u32,
    pub entries: Vec<u32>,
}

impl TableFile {
    pub fn from_table(table: &ReciprocalTable<'_>) -> Self {
        Self {
            version: TABLE_FILE_VERSION,
            frac_bits: FRAC_BITS,
            entries: table.entries().to_vec(),
        }
    }

    /// Borrow the entries as a validated [`ReciprocalTable`].
    pub fn table(&self) -> Result<ReciprocalTable<'_>> {
        ReciprocalTable::new(&self.entries)
    }
}

pub fn save_table(path: impl AsRef<Path>, table: &ReciprocalTable<'_>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let mut encoder = ZlibEncoder::new(writer, Compression::default());
    bincode::serialize_into(&mut encoder, &TableFile::from_table(table))?;
    encoder.finish()?.flush()?;
    tracing::info!(path = %path.display(), "saved reciprocal table");
    Ok(())
}

/// Read a table file and check that it matches this build's format.
///
/// Only the header is checked here; call [`TableFile::table`] to validate the
/// entries against the table contract.
pub fn load_table(path: impl AsRef<Path>) -> Result<TableFile> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut decoder = ZlibDecoder::new(reader);
    let table_file: TableFile = bincode::deserialize_from(&mut decoder)?;

    if table_file.version != TABLE_FILE_VERSION {
        return Err(FixedError::TableFormat {
            reason: format!(
                "version {} (expected {})",
                table_file.version, TABLE_FILE_VERSION
            ),
        });
    }
    if table_file.frac_bits != FRAC_BITS {
        return Err(FixedError::TableFormat {
            reason: format!(
                "generated for {} fractional bits, this build uses {}",
                table_file.frac_bits, FRAC_BITS
            ),
        });
    }

    tracing::info!(path = %path.display(), entries = table_file.entries.len(), "loaded reciprocal table");
    Ok(table_file)
}
