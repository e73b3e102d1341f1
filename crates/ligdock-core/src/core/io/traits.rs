use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing fixed-format structure files.
///
/// Implementors own the parsed representation of one file and know how to
/// serialize it back without disturbing content they do not interpret.
pub trait StructureFile: Sized {
    /// The error type for parsing and I/O operations.
    type Error: Error + From<io::Error>;

    /// Parses a structure from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or a recognized record is malformed.
    fn read_from(reader: &mut impl BufRead) -> Result<Self, Self::Error>;

    /// Serializes the structure to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or a value cannot be represented in
    /// the fixed-column layout.
    fn write_to(&self, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Parses a structure from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Serializes the structure to a file path, creating or truncating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
