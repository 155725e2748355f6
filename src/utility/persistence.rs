use crate::error::IoError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{from_reader, to_writer_pretty};
use std::fs::File;
use std::io::{BufWriter, Write};

/// Writes `value` as pretty-printed JSON, replacing the file's content.
///
/// # Returns
///
/// - `Ok(())` - The file was written and flushed
/// - `Err(IoError)` - If the file cannot be created or `value` cannot be serialized
pub fn save_json<T: Serialize + ?Sized>(value: &T, path: &str) -> Result<(), IoError> {
    let file = File::create(path).map_err(IoError::StdIoError)?;
    let mut writer = BufWriter::new(file);

    to_writer_pretty(&mut writer, value).map_err(IoError::JsonError)?;

    writer.flush().map_err(IoError::StdIoError)?;

    Ok(())
}

/// Reads a value written by [`save_json`].
pub fn load_json<T: DeserializeOwned>(path: &str) -> Result<T, IoError> {
    let reader = IoError::load_in_buf_reader(path)?;
    from_reader(reader).map_err(IoError::JsonError)
}
