use std::fs::File;
use std::io as std_io;
use std::io::{Read, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    JsonPretty,
}

pub fn serialize<T: Serialize>(data: &T, format: Format) -> std_io::Result<Vec<u8>> {
    let result = match format {
        Format::Json => serde_json::to_string(data),
        Format::JsonPretty => serde_json::to_string_pretty(data),
    };
    match result {
        Ok(s) => Ok(s.into_bytes()),
        Err(e) => Err(std_io::Error::new(std_io::ErrorKind::InvalidData, e)),
    }
}

pub fn deserialize<T: DeserializeOwned>(bytes: &[u8], format: Format) -> std_io::Result<T> {
    match format {
        Format::Json | Format::JsonPretty => serde_json::from_slice(bytes)
            .map_err(|e| std_io::Error::new(std_io::ErrorKind::InvalidData, e)),
    }
}

pub fn write_to<P: AsRef<Path>, T: Serialize>(
    path: P,
    data: &T,
    format: Format,
) -> std_io::Result<()> {
    let bytes = serialize(data, format)?;
    let mut file = File::create(path)?;
    file.write_all(&bytes)?;
    file.flush()
}

pub fn read_from<P: AsRef<Path>, T: DeserializeOwned>(path: P, format: Format) -> std_io::Result<T> {
    let mut bytes = Vec::new();
    File::open(path)?.read_to_end(&mut bytes)?;
    deserialize(&bytes, format)
}
