//! JSON configuration loading and saving

use serde::{Serialize, de::DeserializeOwned};
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::{Error, NormalizedPath, Result, io};

/// Indentation used when rewriting configuration files.
const JSON_INDENT: &[u8] = b"    ";

/// Configuration store for the sync job's settings file.
///
/// The format is detected from the file extension; only `.json` is
/// supported. Saves go through [`io::write_atomic`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigStore;

impl ConfigStore {
    /// Create a new ConfigStore.
    pub fn new() -> Self {
        Self
    }

    /// Load configuration from a file.
    pub fn load<T: DeserializeOwned>(&self, path: &NormalizedPath) -> Result<T> {
        Self::check_format(path)?;
        let content = io::read_text(path)?;

        serde_json::from_str(&content).map_err(|e| Error::ConfigParse {
            path: path.to_native(),
            format: "JSON".into(),
            message: e.to_string(),
        })
    }

    /// Save configuration to a file.
    ///
    /// Output is pretty-printed with four-space indentation and a trailing
    /// newline.
    pub fn save<T: Serialize>(&self, path: &NormalizedPath, value: &T) -> Result<()> {
        Self::check_format(path)?;

        let mut buf = Vec::new();
        let mut serializer =
            Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(JSON_INDENT));
        value
            .serialize(&mut serializer)
            .map_err(|e| Error::ConfigSerialize {
                path: path.to_native(),
                format: "JSON".into(),
                message: e.to_string(),
            })?;
        buf.push(b'\n');

        io::write_atomic(path, &buf)
    }

    fn check_format(path: &NormalizedPath) -> Result<()> {
        let extension = path.extension().unwrap_or("");
        if extension.eq_ignore_ascii_case("json") {
            Ok(())
        } else {
            Err(Error::UnsupportedFormat {
                extension: extension.to_string(),
            })
        }
    }
}
