// Device configuration record - the typed key/value table that ends up
// in the dev_config NVS partition, rendered in the vendor CSV dialect.

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::settings::Settings;

/// Namespace read by the device config component.
pub const DEV_STORAGE_NAMESPACE: &str = "config";
/// Namespace read by the OTA client.
pub const OTA_STORAGE_NAMESPACE: &str = "ota_config";

/// Primitive value of a record entry. The variant picks the encoding
/// column the NVS generator sees, and quoting in the rendered CSV.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    U32(u32),
    U8(u8),
    I32(i32),
}

impl Value {
    fn encoding(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::U32(_) => "u32",
            Value::U8(_) => "u8",
            Value::I32(_) => "i32",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // strings are double-quoted in the vendor dialect, numbers bare
        match self {
            Value::Str(s) => write!(f, "\"{s}\""),
            Value::U32(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Debug, Clone)]
enum Row {
    Namespace(&'static str),
    Entry { key: &'static str, value: Value },
}

/// Ordered record of everything the device reads at boot: its identity
/// under `config`, the OTA client settings under `ota_config`.
#[derive(Debug, Clone)]
pub struct ConfigRecord {
    rows: Vec<Row>,
}

impl ConfigRecord {
    /// Builds the record in the fixed order the device firmware expects.
    pub fn new(settings: &Settings, token: &str) -> Self {
        let rows = vec![
            Row::Namespace(DEV_STORAGE_NAMESPACE),
            Row::Entry {
                key: "SN",
                value: Value::U32(settings.serial_number),
            },
            Row::Namespace(OTA_STORAGE_NAMESPACE),
            Row::Entry {
                key: "address",
                value: Value::Str(settings.server_address.clone()),
            },
            Row::Entry {
                key: "tenant",
                value: Value::Str(settings.tenant.clone()),
            },
            Row::Entry {
                key: "tls",
                value: Value::U8(settings.use_tls),
            },
            Row::Entry {
                key: "token",
                value: Value::Str(token.to_string()),
            },
            Row::Entry {
                key: "poll_time",
                value: Value::I32(settings.poll_time),
            },
        ];
        Self { rows }
    }

    /// Renders the record as the generator's CSV input.
    ///
    /// Values are substituted verbatim. The dialect has no escape
    /// syntax, so a quote or comma inside a string value corrupts the
    /// row; callers get whatever the server issued.
    pub fn to_csv(&self) -> String {
        let mut lines = vec![
            "# AAD csv file".to_string(),
            "key,type,encoding,value".to_string(),
        ];
        for row in &self.rows {
            lines.push(match row {
                Row::Namespace(name) => format!("{name},namespace,,"),
                Row::Entry { key, value } => {
                    format!("{key},data,{},{value}", value.encoding())
                }
            });
        }
        lines.join("\n")
    }

    /// Writes the rendered CSV to the path the generator will consume.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_csv())
            .with_context(|| format!("failed to write {}", path.display()))
    }
}
