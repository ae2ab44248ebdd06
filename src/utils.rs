use anyhow::Context;
use std::path::Path;

use crate::error::Result;

/// Create the parent directory of `path` if it does not exist yet.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// `$1.23/hr`
pub fn format_hourly(cost: f64) -> String {
    format!("${:.2}/hr", cost)
}

/// `"s"` for any count other than one
pub fn plural_suffix(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Read an event payload from a file, or stdin when `path` is `-`.
pub fn read_payload(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf)
            .context("Failed to read event from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_hourly() {
        assert_eq!(format_hourly(0.0), "$0.00/hr");
        assert_eq!(format_hourly(0.041666), "$0.04/hr");
        assert_eq!(format_hourly(12.345), "$12.35/hr");
    }

    #[test]
    fn test_plural_suffix() {
        assert_eq!(plural_suffix(0), "s");
        assert_eq!(plural_suffix(1), "");
        assert_eq!(plural_suffix(2), "s");
    }

    #[test]
    fn test_ensure_parent_dir() {
        use tempfile::TempDir;
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a").join("b").join("index.json");

        assert!(ensure_parent_dir(&file).is_ok());
        assert!(file.parent().unwrap().is_dir());
        assert!(ensure_parent_dir(Path::new("bare.json")).is_ok());
    }

    #[test]
    fn test_read_payload_file() {
        use tempfile::TempDir;
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("event.json");
        std::fs::write(&file, r#"{"action": "metrics"}"#).unwrap();
        assert!(read_payload(&file).unwrap().contains("metrics"));
        assert!(read_payload(&temp_dir.path().join("missing.json")).is_err());
    }
}
