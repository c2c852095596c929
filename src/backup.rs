use anyhow::{anyhow, Context};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MANIFEST_ENTRY: &str = "manifest.json";
const ROSTER_ENTRY: &str = "data/students.json";
pub const BUNDLE_FORMAT_V1: &str = "lisan-roster-v1";
pub const LEGACY_JSON_FORMAT: &str = "legacy-json";

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub bundle_format: String,
    pub bundle_id: String,
    pub entry_count: usize,
    pub sha256: String,
}

#[derive(Debug, Clone)]
pub struct ImportedRoster {
    pub bundle_format_detected: String,
    pub payload: String,
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Writes `payload` (a serialized roster) into a zip bundle with a manifest.
pub fn export_roster_bundle(payload: &str, out_path: &Path) -> anyhow::Result<ExportSummary> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }

    let out_file = File::create(out_path).with_context(|| {
        format!(
            "failed to create output file {}",
            out_path.to_string_lossy()
        )
    })?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let exported_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let bundle_id = uuid::Uuid::new_v4().to_string();
    let digest = sha256_hex(payload.as_bytes());
    let manifest = json!({
        "format": BUNDLE_FORMAT_V1,
        "version": 1,
        "bundleId": bundle_id,
        "appVersion": env!("CARGO_PKG_VERSION"),
        "exportedAt": exported_at,
        "rosterSha256": digest,
    });
    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;

    zip.start_file(ROSTER_ENTRY, opts)
        .context("failed to start roster entry")?;
    zip.write_all(payload.as_bytes())
        .context("failed to write roster entry")?;

    zip.finish().context("failed to finalize zip bundle")?;

    Ok(ExportSummary {
        bundle_format: BUNDLE_FORMAT_V1.to_string(),
        bundle_id,
        entry_count: 2,
        sha256: digest,
    })
}

/// Reads a roster payload from a bundle, or from a bare JSON file written by
/// the browser app's own backup button.
pub fn read_roster_bundle(in_path: &Path) -> anyhow::Result<ImportedRoster> {
    if !is_zip_file(in_path)? {
        let payload = std::fs::read_to_string(in_path).with_context(|| {
            format!("failed to read backup file {}", in_path.to_string_lossy())
        })?;
        return Ok(ImportedRoster {
            bundle_format_detected: LEGACY_JSON_FORMAT.to_string(),
            payload,
        });
    }

    let in_file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.to_string_lossy()))?;
    let mut archive = ZipArchive::new(in_file).context("invalid zip archive")?;

    let mut manifest_text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .context("bundle missing manifest.json")?
        .read_to_string(&mut manifest_text)
        .context("failed to read manifest.json")?;
    let manifest: serde_json::Value =
        serde_json::from_str(&manifest_text).context("manifest.json is invalid JSON")?;
    let format = manifest
        .get("format")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    if format != BUNDLE_FORMAT_V1 {
        return Err(anyhow!("unsupported bundle format: {}", format));
    }

    let mut payload = String::new();
    archive
        .by_name(ROSTER_ENTRY)
        .context("bundle missing data/students.json")?
        .read_to_string(&mut payload)
        .context("failed to extract roster entry")?;

    if let Some(expected) = manifest.get("rosterSha256").and_then(|v| v.as_str()) {
        let actual = sha256_hex(payload.as_bytes());
        if actual != expected {
            return Err(anyhow!(
                "roster checksum mismatch: manifest {}, payload {}",
                expected,
                actual
            ));
        }
    }

    Ok(ImportedRoster {
        bundle_format_detected: BUNDLE_FORMAT_V1.to_string(),
        payload,
    })
}

fn is_zip_file(path: &Path) -> anyhow::Result<bool> {
    let mut f = File::open(path)
        .with_context(|| format!("failed to open input file {}", path.to_string_lossy()))?;
    let mut sig = [0u8; 4];
    let read = f.read(&mut sig).context("failed to read file signature")?;
    if read < 4 {
        return Ok(false);
    }
    Ok(sig == [0x50, 0x4B, 0x03, 0x04])
}
