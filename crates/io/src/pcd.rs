use lidarguard_core::{PointCloud, PointXYZI};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PcdError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid pcd header: {0}")]
    Header(String),

    #[error("unsupported pcd data format: {0}")]
    UnsupportedFormat(String),

    #[error("malformed pcd body: {0}")]
    Body(String),
}

#[derive(Debug, PartialEq)]
enum DataFormat {
    Ascii,
    Binary,
}

/// Reads a PCD file (ASCII or binary).
///
/// `x`, `y`, `z` fields are required; an `intensity` field is carried through
/// when present and zero-filled otherwise, so both XYZ and XYZI recordings
/// load into the same frame type.
pub fn read_pcd(path: impl AsRef<Path>) -> Result<PointCloud<PointXYZI>, PcdError> {
    let raw = fs::read(path)?;

    let header = find_header(&raw)?;
    let format = parse_data_format(&header)?;
    let num_points = parse_points_count(&header)?;
    let fields = parse_fields(&header);

    match format {
        DataFormat::Ascii => read_ascii(&raw, &fields),
        DataFormat::Binary => read_binary(&raw, num_points, &fields),
    }
}

/// Writes an ASCII PCD file with `x y z intensity` fields.
pub fn write_pcd(path: impl AsRef<Path>, cloud: &PointCloud<PointXYZI>) -> Result<(), PcdError> {
    let mut out = pcd_header(cloud.len(), "ascii");
    for p in cloud.iter() {
        out.push_str(&format!("{} {} {} {}\n", p.x, p.y, p.z, p.intensity));
    }
    fs::write(path, out)?;
    Ok(())
}

/// Writes a binary PCD file with `x y z intensity` fields (little-endian
/// f32).
pub fn write_pcd_binary(
    path: impl AsRef<Path>,
    cloud: &PointCloud<PointXYZI>,
) -> Result<(), PcdError> {
    let header = pcd_header(cloud.len(), "binary");
    let mut buf = Vec::with_capacity(header.len() + cloud.len() * 16);
    buf.extend_from_slice(header.as_bytes());

    for p in cloud.iter() {
        buf.extend_from_slice(&p.x.to_le_bytes());
        buf.extend_from_slice(&p.y.to_le_bytes());
        buf.extend_from_slice(&p.z.to_le_bytes());
        buf.extend_from_slice(&p.intensity.to_le_bytes());
    }

    fs::write(path, buf)?;
    Ok(())
}

fn pcd_header(num_points: usize, data: &str) -> String {
    let mut h = String::new();
    h.push_str("# .PCD v0.7 - Point Cloud Data file format\n");
    h.push_str("VERSION 0.7\n");
    h.push_str("FIELDS x y z intensity\n");
    h.push_str("SIZE 4 4 4 4\n");
    h.push_str("TYPE F F F F\n");
    h.push_str("COUNT 1 1 1 1\n");
    h.push_str(&format!("WIDTH {}\n", num_points));
    h.push_str("HEIGHT 1\n");
    h.push_str("VIEWPOINT 0 0 0 1 0 0 0\n");
    h.push_str(&format!("POINTS {}\n", num_points));
    h.push_str(&format!("DATA {}\n", data));
    h
}

/// Extracts the header (everything up to and including the DATA line) as
/// UTF-8, tolerating a binary body after it.
fn find_header(raw: &[u8]) -> Result<String, PcdError> {
    let text = std::str::from_utf8(raw)
        .ok()
        .or_else(|| find_data_line_end(raw).and_then(|end| std::str::from_utf8(&raw[..end]).ok()))
        .ok_or_else(|| PcdError::Header("header is not valid UTF-8".into()))?;

    for line in text.lines() {
        if line.trim_start().starts_with("DATA") {
            let offset = text
                .find(line)
                .map(|pos| pos + line.len())
                .unwrap_or(text.len());
            return Ok(text[..offset].to_string());
        }
    }

    Err(PcdError::Header("missing DATA line".into()))
}

/// Byte offset just past the newline that ends the DATA line.
fn find_data_line_end(raw: &[u8]) -> Option<usize> {
    let marker = b"DATA";
    for i in 0..raw.len().saturating_sub(marker.len()) {
        if (i == 0 || raw[i - 1] == b'\n') && raw[i..].starts_with(marker) {
            if let Some(offset) = raw[i..].iter().position(|&b| b == b'\n') {
                return Some(i + offset + 1);
            }
            return Some(raw.len());
        }
    }
    None
}

fn parse_data_format(header: &str) -> Result<DataFormat, PcdError> {
    for line in header.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("DATA") {
            let parts: Vec<&str> = trimmed.split_whitespace().collect();
            if parts.len() >= 2 {
                return match parts[1] {
                    "ascii" => Ok(DataFormat::Ascii),
                    "binary" => Ok(DataFormat::Binary),
                    other => Err(PcdError::UnsupportedFormat(other.to_string())),
                };
            }
        }
    }
    Err(PcdError::Header("missing DATA line".into()))
}

fn parse_points_count(header: &str) -> Result<usize, PcdError> {
    for key in ["POINTS", "WIDTH"] {
        for line in header.lines() {
            let trimmed = line.trim();
            if trimmed.starts_with(key) {
                let parts: Vec<&str> = trimmed.split_whitespace().collect();
                if parts.len() >= 2 {
                    return parts[1]
                        .parse::<usize>()
                        .map_err(|e| PcdError::Header(format!("invalid {} value: {}", key, e)));
                }
            }
        }
    }
    Err(PcdError::Header("missing POINTS/WIDTH line".into()))
}

fn parse_fields(header: &str) -> Vec<String> {
    for line in header.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("FIELDS") {
            return trimmed
                .split_whitespace()
                .skip(1)
                .map(|s| s.to_string())
                .collect();
        }
    }
    vec!["x".into(), "y".into(), "z".into()]
}

struct FieldLayout {
    x: usize,
    y: usize,
    z: usize,
    intensity: Option<usize>,
    stride: usize,
}

fn resolve_fields(fields: &[String]) -> Result<FieldLayout, PcdError> {
    let find = |name: &str| fields.iter().position(|f| f == name);
    match (find("x"), find("y"), find("z")) {
        (Some(x), Some(y), Some(z)) => Ok(FieldLayout {
            x,
            y,
            z,
            intensity: find("intensity"),
            stride: fields.len(),
        }),
        _ => Err(PcdError::Header("missing x, y, z fields".into())),
    }
}

fn read_ascii(raw: &[u8], fields: &[String]) -> Result<PointCloud<PointXYZI>, PcdError> {
    let layout = resolve_fields(fields)?;
    let content = std::str::from_utf8(raw)
        .map_err(|e| PcdError::Body(format!("invalid UTF-8 in ascii body: {}", e)))?;

    let mut cloud = PointCloud::new();
    let mut in_data = false;
    for line in content.lines() {
        if line.trim_start().starts_with("DATA") {
            in_data = true;
            continue;
        }
        if !in_data || line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < layout.stride.min(3) {
            continue;
        }

        let get = |idx: usize| parts.get(idx).and_then(|v| v.parse::<f32>().ok());
        let (x, y, z) = match (get(layout.x), get(layout.y), get(layout.z)) {
            (Some(x), Some(y), Some(z)) => (x, y, z),
            _ => {
                return Err(PcdError::Body(format!(
                    "unparseable ascii point row: {:?}",
                    line
                )))
            }
        };
        let intensity = layout
            .intensity
            .and_then(get)
            .unwrap_or(0.0);

        cloud.push(PointXYZI::new(x, y, z, intensity));
    }

    Ok(cloud)
}

fn read_binary(
    raw: &[u8],
    num_points: usize,
    fields: &[String],
) -> Result<PointCloud<PointXYZI>, PcdError> {
    let layout = resolve_fields(fields)?;
    let data_offset = find_data_line_end(raw)
        .ok_or_else(|| PcdError::Header("cannot locate binary body".into()))?;

    let point_size = layout.stride * 4;
    let body = &raw[data_offset..];
    let expected = num_points * point_size;
    if body.len() < expected {
        return Err(PcdError::Body(format!(
            "binary body too short: have {} bytes, expected {}",
            body.len(),
            expected
        )));
    }

    let field_at = |record: &[u8], idx: usize| {
        let off = idx * 4;
        f32::from_le_bytes([record[off], record[off + 1], record[off + 2], record[off + 3]])
    };

    let mut cloud = PointCloud::with_capacity(num_points);
    for record in body.chunks_exact(point_size).take(num_points) {
        let intensity = layout.intensity.map(|i| field_at(record, i)).unwrap_or(0.0);
        cloud.push(PointXYZI::new(
            field_at(record, layout.x),
            field_at(record, layout.y),
            field_at(record, layout.z),
            intensity,
        ));
    }

    Ok(cloud)
}
