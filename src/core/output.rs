//! Output file naming

use std::path::Path;

pub const IMAGE_EXTENSION: &str = "png";

/// Base name of `input` with its last extension replaced by `ext`
///
/// `run/data.007.csv` → `data.007.png`, `snapshot` → `snapshot.png`.
/// Only the base name is kept, so `.hidden` becomes `.png`.
pub fn output_name(input: &Path, ext: &str) -> String {
    let base = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let stem = match base.rfind('.') {
        Some(idx) => &base[..idx],
        _ => base.as_str(),
    };
    format!("{}.{}", stem, ext)
}

pub fn image_name(input: &Path) -> String {
    output_name(input, IMAGE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_name() {
        assert_eq!(image_name(Path::new("run/data.007.csv")), "data.007.png");
        assert_eq!(image_name(Path::new("snapshot")), "snapshot.png");
        assert_eq!(image_name(Path::new("/abs/dir/t0.csv")), "t0.png");
    }

    #[test]
    fn test_output_name_edge_cases() {
        assert_eq!(output_name(Path::new("a/.hidden"), "json"), ".json");
        assert_eq!(output_name(Path::new("a/.hidden.csv"), "png"), ".hidden.png");
        assert_eq!(output_name(Path::new("trailing."), "png"), "trailing.png");
        assert_eq!(output_name(Path::new("dir.v2/snap"), "png"), "snap.png");
    }
}
