//! Texture Input/Output
//!
//! PNG decoding into [`TextureData`], texture discovery in directories, and
//! PNG encoding of rendered icons.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::render::TextureData;

#[derive(Debug, Error)]
pub enum TextureIoError {
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("failed to write {path}: {source}")]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("failed to list {path}: {source}")]
    Scan {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("icon buffer holds {actual} bytes, {width}x{height} RGBA needs {expected}")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Decode an image file into RGBA8 texture data.
pub fn load_texture(path: impl AsRef<Path>) -> Result<TextureData, TextureIoError> {
    let path = path.as_ref();
    let img = image::open(path)
        .map_err(|source| TextureIoError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    let (width, height) = img.dimensions();
    log::debug!("[TextureIo] Loaded {} ({}x{})", path.display(), width, height);
    Ok(TextureData::new(width, height, img.into_raw()))
}

/// PNG files directly inside `dir`, sorted by file name.
pub fn find_textures(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, TextureIoError> {
    let dir = dir.as_ref();
    let scan_error = |source| TextureIoError::Scan {
        path: dir.to_path_buf(),
        source,
    };

    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(scan_error)? {
        let path = entry.map_err(scan_error)?.path();
        if path.is_file() && is_png(&path) {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
}

/// `<stem>_icon.png`, next to the input or inside `output_dir`.
pub fn icon_output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "texture".to_string());
    let file_name = format!("{stem}_icon.png");
    match (output_dir, input.parent()) {
        (Some(dir), _) => dir.join(file_name),
        (None, Some(parent)) => parent.join(file_name),
        (None, None) => PathBuf::from(file_name),
    }
}

/// Encode tightly packed RGBA pixels as a PNG file.
pub fn save_icon(
    path: impl AsRef<Path>,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> Result<(), TextureIoError> {
    let path = path.as_ref();
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(TextureIoError::BufferSize {
            width,
            height,
            expected,
            actual: rgba.len(),
        });
    }
    image::save_buffer(path, rgba, width, height, image::ExtendedColorType::Rgba8).map_err(
        |source| TextureIoError::Encode {
            path: path.to_path_buf(),
            source,
        },
    )?;
    log::info!("[TextureIo] Wrote {} ({}x{})", path.display(), width, height);
    Ok(())
}

/// Two-color checkerboard with `cells` x `cells` squares.
pub fn checker_texture(size: u32, cells: u32, a: [u8; 4], b: [u8; 4]) -> TextureData {
    let cell = (size / cells.max(1)).max(1);
    let mut rgba = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let color = if (x / cell + y / cell) % 2 == 0 { a } else { b };
            rgba.extend_from_slice(&color);
        }
    }
    TextureData::new(size, size, rgba)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mcmod_icon_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_icon_output_path() {
        assert_eq!(
            icon_output_path(Path::new("textures/stone.png"), None),
            PathBuf::from("textures/stone_icon.png")
        );
        assert_eq!(
            icon_output_path(Path::new("textures/stone.png"), Some(Path::new("out"))),
            PathBuf::from("out/stone_icon.png")
        );
    }

    #[test]
    fn test_checker_texture() {
        let tex = checker_texture(4, 2, [255, 255, 255, 255], [0, 0, 0, 255]);
        assert!(tex.validate(0).is_ok());
        // (0,0) and (2,2) are `a`, (2,0) is `b`
        assert_eq!(&tex.rgba[0..4], &[255, 255, 255, 255]);
        assert_eq!(&tex.rgba[8..12], &[0, 0, 0, 255]);
        let idx = (2 * 4 + 2) * 4;
        assert_eq!(&tex.rgba[idx..idx + 4], &[255, 255, 255, 255]);
    }

    #[test]
    fn test_find_textures_filters_and_sorts() {
        let dir = scratch_dir("scan");
        for name in ["b.png", "a.PNG", "notes.txt"] {
            std::fs::write(dir.join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.join("nested.png")).unwrap();

        let found = find_textures(&dir).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PNG", "b.png"]);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_saved_icon_loads_back_as_texture() {
        let dir = scratch_dir("png");
        let path = dir.join("icon.png");
        let pixels = [255, 0, 0, 255, 0, 255, 0, 128];

        save_icon(&path, 2, 1, &pixels).unwrap();
        let loaded = load_texture(&path).unwrap();
        assert_eq!((loaded.width, loaded.height), (2, 1));
        assert_eq!(loaded.rgba, pixels);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_save_rejects_wrong_length() {
        assert!(matches!(
            save_icon("unused.png", 2, 2, &[0; 4]),
            Err(TextureIoError::BufferSize { expected: 16, .. })
        ));
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(matches!(
            load_texture("definitely/missing.png"),
            Err(TextureIoError::Decode { .. })
        ));
    }
}
