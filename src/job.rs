use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageReader};

use crate::error::InputError;

/// One enhancement request: a decoded image plus the name its outputs derive from
#[derive(Clone)]
pub struct Job {
    pub source: PathBuf,
    pub image: DynamicImage,
    pub base_name: String,
}

impl Job {
    /// Load and decode the image at `path`. Any raster format the `image`
    /// crate can sniff is accepted regardless of extension.
    pub fn load(path: Option<&Path>) -> Result<Self, InputError> {
        let path = path.ok_or(InputError::NoImageSelected)?;

        let image = ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|source| InputError::Open {
                path: path.to_path_buf(),
                source,
            })?
            .decode()
            .map_err(|source| InputError::Decode {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self::from_image(path, image))
    }

    pub fn from_image(path: impl Into<PathBuf>, image: DynamicImage) -> Self {
        let source = path.into();
        let base_name = derive_base_name(&source);
        Self {
            source,
            image,
            base_name,
        }
    }
}

/// File name up to its first dot: `photos/a.b.jpg` → `a`
pub fn derive_base_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.split('.').next())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("image")
        .to_string()
}
