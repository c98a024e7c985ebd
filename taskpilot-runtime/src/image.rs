use std::path::{Path, PathBuf};

use taskpilot_core::prompt::ImageAttachment;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("{path} is not an image (detected {mime})")]
    NotAnImage { path: PathBuf, mime: String },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reads an image file for inline upload. Files that don't look like images are refused.
pub fn load_image(path: &Path) -> Result<ImageAttachment, ImageError> {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if mime.type_() != mime_guess::mime::IMAGE {
        return Err(ImageError::NotAnImage {
            path: path.to_path_buf(),
            mime: mime.essence_str().to_string(),
        });
    }

    let bytes = std::fs::read(path).map_err(|source| ImageError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(ImageAttachment {
        mime_type: mime.essence_str().to_string(),
        bytes,
    })
}
