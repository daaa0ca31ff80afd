use std::path::Path;

/// A file attached to a multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    /// Build an image upload; the MIME type is derived from the file extension.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = image_mime_type(&file_name);
        Self {
            file_name,
            mime,
            bytes,
        }
    }

    /// Read an image from disk.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

/// `image/<ext>` for a file name with an extension, plain `image` otherwise.
pub fn image_mime_type(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && ext.chars().all(|c| c.is_alphanumeric() || c == '_') => {
            format!("image/{}", ext)
        }
        _ => "image".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_mime_type() {
        assert_eq!(image_mime_type("photo.jpg"), "image/jpg");
        assert_eq!(image_mime_type("IMG_001.png"), "image/png");
        assert_eq!(image_mime_type("archive.tar.gz"), "image/gz");
        assert_eq!(image_mime_type("photo"), "image");
        assert_eq!(image_mime_type("photo."), "image");
        assert_eq!(image_mime_type("photo.j-pg"), "image");
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bottle.jpeg");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let upload = FileUpload::from_path(&path).unwrap();
        assert_eq!(upload.file_name, "bottle.jpeg");
        assert_eq!(upload.mime, "image/jpeg");
        assert_eq!(upload.bytes, vec![1, 2, 3]);
    }
}
