use std::fs;
use std::io::Read;
use std::path::Path;

use crate::error::ContentError;

/// Known binary file extensions.
const BINARY_EXTENSIONS: &[&str] = &[
    "pt", "pth", "h5", "hdf5", "pkl", "pickle", "onnx", "zip", "tar", "gz", "bz2", "xz", "so",
    "dylib", "exe", "bin", "img", "iso", "png", "jpg", "jpeg", "gif", "pdf",
];

/// Read a file's raw bytes.
pub fn read_content(path: &Path) -> Result<Vec<u8>, ContentError> {
    fs::read(path).map_err(|e| ContentError::load(path, e))
}

/// Read a file as text, replacing invalid UTF-8 sequences.
pub fn read_text(path: &Path) -> Result<String, ContentError> {
    let bytes = read_content(path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).to_string(),
    })
}

/// Write `contents` back to `path`, replacing the file.
pub fn write_content(path: &Path, contents: &[u8]) -> Result<(), ContentError> {
    fs::write(path, contents).map_err(|e| ContentError::persist(path, e))
}

/// Check if a file is binary by extension or null-byte scan of the first 8 KB.
pub fn is_binary_file(path: &Path) -> bool {
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        if BINARY_EXTENSIONS
            .iter()
            .any(|&b| b.eq_ignore_ascii_case(ext))
        {
            return true;
        }
    }

    let mut file = match fs::File::open(path) {
        Ok(f) => f,
        Err(_) => return false,
    };
    let mut buf = [0u8; 8192];
    let n = match file.read(&mut buf) {
        Ok(n) => n,
        Err(_) => return false,
    };
    buf[..n].contains(&0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn read_missing_file_is_load_error() {
        let err = read_content(Path::new("/nonexistent/file.txt")).unwrap_err();
        assert!(matches!(err, ContentError::Load { .. }));
    }

    #[test]
    fn read_text_replaces_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latin1.txt");
        fs::write(&path, [b'c', b'a', b'f', 0xE9]).unwrap();
        let text = read_text(&path).unwrap();
        assert!(text.starts_with("caf"));
        assert!(text.contains('\u{FFFD}'));
    }

    #[test]
    fn write_then_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        write_content(&path, b"hello\n").unwrap();
        assert_eq!(read_text(&path).unwrap(), "hello\n");
    }

    #[test]
    fn write_into_missing_directory_is_persist_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope").join("out.txt");
        let err = write_content(&path, b"x").unwrap_err();
        assert!(matches!(err, ContentError::Persist { .. }));
    }

    #[test]
    fn binary_detection_by_known_extension() {
        assert!(is_binary_file(Path::new("model.pt")));
        assert!(is_binary_file(Path::new("archive.zip")));
        assert!(is_binary_file(Path::new("disk.ISO")));
    }

    #[test]
    fn binary_detection_null_byte_scan() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("unknown.dat");
        let mut f = File::create(&path).unwrap();
        f.write_all(&[0x00, 0x01, 0x02, 0xFF]).unwrap();
        assert!(is_binary_file(&path));
    }

    #[test]
    fn text_file_not_binary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hello.txt");
        fs::write(&path, "plain text\n").unwrap();
        assert!(!is_binary_file(&path));
        assert!(!is_binary_file(Path::new("/nonexistent/file.dat")));
    }
}
