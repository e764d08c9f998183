//! Extension-based text/binary classification
//!
//! A file is treated as text unless its lower-cased extension is in a fixed
//! deny-set of binary and non-text formats. Files without an extension are
//! in the deny-set too.

use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::path::Path;

/// Extensions (with leading dot) that are never merged unless overridden
static NON_TEXT_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // Images
        ".png", ".jpg", ".jpeg", ".gif", ".bmp", ".tiff", ".svg", ".psd", ".ai", ".webp", ".heic",
        // Audio
        ".mp3", ".wav", ".flac", ".aac", ".ogg", ".m4a", ".wma",
        // Video
        ".mp4", ".avi", ".mkv", ".mov", ".flv", ".wmv", ".m4v", ".mpg", ".mpeg", ".h264",
        // Archives
        ".zip", ".rar", ".7z", ".gz", ".tar", ".bz2", ".xz", ".tgz", ".zipx", ".iso",
        // Executables and packages
        ".exe", ".bin", ".dll", ".so", ".rpm", ".deb", ".dmg", ".bat", ".jar",
        // Office documents
        ".pdf", ".doc", ".docx", ".ppt", ".pptx", ".xls", ".xlsx", ".odt", ".ods", ".odp",
        ".epub", ".mobi",
        // 3D models
        ".obj", ".stl", ".dae", ".blend",
        // Databases
        ".sqlite", ".db", ".sql", ".mdb", ".accdb",
        // Compiled objects
        ".pyc", ".class", ".o", ".a", ".dylib", ".lib",
        // Print and design
        ".ps", ".eps", ".xps", ".swf", ".fla", ".indd",
        // Credentials
        ".pem", ".key", ".cert", ".crt",
        // Virtual machines
        ".vmdk", ".ovf", ".vdi",
        // Game data
        ".pak", ".bsp", ".wad",
        // Fonts
        ".ttf", ".otf", ".woff", ".woff2",
        // Email
        ".pst", ".eml", ".msg",
        // Disk images
        ".img", ".vhdx",
        // No extension
        "",
        // Generic data
        ".dat",
        // Design tools
        ".xd", ".sketch",
        // CAD
        ".dwg", ".dxf",
    ]
    .into_iter()
    .collect()
});

/// Lower-cased extension of the final path segment, including the leading dot.
///
/// Returns an empty string when the segment has no dot, and `"."` for a
/// trailing dot.
pub fn extension_of(path: &Path) -> String {
    let name = match path.file_name() {
        Some(name) => name.to_string_lossy(),
        None => return String::new(),
    };
    match name.rfind('.') {
        Some(idx) => name[idx..].to_lowercase(),
        None => String::new(),
    }
}

/// Decides whether files should be merged based on their extension
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionClassifier {
    process_all: bool,
}

impl ExtensionClassifier {
    /// `process_all` turns the classifier into an always-true filter
    pub fn new(process_all: bool) -> Self {
        Self { process_all }
    }

    /// True when the path should be treated as text
    pub fn is_text_path(&self, path: &Path) -> bool {
        if self.process_all {
            return true;
        }
        !NON_TEXT_EXTENSIONS.contains(extension_of(path).as_str())
    }
}
