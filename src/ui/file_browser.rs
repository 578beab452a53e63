use crate::convert::{
    supported_extensions, DOCUMENT_EXTENSIONS, IMAGE_EXTENSIONS, VIDEO_EXTENSIONS,
};
use std::path::{Path, PathBuf};

/// Show the native open dialog filtered to convertible files.
pub fn pick_input_file() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Select File to Convert")
        .add_filter("All Supported Files", supported_extensions().as_slice())
        .add_filter("Image Files", IMAGE_EXTENSIONS)
        .add_filter("Video Files", VIDEO_EXTENSIONS)
        .add_filter("Document Files", DOCUMENT_EXTENSIONS)
        .add_filter("All Files", &["*"])
        .pick_file()
}

pub fn pick_output_dir(current: &Path) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Select Output Folder")
        .set_directory(current)
        .pick_folder()
}
