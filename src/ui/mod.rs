mod file_browser;
mod main_window;

pub use file_browser::*;
pub use main_window::*;
