//! Widgets used by the home view.

pub mod drag_drop;
pub mod file_picker;
pub mod image_panel;

pub use drag_drop::DragDropHandler;
pub use file_picker::ImagePicker;
pub use image_panel::{ImagePanel, PanelAction};
