pub mod controls;
pub mod export_modal;
pub mod grid;
pub mod image_modal;
pub mod text_input;
