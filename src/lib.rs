// Bena Watermark Library
// Watermark engine plus the upload hook and ambient setup around it

pub mod config;
pub mod logging;
pub mod upload; // Filename prefix + watermark on upload
pub mod watermark;
