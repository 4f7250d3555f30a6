pub mod scan;

pub use scan::{scan_frames, scan_image_sequence, ScanReport, ScanRequest};
