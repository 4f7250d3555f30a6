pub mod ocr;
pub mod video;
