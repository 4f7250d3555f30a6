pub mod artifacts;
pub mod error;
pub mod frame;
pub mod pixel_buffer;
pub mod source;
pub mod transform;

pub use artifacts::{ArtifactSink, NullArtifactSink, PngArtifactWriter};
pub use error::ScanError;
pub use frame::{Frame, FrameInfo, FRAME_CHANNELS};
pub use pixel_buffer::{OwnedPixels, PixelBuffer, PixelView, Rect};
pub use source::{FrameSource, ImageSequenceSource, VecFrameSource};
pub use transform::TransformStep;
