//! 屏幕扫描器 - 从游戏录屏中识别界面并读取文字字段
//!
//! 核心流程：
//! 1. 指纹匹配 - 稀疏锚点颜色比对，按优先级取第一个命中的界面
//! 2. 边沿锁存 - 同一界面连续出现只触发一次进入事件
//! 3. 区域提取 - 裁剪字段区域并做对比度 / 反色 / 灰度预处理
//! 4. 文字识别 - 交给外部 OCR，结果写入事件时间线

pub mod catalog;
pub mod classifier;
pub mod fingerprint;
pub mod latch;
pub mod pipeline;
pub mod recognizer;
pub mod region;
pub mod timeline;

pub use catalog::{ScreenCatalog, ScreenDefinition};
pub use classifier::{ClassificationResult, FrameClassifier};
pub use fingerprint::{Anchor, ScreenFingerprint};
pub use latch::{LatchState, ScreenLatch};
pub use pipeline::{ScanStats, ScannerConfig, ScreenEntry, ScreenScanner};
pub use recognizer::{
    normalize_text, MockTextRecognizer, RecognitionDispatcher, RecognizedField, TextRecognizer,
};
pub use region::{Region, RegionExtractor};
pub use timeline::{Event, EventTimeline};
