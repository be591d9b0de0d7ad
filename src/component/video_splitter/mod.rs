//! 影片場景切割元件
//!
//! 四階段流程：
//! A. 取得影片資訊（ffprobe）
//! B. 決定切割邊界（場景偵測、等分或指定區間）
//! C. 規劃切割區間
//! D. 逐一擷取片段（ffmpeg 重編碼）

mod clip_extractor;
mod clip_planner;
mod main;
mod scene_detector;

pub use clip_extractor::{
    ClipResult, ClipTask, create_clip_tasks, extract_clip, extract_clips,
};
pub use clip_planner::{ClipInterval, TIME_EPSILON, plan_clip_intervals};
pub use main::{BatchOutcome, SplitMode, SplitRequest, VideoSplitter};
pub use scene_detector::{DetectionParams, detect_scene_boundaries};
