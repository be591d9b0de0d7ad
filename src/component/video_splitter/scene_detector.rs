use super::clip_planner::TIME_EPSILON;
use crate::config::SplitterSettings;
use crate::tools::{CommandRunner, VideoInfo};
use anyhow::{Result, bail};
use log::{debug, warn};
use regex::Regex;
use std::path::Path;

/// 邊界偵測參數
#[derive(Debug, Clone, Copy)]
pub struct DetectionParams {
    /// 兩個場景之間的最短間隔（秒）
    pub min_scene_duration: f64,
    /// select 濾鏡的 scene 分數門檻
    pub scene_score_threshold: f64,
    /// 取樣偵測的間隔（秒）
    pub sample_interval_seconds: f64,
}

impl DetectionParams {
    #[must_use]
    pub fn from_settings(settings: &SplitterSettings, min_scene_duration: f64) -> Self {
        Self {
            min_scene_duration,
            scene_score_threshold: settings.scene_score_threshold,
            sample_interval_seconds: settings.sample_interval_seconds,
        }
    }
}

type BoundaryStrategy = fn(&dyn CommandRunner, &Path, &VideoInfo, &DetectionParams) -> Vec<f64>;

/// 依序嘗試的偵測策略；前面的策略產出不足兩個邊界點時換下一個
const STRATEGIES: [(&str, BoundaryStrategy); 3] = [
    ("場景濾鏡", detect_by_scene_filter),
    ("固定間隔取樣", detect_by_fixed_sampling),
    ("長度分段", detect_by_duration_bands),
];

/// 偵測場景邊界時間點
///
/// 回傳值嚴格遞增，保證包含 0 與影片結尾，至少兩個元素。
/// 只有影片長度無效時才會失敗；最後的長度分段策略對任何
/// 正長度的影片都會成功。
pub fn detect_scene_boundaries(
    runner: &dyn CommandRunner,
    path: &Path,
    info: &VideoInfo,
    params: &DetectionParams,
) -> Result<Vec<f64>> {
    let duration = info.duration_seconds;
    if duration <= 0.0 {
        bail!("影片長度無效，無法偵測場景: {}", path.display());
    }

    for (name, strategy) in STRATEGIES {
        let boundaries = strategy(runner, path, info, params);
        if boundaries.len() >= 2 {
            debug!("策略「{name}」產出 {} 個邊界點", boundaries.len());
            return Ok(normalize_boundaries(boundaries, duration));
        }
        debug!("策略「{name}」邊界點不足，換下一個策略");
    }

    bail!("所有偵測策略都失敗: {}", path.display())
}

/// 整理邊界點：排序、去重，補上缺少的 0 與影片結尾
fn normalize_boundaries(mut boundaries: Vec<f64>, duration: f64) -> Vec<f64> {
    boundaries.sort_by(|a, b| a.partial_cmp(b).unwrap());
    boundaries.dedup_by(|a, b| (*a - *b).abs() < TIME_EPSILON);

    if boundaries.first().is_some_and(|&first| first > TIME_EPSILON) {
        boundaries.insert(0, 0.0);
    }
    if boundaries
        .last()
        .is_some_and(|&last| last < duration - TIME_EPSILON)
    {
        boundaries.push(duration);
    }

    boundaries
}

/// 場景濾鏡策略：用 ffmpeg 的 select 濾鏡找出內容變化點
///
/// 任何執行或解析失敗都回傳空列表，讓下一個策略接手
fn detect_by_scene_filter(
    runner: &dyn CommandRunner,
    path: &Path,
    info: &VideoInfo,
    params: &DetectionParams,
) -> Vec<f64> {
    let filter = format!(
        "select=gt(scene\\,{}),showinfo",
        params.scene_score_threshold
    );
    let args = vec![
        "-hide_banner".to_string(),
        "-i".to_string(),
        path.to_string_lossy().to_string(),
        "-an".to_string(),
        "-sn".to_string(),
        "-dn".to_string(),
        "-vf".to_string(),
        filter,
        "-f".to_string(),
        "null".to_string(),
        "-".to_string(),
    ];

    let output = match runner.run("ffmpeg", &args) {
        Ok(output) if output.success => output,
        Ok(output) => {
            warn!(
                "ffmpeg 場景偵測失敗: {}",
                output.stderr.lines().last().unwrap_or_default().trim()
            );
            return Vec::new();
        }
        Err(e) => {
            warn!("無法執行 ffmpeg 場景偵測: {e}");
            return Vec::new();
        }
    };

    // showinfo 的輸出在 stderr
    let candidates = match parse_showinfo_timestamps(&output.stderr, info.duration_seconds) {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!("解析場景偵測輸出失敗: {e}");
            return Vec::new();
        }
    };

    coalesce_boundaries(&candidates, info.duration_seconds, params.min_scene_duration)
}

/// 解析 showinfo 濾鏡輸出的 pts_time 時間戳
///
/// 格式範例: [Parsed_showinfo_1 @ 0x...] n:   0 pts:  12800 pts_time:0.533 ...
fn parse_showinfo_timestamps(output: &str, duration: f64) -> Result<Vec<f64>> {
    let time_regex = Regex::new(r"pts_time:([0-9.]+)")?;

    let mut timestamps: Vec<f64> = output
        .lines()
        .filter_map(|line| {
            time_regex
                .captures(line)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse::<f64>().ok())
        })
        .filter(|&t| t > 0.0 && t < duration)
        .collect();

    timestamps.sort_by(|a, b| a.partial_cmp(b).unwrap());
    timestamps.dedup_by(|a, b| (*a - *b).abs() < TIME_EPSILON);

    Ok(timestamps)
}

/// 由左至右合併過近的候選點
///
/// 從 0 開始，與前一個接受點相距不足 min_scene_duration 的候選捨棄；
/// 最後一個接受點離結尾超過容差時補上結尾
fn coalesce_boundaries(candidates: &[f64], duration: f64, min_scene_duration: f64) -> Vec<f64> {
    let mut accepted = vec![0.0];

    for &t in candidates {
        if t - accepted[accepted.len() - 1] >= min_scene_duration {
            accepted.push(t);
        }
    }

    if duration - accepted[accepted.len() - 1] > TIME_EPSILON {
        accepted.push(duration);
    }

    accepted
}

/// 固定間隔取樣策略：不看內容，每隔固定秒數放一個候選點
fn detect_by_fixed_sampling(
    _runner: &dyn CommandRunner,
    _path: &Path,
    info: &VideoInfo,
    params: &DetectionParams,
) -> Vec<f64> {
    let duration = info.duration_seconds;
    let interval = params.sample_interval_seconds;
    if interval <= 0.0 {
        return Vec::new();
    }

    let mut boundaries = Vec::new();
    let mut step = 1usize;
    loop {
        let t = step as f64 * interval;
        if t >= duration - TIME_EPSILON {
            break;
        }
        if t >= params.min_scene_duration {
            boundaries.push(t);
        }
        step += 1;
    }

    boundaries.push(duration);
    boundaries
}

/// 長度分段策略：依影片長度決定段數後等距切割
///
/// 30 秒內 2 段、60 秒內 3 段、其餘 4 段；等分後每段若短於
/// 最短場景間隔，改以間隔回推段數（至少 2 段）。對任何正長度
/// 的影片都會產出完整邊界
fn detect_by_duration_bands(
    _runner: &dyn CommandRunner,
    _path: &Path,
    info: &VideoInfo,
    params: &DetectionParams,
) -> Vec<f64> {
    let duration = info.duration_seconds;
    if duration <= 0.0 {
        return Vec::new();
    }

    let mut clip_count: usize = if duration <= 30.0 {
        2
    } else if duration <= 60.0 {
        3
    } else {
        4
    };

    if params.min_scene_duration > 0.0 && duration / (clip_count as f64) < params.min_scene_duration
    {
        clip_count = ((duration / params.min_scene_duration).floor() as usize).max(2);
    }

    let step = duration / clip_count as f64;
    let mut boundaries = Vec::with_capacity(clip_count + 1);
    boundaries.push(0.0);
    for i in 1..clip_count {
        boundaries.push(i as f64 * step);
    }
    boundaries.push(duration);

    boundaries
}
