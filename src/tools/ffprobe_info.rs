use crate::tools::CommandRunner;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;

/// 影片基本資訊
#[derive(Debug, Clone)]
pub struct VideoInfo {
    pub duration_seconds: f64,
    pub width: u32,
    pub height: u32,
    pub frame_rate: f64,
    /// 沒有音訊串流時為 None，與取樣率 0 不同
    pub audio_sample_rate: Option<u32>,
    pub file_size_bytes: u64,
}

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
    streams: Option<Vec<StreamInfo>>,
}

#[derive(Deserialize)]
struct FormatInfo {
    duration: Option<String>,
    size: Option<String>,
}

#[derive(Deserialize)]
struct StreamInfo {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    sample_rate: Option<String>,
    duration: Option<String>,
}

/// 使用 ffprobe 取得影片資訊
pub fn get_video_info(runner: &dyn CommandRunner, path: &Path) -> Result<VideoInfo> {
    let args = vec![
        "-v".to_string(),
        "quiet".to_string(),
        "-print_format".to_string(),
        "json".to_string(),
        "-show_format".to_string(),
        "-show_streams".to_string(),
        path.to_string_lossy().to_string(),
    ];

    let output = runner
        .run("ffprobe", &args)
        .with_context(|| format!("無法執行 ffprobe: {}", path.display()))?;

    if !output.success {
        bail!("ffprobe 執行失敗: {}", output.stderr.trim());
    }

    parse_probe_output(&output.stdout, path)
}

/// 解析 ffprobe 的 JSON 輸出
fn parse_probe_output(stdout: &str, path: &Path) -> Result<VideoInfo> {
    let probe: FfprobeOutput = serde_json::from_str(stdout)
        .with_context(|| format!("無法解析 ffprobe 輸出: {}", path.display()))?;

    let streams = probe.streams.unwrap_or_default();
    let video_stream = streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"));
    let audio_stream = streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"));

    // 寬高缺少時視為未知（0），純音訊檔案也能探測成功
    let width = video_stream.and_then(|s| s.width).unwrap_or(0);
    let height = video_stream.and_then(|s| s.height).unwrap_or(0);

    // 影片長度優先從 format 取得，其次從視訊串流；
    // 欄位不存在時視為 0，存在但無法解析視為錯誤
    let duration_seconds = match probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .or_else(|| video_stream.and_then(|s| s.duration.as_ref()))
    {
        Some(raw) => raw
            .parse::<f64>()
            .with_context(|| format!("無法解析影片長度: {raw}"))?,
        None => 0.0,
    };

    // 幀率欄位存在但分母為 0 或格式錯誤視為錯誤，欄位不存在視為未知
    let frame_rate = match video_stream.and_then(|s| s.r_frame_rate.as_ref()) {
        Some(raw) => {
            parse_frame_rate(raw).ok_or_else(|| anyhow::anyhow!("無法解析幀率: {raw}"))?
        }
        None => 0.0,
    };

    // 取樣率欄位存在但無法解析視為錯誤，回報 0 視為沒有可用音訊
    let audio_sample_rate = match audio_stream.and_then(|s| s.sample_rate.as_ref()) {
        Some(raw) => {
            let rate = raw
                .parse::<u32>()
                .with_context(|| format!("無法解析音訊取樣率: {raw}"))?;
            if rate > 0 { Some(rate) } else { None }
        }
        None => None,
    };

    let file_size_bytes = probe
        .format
        .as_ref()
        .and_then(|f| f.size.as_ref())
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0);

    Ok(VideoInfo {
        duration_seconds,
        width,
        height,
        frame_rate,
        audio_sample_rate,
        file_size_bytes,
    })
}

/// 解析幀率字串（例如 "30/1" 或 "30000/1001"）
fn parse_frame_rate(rate: &str) -> Option<f64> {
    if let Some((num_str, den_str)) = rate.split_once('/') {
        let num: f64 = num_str.parse().ok()?;
        let den: f64 = den_str.parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
        return None;
    }
    rate.parse().ok()
}
