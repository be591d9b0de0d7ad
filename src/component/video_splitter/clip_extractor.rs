use super::clip_planner::ClipInterval;
use crate::tools::CommandRunner;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, warn};
use std::path::{Path, PathBuf};

/// 片段擷取任務
#[derive(Debug, Clone)]
pub struct ClipTask {
    pub input_path: PathBuf,
    pub interval: ClipInterval,
    pub output_path: PathBuf,
}

/// 片段擷取結果
#[derive(Debug)]
pub struct ClipResult {
    pub output_path: PathBuf,
    pub index: usize,
    pub success: bool,
    pub output_size_bytes: u64,
    pub error_message: Option<String>,
}

/// 建立片段擷取任務列表
///
/// 輸出檔名格式為 `<前綴>_<兩位數序號>.mp4`
#[must_use]
pub fn create_clip_tasks(
    input_path: &Path,
    intervals: &[ClipInterval],
    output_dir: &Path,
    prefix: &str,
) -> Vec<ClipTask> {
    intervals
        .iter()
        .map(|interval| ClipTask {
            input_path: input_path.to_path_buf(),
            interval: interval.clone(),
            output_path: output_dir.join(format!("{prefix}_{:02}.mp4", interval.index)),
        })
        .collect()
}

/// 擷取單一片段
#[must_use]
pub fn extract_clip(runner: &dyn CommandRunner, task: &ClipTask) -> ClipResult {
    match extract_clip_inner(runner, task) {
        Ok(size) => ClipResult {
            output_path: task.output_path.clone(),
            index: task.interval.index,
            success: true,
            output_size_bytes: size,
            error_message: None,
        },
        Err(e) => {
            remove_partial_output(&task.output_path);
            ClipResult {
                output_path: task.output_path.clone(),
                index: task.interval.index,
                success: false,
                output_size_bytes: 0,
                error_message: Some(e.to_string()),
            }
        }
    }
}

fn extract_clip_inner(runner: &dyn CommandRunner, task: &ClipTask) -> Result<u64> {
    debug!(
        "擷取片段 {:02}: {:.3}s - {:.3}s -> {}",
        task.interval.index,
        task.interval.start,
        task.interval.end,
        task.output_path.display()
    );

    let args = build_extract_args(task);
    let output = runner
        .run("ffmpeg", &args)
        .with_context(|| format!("無法執行 ffmpeg 擷取片段: {}", task.input_path.display()))?;

    if !output.success {
        anyhow::bail!("ffmpeg 擷取片段失敗: {}", output.stderr.trim());
    }

    // 確認輸出檔案存在；ffmpeg 偶爾回報成功但沒有寫出檔案
    if !task.output_path.exists() {
        anyhow::bail!("片段檔案未建立: {}", task.output_path.display());
    }

    let metadata = std::fs::metadata(&task.output_path)
        .with_context(|| format!("無法讀取片段檔案資訊: {}", task.output_path.display()))?;

    Ok(metadata.len())
}

/// 組出單一片段的 ffmpeg 重編碼參數
///
/// `-ss` 放在 `-i` 前面加速跳轉；`-copyts` 與 `-avoid_negative_ts`
/// 維持時間軸一致；`apad` 加 `-shortest` 補齊結尾過短的音軌
fn build_extract_args(task: &ClipTask) -> Vec<String> {
    vec![
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-ss".to_string(),
        format!("{:.3}", task.interval.start),
        "-i".to_string(),
        task.input_path.to_string_lossy().to_string(),
        "-t".to_string(),
        format!("{:.3}", task.interval.duration()),
        "-map".to_string(),
        "0:v:0".to_string(),
        "-map".to_string(),
        "0:a:0?".to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        "medium".to_string(),
        "-crf".to_string(),
        "18".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        "192k".to_string(),
        "-af".to_string(),
        "apad".to_string(),
        "-shortest".to_string(),
        "-copyts".to_string(),
        "-avoid_negative_ts".to_string(),
        "1".to_string(),
        "-y".to_string(),
        task.output_path.to_string_lossy().to_string(),
    ]
}

/// 失敗時刪除不完整的輸出檔（刪除失敗僅記錄，不中斷流程）
fn remove_partial_output(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("無法刪除不完整的片段檔案 {}: {e}", path.display());
        }
    }
}

/// 依序擷取所有片段
///
/// 擷取一律逐一進行，避免多個 ffmpeg 重編碼互搶資源
pub fn extract_clips(runner: &dyn CommandRunner, tasks: &[ClipTask]) -> Vec<ClipResult> {
    let progress_bar = ProgressBar::new(tasks.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("  [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );
    progress_bar.set_message("擷取片段中...");

    let mut results = Vec::with_capacity(tasks.len());
    for task in tasks {
        let result = extract_clip(runner, task);

        if let Some(msg) = result.error_message.as_ref().filter(|_| !result.success) {
            error!("片段擷取失敗 [{:02}]: {}", result.index, msg);
        }

        results.push(result);
        progress_bar.inc(1);
    }

    progress_bar.finish_and_clear();
    results
}
