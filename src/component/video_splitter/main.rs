use super::clip_extractor::{create_clip_tasks, extract_clips};
use super::clip_planner::{ClipInterval, TIME_EPSILON, plan_clip_intervals};
use super::scene_detector::{DetectionParams, detect_scene_boundaries};
use crate::config::Config;
use crate::tools::{
    CommandRunner, SystemCommandRunner, VideoInfo, ensure_directory_exists, get_video_info,
    validate_file_exists,
};
use anyhow::{Context, Result};
use console::style;
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 切割模式
#[derive(Debug, Clone, PartialEq)]
pub enum SplitMode {
    /// 自動偵測場景邊界
    Auto,
    /// 等分成固定段數
    EqualParts(usize),
    /// 使用者指定的時間區間
    Timestamps(Vec<(f64, f64)>),
}

/// 一整批切割工作的描述
#[derive(Debug, Clone)]
pub struct SplitRequest {
    pub inputs: Vec<PathBuf>,
    pub output_root: PathBuf,
    pub mode: SplitMode,
    pub min_scene_duration: f64,
    pub output_prefix: String,
}

/// 批次切割結果
#[derive(Debug)]
pub struct BatchOutcome {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub clips_created: usize,
}

/// 影片場景切割器
///
/// 四階段流程：
/// A. 取得影片資訊（ffprobe）
/// B. 決定切割邊界（場景偵測、等分或指定區間）
/// C. 規劃切割區間
/// D. 逐一擷取片段（ffmpeg 重編碼）
pub struct VideoSplitter {
    config: Config,
    runner: Arc<dyn CommandRunner>,
    shutdown_signal: Arc<AtomicBool>,
}

impl VideoSplitter {
    pub fn new(config: Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self::with_runner(config, Arc::new(SystemCommandRunner), shutdown_signal)
    }

    pub const fn with_runner(
        config: Config,
        runner: Arc<dyn CommandRunner>,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            config,
            runner,
            shutdown_signal,
        }
    }

    /// 執行批次切割
    ///
    /// 單一影片失敗不影響其他影片；中斷訊號只在影片之間檢查
    pub fn run(&self, request: &SplitRequest) -> Result<BatchOutcome> {
        println!("{}", style("=== 影片場景切割 ===").cyan().bold());

        ensure_directory_exists(&request.output_root)?;

        let mut successful = 0;
        let mut failed = 0;
        let mut clips_created = 0;

        for (index, input) in request.inputs.iter().enumerate() {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                warn!("收到中斷訊號，停止處理");
                break;
            }

            let video_name = input.file_name().map_or_else(
                || format!("video_{index}"),
                |s| s.to_string_lossy().to_string(),
            );

            println!(
                "\n{} [{}/{}] {}",
                style("處理中").cyan(),
                index + 1,
                request.inputs.len(),
                style(&video_name).bold()
            );

            match self.process_one(input, request) {
                Ok(count) if count > 0 => {
                    println!("  {} 已建立 {count} 個片段", style("✓").green());
                    successful += 1;
                    clips_created += count;
                }
                Ok(_) => {
                    println!("  {} 未產生任何片段", style("✗").red());
                    failed += 1;
                }
                Err(e) => {
                    error!("處理影片失敗 {video_name}: {e}");
                    println!("  {} 處理失敗: {}", style("✗").red(), e);
                    failed += 1;
                }
            }
        }

        let outcome = BatchOutcome {
            total: request.inputs.len(),
            successful,
            failed,
            clips_created,
        };

        self.print_summary(&outcome);

        Ok(outcome)
    }

    /// 處理單一影片，回傳成功擷取的片段數
    fn process_one(&self, input: &Path, request: &SplitRequest) -> Result<usize> {
        validate_file_exists(input)?;

        // Stage A: 取得影片資訊
        print!("  {} 讀取影片資訊...", style("A").dim());
        let info = get_video_info(self.runner.as_ref(), input)
            .with_context(|| format!("無法讀取影片資訊: {}", input.display()))?;
        println!(
            " {:.1}s, {}x{}",
            info.duration_seconds, info.width, info.height
        );

        // Stage B + C: 決定切割區間
        let intervals = self.resolve_intervals(input, &info, request)?;
        if intervals.is_empty() {
            println!("  {} 沒有可擷取的片段", style("!").yellow());
            return Ok(0);
        }

        // Stage D: 擷取片段
        let output_dir = clip_output_dir(&request.output_root, input);
        ensure_directory_exists(&output_dir)?;

        println!("  {} 擷取 {} 個片段...", style("D").dim(), intervals.len());
        let tasks = create_clip_tasks(input, &intervals, &output_dir, &request.output_prefix);
        let results = extract_clips(self.runner.as_ref(), &tasks);

        let success_count = results.iter().filter(|r| r.success).count();
        let failed_count = results.len() - success_count;
        println!("    成功 {success_count}, 失敗 {failed_count}");

        info!("片段已輸出至: {}", output_dir.display());

        Ok(success_count)
    }

    /// 依切割模式產出區間列表
    fn resolve_intervals(
        &self,
        input: &Path,
        info: &VideoInfo,
        request: &SplitRequest,
    ) -> Result<Vec<ClipInterval>> {
        let settings = &self.config.settings;

        match &request.mode {
            SplitMode::Auto => {
                print!("  {} 偵測場景邊界...", style("B").dim());
                let params = DetectionParams::from_settings(settings, request.min_scene_duration);
                let boundaries =
                    detect_scene_boundaries(self.runner.as_ref(), input, info, &params)
                        .with_context(|| "場景偵測失敗")?;
                println!(" 找到 {} 個邊界點", boundaries.len());

                print!("  {} 規劃切割區間...", style("C").dim());
                let intervals = plan_clip_intervals(
                    &boundaries,
                    info.duration_seconds,
                    settings.padding_seconds,
                    settings.min_clip_duration,
                );
                println!(" {} 個區間", intervals.len());
                Ok(intervals)
            }
            SplitMode::EqualParts(parts) => {
                print!("  {} 計算等分邊界...", style("B").dim());
                let boundaries = equal_part_boundaries(info.duration_seconds, *parts)?;
                println!(" 切成 {parts} 段");

                print!("  {} 規劃切割區間...", style("C").dim());
                let intervals = plan_clip_intervals(
                    &boundaries,
                    info.duration_seconds,
                    0.0,
                    settings.min_clip_duration,
                );
                println!(" {} 個區間", intervals.len());
                Ok(intervals)
            }
            SplitMode::Timestamps(pairs) => {
                print!("  {} 套用指定時間區間...", style("B").dim());
                let intervals = intervals_from_pairs(pairs, info.duration_seconds);
                println!(" {} 個有效區間", intervals.len());
                Ok(intervals)
            }
        }
    }

    /// 只顯示影片資訊，不做切割
    pub fn show_info(&self, inputs: &[PathBuf]) -> Result<()> {
        println!("{}", style("=== 影片資訊 ===").cyan().bold());

        for input in inputs {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                warn!("收到中斷訊號，停止處理");
                break;
            }

            println!("\n{}", style(input.display().to_string()).bold());

            match get_video_info(self.runner.as_ref(), input) {
                Ok(info) => {
                    println!("  長度: {:.2} 秒", info.duration_seconds);
                    println!("  解析度: {}x{}", info.width, info.height);
                    println!("  幀率: {:.3} fps", info.frame_rate);
                    match info.audio_sample_rate {
                        Some(rate) => println!("  音訊取樣率: {rate} Hz"),
                        None => println!("  音訊取樣率: 無音軌"),
                    }
                    println!(
                        "  檔案大小: {:.2} MB",
                        info.file_size_bytes as f64 / 1024.0 / 1024.0
                    );
                }
                Err(e) => {
                    error!("讀取影片資訊失敗 {}: {e}", input.display());
                    println!("  {} 讀取失敗: {}", style("✗").red(), e);
                }
            }
        }

        Ok(())
    }

    fn print_summary(&self, outcome: &BatchOutcome) {
        println!();
        println!("{}", style("=== 切割摘要 ===").cyan().bold());
        println!("  總計: {} 個影片", outcome.total);
        println!("  成功: {} 個", style(outcome.successful).green());

        if outcome.failed > 0 {
            println!("  失敗: {} 個", style(outcome.failed).red());
        }

        println!("  產出片段: {} 個", outcome.clips_created);

        info!(
            "影片切割完成 - 成功: {}, 失敗: {}, 片段: {}",
            outcome.successful, outcome.failed, outcome.clips_created
        );
    }
}

/// 等分切割的邊界點
///
/// 段數為 0 或超過影片秒數時回報錯誤
fn equal_part_boundaries(duration: f64, parts: usize) -> Result<Vec<f64>> {
    if parts == 0 {
        anyhow::bail!("等分段數必須大於 0");
    }
    if parts as f64 > duration {
        anyhow::bail!("等分段數 {parts} 超過影片長度 {duration:.1} 秒");
    }

    let step = duration / parts as f64;
    let mut boundaries = Vec::with_capacity(parts + 1);
    boundaries.push(0.0);
    for i in 1..parts {
        boundaries.push(i as f64 * step);
    }
    boundaries.push(duration);

    Ok(boundaries)
}

/// 把使用者指定的 (開始, 結束) 轉成切割區間
///
/// 範圍錯誤的區間逐一略過並警告；序號只給保留下來的區間
fn intervals_from_pairs(pairs: &[(f64, f64)], duration: f64) -> Vec<ClipInterval> {
    let mut intervals = Vec::with_capacity(pairs.len());

    for &(start, end) in pairs {
        if start < 0.0 || end > duration + TIME_EPSILON || start >= end {
            warn!("略過無效的時間區間: {start:.3}s - {end:.3}s（影片長度 {duration:.3}s）");
            continue;
        }
        intervals.push(ClipInterval {
            start,
            end: end.min(duration),
            index: intervals.len() + 1,
        });
    }

    intervals
}

/// 每個輸入檔各自的輸出子目錄（以檔名主幹命名）
fn clip_output_dir(output_root: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "video".to_string(), |s| s.to_string_lossy().to_string());
    output_root.join(stem)
}
