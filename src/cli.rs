use crate::component::video_splitter::{SplitMode, SplitRequest};
use crate::config::Config;
use crate::tools::scan_video_files;
use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use std::path::PathBuf;

/// 影片場景切割工具
#[derive(Parser, Debug)]
#[command(name = "smart_video_split")]
#[command(about = "自動偵測場景邊界並把影片切成獨立片段")]
#[command(version)]
pub struct CliArgs {
    /// 輸入影片檔案或資料夾（資料夾會遞迴掃描）
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// 輸出資料夾（預設為設定檔中的 smart_split）
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// 兩個場景之間的最短間隔（秒）
    #[arg(long)]
    pub min_scene_duration: Option<f64>,

    /// 自動偵測場景邊界
    #[arg(short, long)]
    pub auto_detect: bool,

    /// 等分成指定段數
    #[arg(short, long, value_name = "N")]
    pub equal_parts: Option<usize>,

    /// 指定切割區間，格式 "開始,結束"（秒），可重複指定
    #[arg(short, long, value_name = "START,END")]
    pub timestamps: Vec<String>,

    /// 只顯示影片資訊，不切割
    #[arg(long)]
    pub info: bool,

    /// 輸出檔名前綴
    #[arg(long, default_value = "clip")]
    pub output_prefix: String,
}

impl CliArgs {
    /// 決定切割模式；沒選或選了多個模式時回報錯誤
    pub fn resolve_mode(&self) -> Result<SplitMode> {
        // 互斥檢查先做，時間區間等參數值留到選定模式後才解析
        let selected = usize::from(self.auto_detect)
            + usize::from(self.equal_parts.is_some())
            + usize::from(!self.timestamps.is_empty());

        match selected {
            1 => {}
            0 => anyhow::bail!(
                "請選擇一種切割模式: --auto-detect、--equal-parts 或 --timestamps"
            ),
            _ => anyhow::bail!("一次只能選擇一種切割模式"),
        }

        if self.auto_detect {
            Ok(SplitMode::Auto)
        } else if let Some(parts) = self.equal_parts {
            Ok(SplitMode::EqualParts(parts))
        } else {
            Ok(SplitMode::Timestamps(parse_timestamp_pairs(&self.timestamps)?))
        }
    }
}

/// 解析 "開始,結束" 格式的時間區間參數
fn parse_timestamp_pairs(raw: &[String]) -> Result<Vec<(f64, f64)>> {
    let mut pairs = Vec::with_capacity(raw.len());

    for entry in raw {
        let (start_str, end_str) = entry
            .split_once(',')
            .with_context(|| format!("時間區間格式錯誤（應為 開始,結束）: {entry}"))?;
        let start: f64 = start_str
            .trim()
            .parse()
            .with_context(|| format!("無法解析開始時間: {entry}"))?;
        let end: f64 = end_str
            .trim()
            .parse()
            .with_context(|| format!("無法解析結束時間: {entry}"))?;
        pairs.push((start, end));
    }

    Ok(pairs)
}

/// 展開輸入參數成影片檔案列表
///
/// 資料夾遞迴掃描；不存在或非影片的路徑略過並警告
pub fn collect_input_files(inputs: &[PathBuf], config: &Config) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut found = scan_video_files(input, &config.file_type_table);
            if found.is_empty() {
                warn!("資料夾中找不到影片檔案: {}", input.display());
            }
            files.append(&mut found);
        } else if input.is_file() {
            if config.file_type_table.is_video_file(input) {
                files.push(input.clone());
            } else {
                warn!("略過非影片檔案: {}", input.display());
            }
        } else {
            warn!("略過不存在的路徑: {}", input.display());
        }
    }

    if files.is_empty() {
        anyhow::bail!("沒有可處理的影片檔案");
    }

    Ok(files)
}

/// 把命令列參數組成批次切割請求
pub fn build_request(args: &CliArgs, config: &Config, mode: SplitMode) -> Result<SplitRequest> {
    let min_scene_duration = args
        .min_scene_duration
        .unwrap_or(config.settings.default_min_scene_duration);
    if min_scene_duration <= 0.0 {
        anyhow::bail!("最短場景間隔必須大於 0");
    }

    let output_root = args
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.settings.default_output_dir));

    let inputs = collect_input_files(&args.inputs, config)?;

    Ok(SplitRequest {
        inputs,
        output_root,
        mode,
        min_scene_duration,
        output_prefix: args.output_prefix.clone(),
    })
}
