use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTypeTable {
    #[serde(rename = "VIDEO_FILE")]
    pub video_file: Vec<String>,
}

impl FileTypeTable {
    #[must_use]
    pub fn video_extensions_set(&self) -> HashSet<String> {
        self.video_file
            .iter()
            .map(|ext| ext.to_lowercase())
            .collect()
    }

    #[must_use]
    pub fn is_video_file(&self, path: &Path) -> bool {
        let video_extensions = self.video_extensions_set();
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| video_extensions.contains(&format!(".{}", ext.to_lowercase())))
    }
}

/// 切割參數，可由 settings.json 覆寫
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitterSettings {
    /// 場景變換靈敏度（select 濾鏡的 scene 分數門檻）
    pub scene_score_threshold: f64,
    /// 取樣偵測的間隔（秒）
    pub sample_interval_seconds: f64,
    /// 每段起訖往內縮的緩衝時間（秒），避免把轉場畫面帶進片段
    pub padding_seconds: f64,
    /// 低於此長度的片段會被捨棄（秒）
    pub min_clip_duration: f64,
    /// 未在命令列指定時的最短場景間隔（秒）
    pub default_min_scene_duration: f64,
    /// 未在命令列指定時的輸出資料夾
    pub default_output_dir: String,
}

impl Default for SplitterSettings {
    fn default() -> Self {
        Self {
            scene_score_threshold: 0.4,
            sample_interval_seconds: 0.5,
            padding_seconds: 0.04,
            min_clip_duration: 0.1,
            default_min_scene_duration: 2.0,
            default_output_dir: "smart_split".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub file_type_table: FileTypeTable,
    pub settings: SplitterSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_table() -> FileTypeTable {
        FileTypeTable {
            video_file: vec![".mp4".to_string(), ".mkv".to_string(), ".avi".to_string()],
        }
    }

    #[test]
    fn test_is_video_file_case_insensitive() {
        let table = make_table();

        assert!(table.is_video_file(Path::new("/videos/a.mp4")));
        assert!(table.is_video_file(Path::new("/videos/b.MKV")));
        assert!(!table.is_video_file(Path::new("/videos/c.txt")));
        assert!(!table.is_video_file(Path::new("/videos/no_extension")));
    }

    #[test]
    fn test_default_settings() {
        let settings = SplitterSettings::default();

        assert!((settings.scene_score_threshold - 0.4).abs() < f64::EPSILON);
        assert!((settings.padding_seconds - 0.04).abs() < f64::EPSILON);
        assert!((settings.min_clip_duration - 0.1).abs() < f64::EPSILON);
        assert_eq!(settings.default_output_dir, "smart_split");
    }

    #[test]
    fn test_settings_partial_override() {
        let settings: SplitterSettings =
            serde_json::from_str(r#"{"padding_seconds": 0.1}"#).unwrap();

        assert!((settings.padding_seconds - 0.1).abs() < f64::EPSILON);
        assert!(
            (settings.min_clip_duration - 0.1).abs() < f64::EPSILON,
            "未覆寫的欄位應該保留預設值"
        );
    }
}
