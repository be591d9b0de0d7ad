use crate::config::types::{Config, FileTypeTable, SplitterSettings};
use anyhow::{Context, Result};
use log::warn;
use std::fs;
use std::path::Path;

/// 編譯時嵌入的檔案類型設定（不需要外部檔案）
const FILE_TYPE_TABLE_JSON: &str = include_str!("../data/file_type_table.json");

impl Config {
    pub fn new() -> Result<Self> {
        let file_type_table = Self::load_embedded_file_type_table()?;

        // 設定檔壞掉時退回預設值並警告
        let settings = match Self::load_settings() {
            Ok(settings) => settings,
            Err(e) => {
                warn!("載入 settings.json 失敗，改用預設切割參數: {e}");
                SplitterSettings::default()
            }
        };

        Ok(Self {
            file_type_table,
            settings,
        })
    }

    fn load_settings() -> Result<SplitterSettings> {
        let path = Path::new("settings.json");
        if !path.exists() {
            return Ok(SplitterSettings::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("無法讀取設定檔: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("無法解析設定檔: {}", path.display()))
    }

    /// 從編譯時嵌入的 JSON 載入檔案類型表
    fn load_embedded_file_type_table() -> Result<FileTypeTable> {
        serde_json::from_str(FILE_TYPE_TABLE_JSON).context("無法解析嵌入的檔案類型設定")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_file_type_table_parses() {
        let table = Config::load_embedded_file_type_table().unwrap();
        assert!(!table.video_file.is_empty());
        assert!(table.video_file.contains(&".mp4".to_string()));
    }
}
