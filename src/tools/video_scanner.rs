use crate::config::FileTypeTable;
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 遞迴掃描資料夾內的影片檔案，結果依路徑排序
#[must_use]
pub fn scan_video_files(directory: &Path, file_type_table: &FileTypeTable) -> Vec<PathBuf> {
    let mut video_files: Vec<PathBuf> = WalkDir::new(directory)
        .follow_links(false)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| file_type_table.is_video_file(entry.path()))
        .map(walkdir::DirEntry::into_path)
        .collect();

    video_files.sort();
    debug!(
        "掃描 {} 找到 {} 個影片檔案",
        directory.display(),
        video_files.len()
    );

    video_files
}
