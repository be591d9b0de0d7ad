mod command_runner;
mod ffprobe_info;
mod path_validator;
mod video_scanner;

pub use command_runner::{CommandOutput, CommandRunner, SystemCommandRunner};
pub use ffprobe_info::{VideoInfo, get_video_info};
pub use path_validator::{ensure_directory_exists, validate_file_exists};
pub use video_scanner::scan_video_files;
