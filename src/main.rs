use anyhow::Result;
use clap::{CommandFactory, Parser};
use console::style;
use log::info;
use smart_video_split::cli::{self, CliArgs};
use smart_video_split::component::video_splitter::VideoSplitter;
use smart_video_split::config::Config;
use smart_video_split::init;
use smart_video_split::signal::setup_shutdown_signal;

fn main() -> Result<()> {
    init::init();

    let args = CliArgs::parse();
    let shutdown_signal = setup_shutdown_signal();
    let config = Config::new()?;

    let splitter = VideoSplitter::new(config.clone(), shutdown_signal);

    // --info 只查資訊，不需要切割模式
    if args.info {
        let inputs = cli::collect_input_files(&args.inputs, &config)?;
        splitter.show_info(&inputs)?;
        return Ok(());
    }

    let mode = match args.resolve_mode() {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("{} {e}", style("錯誤:").red().bold());
            eprintln!();
            let _ = CliArgs::command().print_help();
            std::process::exit(1);
        }
    };

    let request = cli::build_request(&args, &config, mode)?;
    let outcome = splitter.run(&request)?;

    info!(
        "程式結束 - 處理 {} 個影片，產出 {} 個片段",
        outcome.total, outcome.clips_created
    );

    Ok(())
}
