use clap::Parser;

use shapes_common::config::Config;

mod app;
mod args;
mod lifecycle;
mod scene;

use app::{App, AppError};
use args::Args;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // clion needs help in trait annotation
    let args = <Args as Parser>::parse();

    if let Err(e) = run(&args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), AppError> {
    let mut config = match &args.config {
        Some(path) => Config::load_path(path)?,
        None => Config::default(),
    };
    args.apply(&mut config);

    log::info!(
        "drawing in {:?} mode with shader {}",
        config.mode,
        config.shader.display()
    );

    App::new(config)?.run()
}
