use dotenvy::dotenv;
use tracing::info;

mod config;
mod llm;
mod prompt;
mod session;
mod ui;
mod utils;

use config::CONFIG;
use utils::logging::init_logging;

fn main() -> iced::Result {
    let _ = dotenv();
    let _logging_guards = init_logging();

    info!(
        "Starting visual-video-prompt (model: {}, api key configured: {})",
        CONFIG.gemini_model,
        !CONFIG.gemini_api_key.trim().is_empty()
    );

    iced::application(
        "Visual-to-Video Prompt Generator",
        ui::App::update,
        ui::App::view,
    )
    .subscription(ui::App::subscription)
    .theme(ui::App::theme)
    .run_with(ui::App::new)
}
