mod commands;
mod db;
mod editor;
mod engine;
mod error;
mod logging;
mod media;
mod preview;

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use db::DbPool;
use tauri::Manager;

/// Shared application state accessible from all Tauri commands.
pub struct AppState {
    pub db: DbPool,
    /// Completion endpoint client (OpenRouter-compatible).
    pub provider: Arc<dyn engine::provider::ChatProvider>,
    /// External media service client (uploads, URL transforms, generation).
    pub media: Arc<media::MediaClient>,
    /// The single live preview surface. Mutated only by the renderer (bulk
    /// replace) and flushed editor readbacks — never both in the same tick.
    pub preview: Arc<Mutex<preview::surface::PreviewSurface>>,
    /// Direct-manipulation editor state machine and side panels. Tokio
    /// mutex: image transforms hold the guard across a network verify.
    pub editor: Arc<tokio::sync::Mutex<editor::EditorState>>,
    /// The one in-flight generation; replaced (and the old one cancelled)
    /// when a new turn starts.
    pub active_generation: engine::generation::ActiveGeneration,
    /// Frames whose initial load completed — chat saves before that are
    /// skipped so just-loaded messages are not re-written.
    pub loaded_frames: Arc<Mutex<HashSet<String>>>,
    /// Frames with a chat save in flight; concurrent saves are dropped.
    pub chat_saves_in_flight: Arc<Mutex<HashSet<String>>>,
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    dotenvy::dotenv().ok();
    logging::init();

    tracing::info!("Starting Pageforge Desktop v{}", env!("CARGO_PKG_VERSION"));

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_notification::init())
        .setup(|app| {
            let app_data_dir = app
                .path()
                .app_data_dir()
                .expect("Failed to resolve app data directory");

            logging::install_crash_hook(&app_data_dir);

            let pool = db::init_db(&app_data_dir)?;
            tracing::info!("Database pool ready (max_size=8)");

            let provider = Arc::new(engine::provider::OpenRouterProvider::from_settings(&pool)?);
            let media_client = Arc::new(media::MediaClient::from_settings(&pool)?);

            let state = Arc::new(AppState {
                db: pool,
                provider,
                media: media_client,
                preview: Arc::new(Mutex::new(preview::surface::PreviewSurface::new())),
                editor: Arc::new(tokio::sync::Mutex::new(editor::EditorState::new())),
                active_generation: Arc::new(Mutex::new(None)),
                loaded_frames: Arc::new(Mutex::new(HashSet::new())),
                chat_saves_in_flight: Arc::new(Mutex::new(HashSet::new())),
            });
            app.manage(state);

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::users::provision_user,
            commands::projects::create_project,
            commands::projects::list_projects,
            commands::projects::delete_project,
            commands::frames::get_frame_details,
            commands::frames::save_design_code,
            commands::chats::save_chat_messages,
            commands::generation::start_generation,
            commands::generation::cancel_generation,
            commands::editor::set_edit_mode,
            commands::editor::editor_pointer_over,
            commands::editor::editor_pointer_out,
            commands::editor::editor_select,
            commands::editor::editor_escape,
            commands::editor::set_style_property,
            commands::editor::add_class,
            commands::editor::remove_class,
            commands::editor::set_image_alt,
            commands::editor::set_image_dimensions,
            commands::editor::toggle_image_transform,
            commands::editor::upload_image,
            commands::editor::generate_image,
            commands::preview::get_preview_document,
            commands::preview::get_sandbox_flags,
            commands::preview::export_open_in_browser,
            commands::preview::export_save,
            commands::settings::get_setting,
            commands::settings::set_setting,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
