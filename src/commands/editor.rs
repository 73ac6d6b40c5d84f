use std::sync::Arc;

use tauri::{Emitter, State};

use crate::editor::image::ImageTransform;
use crate::editor::{ClickTarget, EditDirective, NodeRef};
use crate::error::AppError;
use crate::AppState;

fn selected_node(editor: &crate::editor::EditorState) -> Result<NodeRef, AppError> {
    editor
        .selected_node()
        .ok_or_else(|| AppError::Validation("No element selected".into()))
}

fn selected_image_node(editor: &crate::editor::EditorState) -> Result<NodeRef, AppError> {
    let selection = editor
        .selection()
        .ok_or_else(|| AppError::Validation("No element selected".into()))?;
    if !selection.is_image {
        return Err(AppError::Validation("Selected element is not an image".into()));
    }
    Ok(selection.node.clone())
}

/// Toggle edit mode. Entering pauses renderer pushes for the surface;
/// leaving flushes the surface readback (in-place text edits) into the
/// session's code state before any future push.
#[tauri::command]
pub async fn set_edit_mode(
    state: State<'_, Arc<AppState>>,
    app: tauri::AppHandle,
    enabled: bool,
    surface_body: Option<String>,
) -> Result<Vec<EditDirective>, AppError> {
    let mut editor = state.editor.lock().await;

    if enabled {
        let directives = editor.enable();
        state.preview.lock().unwrap().pause();
        Ok(directives)
    } else {
        let directives = editor.disable();
        let mut surface = state.preview.lock().unwrap();
        if let Some(body) = surface_body {
            surface.set_body(body);
        }
        if let Some(payload) = surface.resume() {
            let _ = app.emit("preview-update", payload);
        }
        Ok(directives)
    }
}

#[tauri::command]
pub async fn editor_pointer_over(
    state: State<'_, Arc<AppState>>,
    node: NodeRef,
) -> Result<Vec<EditDirective>, AppError> {
    Ok(state.editor.lock().await.pointer_over(node))
}

#[tauri::command]
pub async fn editor_pointer_out(
    state: State<'_, Arc<AppState>>,
    node: NodeRef,
) -> Result<Vec<EditDirective>, AppError> {
    Ok(state.editor.lock().await.pointer_out(&node))
}

#[tauri::command]
pub async fn editor_select(
    state: State<'_, Arc<AppState>>,
    target: ClickTarget,
) -> Result<Vec<EditDirective>, AppError> {
    Ok(state.editor.lock().await.click(target))
}

#[tauri::command]
pub async fn editor_escape(
    state: State<'_, Arc<AppState>>,
) -> Result<Vec<EditDirective>, AppError> {
    Ok(state.editor.lock().await.escape())
}

// ── Style side panel ────────────────────────────────────────────

#[tauri::command]
pub async fn set_style_property(
    state: State<'_, Arc<AppState>>,
    property: String,
    value: String,
) -> Result<EditDirective, AppError> {
    let mut editor = state.editor.lock().await;
    let node = selected_node(&editor)?;
    editor.style.set_property(&node, &property, &value)
}

#[tauri::command]
pub async fn add_class(
    state: State<'_, Arc<AppState>>,
    name: String,
) -> Result<EditDirective, AppError> {
    let mut editor = state.editor.lock().await;
    let node = selected_node(&editor)?;
    editor.style.add_class(&node, &name)
}

#[tauri::command]
pub async fn remove_class(
    state: State<'_, Arc<AppState>>,
    name: String,
) -> Result<EditDirective, AppError> {
    let mut editor = state.editor.lock().await;
    let node = selected_node(&editor)?;
    editor.style.remove_class(&node, &name)
}

// ── Image side panel ────────────────────────────────────────────

#[tauri::command]
pub async fn set_image_alt(
    state: State<'_, Arc<AppState>>,
    alt: String,
) -> Result<EditDirective, AppError> {
    let mut editor = state.editor.lock().await;
    let node = selected_image_node(&editor)?;
    Ok(editor.image.set_alt(&node, alt))
}

#[tauri::command]
pub async fn set_image_dimensions(
    state: State<'_, Arc<AppState>>,
    width: u32,
    height: u32,
) -> Result<EditDirective, AppError> {
    let mut editor = state.editor.lock().await;
    let node = selected_image_node(&editor)?;
    Ok(editor.image.set_dimensions(&node, width, height))
}

/// Toggle a URL transform and re-derive the image source. The derived URL
/// is verified by loading it; on failure the panel reverts to the last
/// known-good source and the error reaches the UI as a notice.
#[tauri::command]
pub async fn toggle_image_transform(
    state: State<'_, Arc<AppState>>,
    transform: ImageTransform,
) -> Result<EditDirective, AppError> {
    let mut editor = state.editor.lock().await;
    let node = selected_image_node(&editor)?;
    editor.image.toggle_transform(transform);
    editor.image.apply_transforms(&node, &state.media).await
}

/// Upload a replacement image (base64-encoded bytes from the file picker)
/// and adopt the service-assigned URL as the node's new source.
#[tauri::command]
pub async fn upload_image(
    state: State<'_, Arc<AppState>>,
    file_name: String,
    data: String,
) -> Result<EditDirective, AppError> {
    use base64::Engine;

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data.as_bytes())
        .map_err(|e| AppError::Validation(format!("invalid file payload: {e}")))?;
    if bytes.len() > 10 * 1024 * 1024 {
        return Err(AppError::Validation("File size must be less than 10MB".into()));
    }

    // Validate the selection before paying for the upload.
    let node = selected_image_node(&*state.editor.lock().await)?;

    let stamped = format!("website-{}-{}", uuid::Uuid::new_v4(), file_name);
    let url = state.media.upload(&stamped, bytes).await?;

    let mut editor = state.editor.lock().await;
    Ok(editor.image.adopt_source(&node, url))
}

/// Generate an AI image from a prompt. The generation is encoded in the
/// URL and rendered by the service on first load, so the URL is verified
/// before being committed as the node's source.
#[tauri::command]
pub async fn generate_image(
    state: State<'_, Arc<AppState>>,
    prompt: String,
) -> Result<EditDirective, AppError> {
    if prompt.trim().is_empty() {
        return Err(AppError::Validation("Please enter a prompt".into()));
    }

    let file_name = format!("ai-gen-{}.jpg", uuid::Uuid::new_v4());
    let url = state.media.generation_url(&prompt, &file_name);
    state.media.verify_loads(&url).await?;

    let mut editor = state.editor.lock().await;
    let node = selected_image_node(&editor)?;
    editor.image.adopt_source(&node, url);
    Ok(editor.image.set_alt(&node, prompt))
}
