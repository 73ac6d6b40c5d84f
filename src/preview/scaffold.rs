//! Surface and export document scaffolding.
//!
//! Generated fragments may reference a fixed library set; the scaffold loads
//! those libraries and re-initializes them after every content swap. Each
//! re-init is independently guarded so one missing or broken library never
//! blocks another's.

/// Sandbox attribute for the embedded preview surface. Scripts run inside
/// the surface only; same-origin is required for editor readback.
pub const SANDBOX_FLAGS: &str = "allow-scripts allow-same-origin allow-forms allow-modals allow-popups";

/// Head tags for the supporting library set the generated HTML is allowed
/// to reference. Kept identical between the live surface and the exported
/// artifact so a design never loses functionality on export.
const LIBRARY_TAGS: &str = r#"  <script src="https://cdn.tailwindcss.com"></script>
  <link href="https://unpkg.com/flowbite@1.6.6/dist/flowbite.min.css" rel="stylesheet" />
  <script src="https://unpkg.com/flowbite@1.6.6/dist/flowbite.min.js"></script>
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.4.0/css/all.min.css" crossorigin="anonymous" referrerpolicy="no-referrer" />
  <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
  <link href="https://unpkg.com/aos@2.3.1/dist/aos.css" rel="stylesheet">
  <script src="https://unpkg.com/aos@2.3.1/dist/aos.js"></script>
  <script src="https://cdnjs.cloudflare.com/ajax/libs/gsap/3.11.5/gsap.min.js"></script>
  <script src="https://cdnjs.cloudflare.com/ajax/libs/lottie-web/5.10.2/lottie.min.js"></script>
  <link rel="stylesheet" href="https://unpkg.com/swiper@8/swiper-bundle.min.css" />
  <script src="https://unpkg.com/swiper@8/swiper-bundle.min.js"></script>
  <script src="https://unpkg.com/@popperjs/core@2"></script>
  <link rel="stylesheet" href="https://unpkg.com/tippy.js@6/dist/tippy.css" />
  <script src="https://unpkg.com/tippy.js@6"></script>"#;

const BASE_STYLE: &str = r#"    html, body {
      margin: 0;
      padding: 0;
      height: 100%;
      width: 100%;
      overflow-x: hidden;
      font-family: system-ui, -apple-system, sans-serif;
      scroll-behavior: smooth;
    }
    * { box-sizing: border-box; }"#;

/// Extra rules active only while edit mode is on: text cursor on editable
/// nodes, pointer cursor on images (image edits go through the side panel).
const EDIT_MODE_STYLE: &str = r#"    [contenteditable="true"] { cursor: text !important; }
    [contenteditable="true"]:focus {
      outline: 2px solid #ef4444 !important;
      outline-offset: 2px !important;
    }
    img { cursor: pointer !important; }"#;

/// Re-init script run after each content swap. Every library init is
/// guarded on its own so a failed CDN load degrades that library only.
const REINIT_SCRIPT: &str = r#"  if (typeof AOS !== 'undefined') {
    try { AOS.init({ duration: 800, once: true, offset: 100 }); } catch (e) {}
  }
  if (typeof tippy !== 'undefined') {
    try { tippy('[data-tippy-content]', { placement: 'top', animation: 'fade' }); } catch (e) {}
  }
  if (typeof Flowbite !== 'undefined' && Flowbite.init) {
    try { Flowbite.init(); } catch (e) {}
  }"#;

/// Full document for the live preview surface.
pub fn surface_document(body: &str, edit_mode: bool) -> String {
    let edit_style = if edit_mode { EDIT_MODE_STYLE } else { "" };
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Website Preview</title>
{LIBRARY_TAGS}
  <style>
{BASE_STYLE}
{edit_style}
  </style>
</head>
<body>
{body}
<script>
{REINIT_SCRIPT}
</script>
</body>
</html>"#
    )
}

/// Standalone document for export — same library set, no edit affordances.
pub fn export_document(body: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Generated Website</title>
{LIBRARY_TAGS}
  <style>
{BASE_STYLE}
  </style>
</head>
<body>
{body}
<script>
{REINIT_SCRIPT}
</script>
</body>
</html>"#
    )
}
