// Library root
// -----------
// This crate exposes the theme lifecycle as a library. The binary
// (`main.rs`) uses these modules to implement the CLI and its interactive
// menu.
//
// Module responsibilities:
// - `orchestrator`: The stateful theme lifecycle (exists, create, reset,
//   upload) on top of the collaborators below.
// - `config`: Environment configuration from the `~/.vpconfig.json` store or
//   from `VPRT_*` environment variables.
// - `schema`: Exact-key-set validation of config and upload arguments.
// - `paths`: Source-to-target path remapping for uploads.
// - `files`: Glob expansion of local files.
// - `api`: HTTP interactions with the Scroll Viewport REST API and the
//   multipart upload payload.
// - `ui`: Terminal menu that drives an orchestrator interactively.
pub mod api;
pub mod config;
pub mod error;
pub mod files;
pub mod orchestrator;
pub mod paths;
pub mod schema;
pub mod ui;

pub use error::{Result, ThemeError};
pub use orchestrator::{ThemeOrchestrator, UploadSpec};

use api::{HttpThemeApi, MultipartFormBuilder};
use files::FsGlobResolver;

/// Orchestrator wired to the real HTTP client, filesystem glob and
/// multipart builder.
pub type HttpThemeOrchestrator = ThemeOrchestrator<HttpThemeApi, FsGlobResolver, MultipartFormBuilder>;
