// UI layer: provides a simple interactive menu using `dialoguer`.
// Each entry maps to one orchestrator operation; failures are printed and
// the menu keeps running.

use crate::api::{FormDataBuilder, ThemeApi};
use crate::files::GlobResolver;
use crate::orchestrator::{ThemeOrchestrator, UploadSpec};
use anyhow::Result;
use crossterm::style::Stylize;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;

/// Main interactive menu. Runs a select loop until the user chooses "Exit".
///
/// `rebuild` produces a new orchestrator for the same theme. It is used
/// after the menu creates a missing theme, because the creating instance
/// keeps answering "missing" from its existence cache.
pub async fn main_menu<A, G, F>(
    mut orch: ThemeOrchestrator<A, G, F>,
    rebuild: impl Fn() -> Result<ThemeOrchestrator<A, G, F>>,
) -> Result<()>
where
    A: ThemeApi,
    G: GlobResolver,
    F: FormDataBuilder,
{
    println!(
        "Theme {} on environment {}",
        orch.theme_name().bold(),
        orch.env_name().bold()
    );
    loop {
        let items = vec!["Check theme", "Create theme", "Reset theme", "Upload files", "Exit"];
        let selection = Select::new().items(&items).default(0).interact()?;
        match selection {
            0 => {
                let outcome = with_spinner("Checking...", orch.exists()).await;
                match outcome {
                    Ok(true) => println!("{}", "Theme exists".green()),
                    Ok(false) => println!("{}", "Theme does not exist".yellow()),
                    Err(e) => report_failure("Check", &e),
                }
            }
            1 => {
                let existed = with_spinner("Checking...", orch.exists()).await;
                let mut outcome = with_spinner("Creating...", orch.create()).await;
                if matches!((&existed, &outcome), (Ok(false), Ok(()))) {
                    orch = rebuild()?;
                    outcome = with_spinner("Binding...", orch.create()).await;
                }
                match outcome {
                    Ok(()) => println!(
                        "{} (id {})",
                        "Theme ready".green(),
                        orch.theme_id().unwrap_or("?")
                    ),
                    Err(e) => report_failure("Create", &e),
                }
            }
            2 => {
                // Reset wipes every remote resource, so ask first.
                let confirmed = Confirm::new()
                    .with_prompt("Remove all resources of this theme?")
                    .default(false)
                    .interact()?;
                if !confirmed {
                    continue;
                }
                if orch.theme_id().is_none() {
                    println!("Create the theme first to bind its id.");
                    continue;
                }
                let outcome = with_spinner("Resetting...", orch.reset()).await;
                match outcome {
                    Ok(()) => println!("{}", "Theme reset".green()),
                    Err(e) => report_failure("Reset", &e),
                }
            }
            3 => {
                if orch.theme_id().is_none() {
                    println!("Create the theme first to bind its id.");
                    continue;
                }
                let spec = prompt_upload_spec()?;
                let outcome = with_spinner("Uploading...", orch.upload_spec(&spec)).await;
                match outcome {
                    Ok(paths) if paths.is_empty() => println!("Nothing to upload"),
                    Ok(paths) => {
                        for path in &paths {
                            println!("  {path}");
                        }
                        println!("{}", format!("Uploaded {} files", paths.len()).green());
                    }
                    Err(e) => report_failure("Upload", &e),
                }
            }
            4 => break,
            _ => {}
        }
    }
    Ok(())
}

/// Collect the three upload arguments.
fn prompt_upload_spec() -> Result<UploadSpec> {
    let source_path: String = Input::new()
        .with_prompt("Source directory (e.g. src/)")
        .allow_empty(true)
        .interact_text()?;
    let target_path: String = Input::new()
        .with_prompt("Target directory (e.g. dist/)")
        .allow_empty(true)
        .interact_text()?;
    let glob_string: String = Input::new()
        .with_prompt("Files to upload (glob)")
        .interact_text()?;
    Ok(UploadSpec {
        target_path,
        source_path,
        glob_string,
    })
}

/// Shows an indicatif spinner while `work` runs.
async fn with_spinner<T>(message: &'static str, work: impl Future<Output = T>) -> T {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    let out = work.await;
    spinner.finish_and_clear();
    out
}

fn report_failure(action: &str, err: &crate::ThemeError) {
    println!("{}", format!("{action} failed: {err}").red());
}
