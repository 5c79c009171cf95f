use std::path::Path;

use slideforge_processing::StepOutput;

/// Step images for `output` go beside it, prefixed with its file stem.
pub fn step_output_for(output: &Path) -> StepOutput {
    let folder = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    let prefix = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "crop".to_string());
    StepOutput::new(folder, prefix)
}

/// Render filter names as a bulleted list, one per line.
pub fn format_filter_list(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("  - {}", name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
