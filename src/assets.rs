use std::path::{Path, PathBuf};

/// Directory holding `assets/`: the `--assets-root` flag, then `TORCHLIGHT_ASSETS`,
/// then the checkout this binary was built from.
pub fn resolve_assets_root(cli: Option<PathBuf>) -> PathBuf {
    cli.or_else(|| std::env::var_os("TORCHLIGHT_ASSETS").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")))
}

pub fn blocks_path(root: &Path) -> PathBuf {
    root.join("assets/blocks.toml")
}

pub fn scenario_path(root: &Path) -> PathBuf {
    root.join("assets/scenario.toml")
}
