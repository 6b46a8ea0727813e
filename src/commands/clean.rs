use log::info;

use crate::{
    CleanArgs,
    config::{Config, site_root_from_config},
};

pub fn run(args: &CleanArgs) -> Result<(), anyhow::Error> {
    let config_path = Config::path_from_arg(args.config_file.as_deref())?;
    let config = Config::load_from_file(&config_path)?;
    let site_root = site_root_from_config(&config_path);

    let output = if config.site.output.is_relative() {
        site_root.join(&config.site.output)
    } else {
        config.site.output.clone()
    };

    let resolved = output.canonicalize().unwrap_or_else(|_| output.clone());
    if site_root.canonicalize()?.starts_with(&resolved) {
        anyhow::bail!(
            "refusing to delete {}: it contains the site root",
            output.display()
        );
    }

    if !output.exists() {
        info!("Nothing to clean at {}", output.display());
    } else if args.dry_run {
        info!("Would delete {}", output.display());
    } else {
        std::fs::remove_dir_all(&output)?;
        info!("Deleted {}", output.display());
    }

    Ok(())
}
