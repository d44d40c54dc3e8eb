use halo_player::config::Config;
use std::error::Error;
use std::process::Command;

pub fn handle_config_view() -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;

    println!("Current halo configuration:");
    println!("  fallback_accent: {}", config.fallback_accent);
    println!("  beat_threshold: {}", config.beat_threshold);
    println!("  refractory_ms: {}", config.refractory_ms);
    println!("  bar_count: {}", config.bar_count);
    println!("  frame_interval_ms: {}", config.frame_interval_ms);
    println!("  pixel_ratio: {}", config.pixel_ratio);
    println!("  background_circles: {}", config.background_circles);
    println!("  pulse_count: {}", config.pulse_count);
    println!("  show_background: {}", config.show_background);
    println!("  log_file: {}", config.log_file);
    println!("  log_level: {}", config.log_level);

    if !Config::exists()? {
        println!();
        println!("(defaults, no config file yet; run 'halo init' to create one)");
    }

    Ok(())
}

pub fn handle_config_set(key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    let mut config = Config::load()?;

    config.set_value(key, value)?;
    config.save()?;

    println!("Configuration updated: {key} = {value}");

    Ok(())
}

pub fn handle_config_edit() -> Result<(), Box<dyn Error>> {
    // Ensure config exists
    if !Config::exists()? {
        return Err("halo not initialized. Run 'halo init' first.".into());
    }

    let config_path = Config::config_path()?;
    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());

    println!("Opening {} in {}", config_path.display(), editor);

    let status = Command::new(&editor)
        .arg(&config_path)
        .status()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                format!("Editor '{editor}' not found. Set $EDITOR to a valid editor path.")
            } else {
                format!("Failed to launch editor '{editor}': {e}")
            }
        })?;

    if !status.success() {
        return Err(format!("Editor '{editor}' exited with error").into());
    }

    // Validate the config after editing
    match Config::load() {
        Ok(_) => println!("Configuration saved successfully"),
        Err(e) => {
            return Err(format!("Configuration validation failed: {e}").into());
        }
    }

    Ok(())
}
