use halo_player::config::Config;
use std::error::Error;

pub fn handle_init() -> Result<(), Box<dyn Error>> {
    if Config::exists()? {
        return Err(
            "halo is already initialized. Use 'halo config set <key> <value>' to change settings."
                .into(),
        );
    }

    let config = Config::new();
    config.save()?;

    println!("halo initialized successfully!");
    println!(
        "Configuration saved to: {}",
        Config::config_path()?.display()
    );

    Ok(())
}
