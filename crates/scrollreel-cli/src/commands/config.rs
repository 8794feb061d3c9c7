use anyhow::Result;

use scrollreel_core::AppConfig;

pub fn run(config: &AppConfig, save: bool) -> Result<()> {
    if save {
        let path = config.save()?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    println!("# {}\n", AppConfig::config_path().display());
    print!("{}", config.to_toml()?);

    Ok(())
}
