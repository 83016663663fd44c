use std::path::Path;

use plateflow_core::PlateflowConfig;

pub fn init(path: &str) -> anyhow::Result<()> {
    let output = Path::new(path).join("plateflow.toml");
    if output.exists() {
        anyhow::bail!("{} already exists", output.display());
    }

    std::fs::write(&output, PlateflowConfig::scaffold().to_toml_string()?)?;
    println!("✓ Generated {}", output.display());
    Ok(())
}
