use std::fs;

const SAMPLE_CONFIG: &str = "\
# seqship configuration
#
# Base URL of the Seq-compatible ingestion server.
server_url: http://localhost:5341

# Buffer base path. The logging agent writes <buffer_base>*.json files;
# shipping progress is tracked in <buffer_base>.bookmark next to them.
buffer_base: /var/log/app/buffer

# Optional API key, sent as X-Seq-ApiKey when non-blank.
# api_key: your-key-here

# Maximum number of event lines per upload.
batch_posting_limit: 50

# Delay between shipping ticks.
period: 2s

# Timeout for a single upload request.
request_timeout: 30s
";

pub fn init(stdout: bool) -> Result<(), Box<dyn std::error::Error>> {
    if stdout {
        print!("{}", SAMPLE_CONFIG);
        return Ok(());
    }

    let Some(home_dir) = dirs::home_dir() else {
        return Err("could not determine home directory; use --stdout instead".into());
    };
    let config_path = home_dir.join(".config/seqship/config.yml");
    if config_path.exists() {
        return Err(format!(
            "config already exists at {}; remove it first or use --stdout",
            config_path.display()
        )
        .into());
    }
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&config_path, SAMPLE_CONFIG)?;
    println!("Wrote config to {}", config_path.display());
    Ok(())
}
