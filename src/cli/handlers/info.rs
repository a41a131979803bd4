//! Information display handlers (stats, config)

use crate::cli::output::*;
use crate::errors::ExplorerError;
use crate::index::IndexStats;
use crate::AppConfig;
use crate::Result;

pub async fn handle_stats_command(config: &AppConfig) -> Result<()> {
    let index = crate::index::from_config(config)?;
    let stats = match index.stats().await {
        Ok(stats) => stats,
        Err(ExplorerError::NotInitialized(_)) => {
            print_info("The index has not been created yet");
            IndexStats {
                dimension: config.embedding_dimension(),
                ..IndexStats::default()
            }
        }
        Err(e) => return Err(e),
    };
    print_index_stats(&stats);
    Ok(())
}

pub fn handle_config_command(config: &AppConfig) -> Result<()> {
    print_config(config);
    println!();
    print_info("Effective configuration (keys masked):");
    println!("{}", config.to_masked_toml()?);
    Ok(())
}
