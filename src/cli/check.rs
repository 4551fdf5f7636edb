use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use protgroup::store::EvidenceStore;

/// Check an evidence store for missing stages and empty tables
pub fn run(store_path: PathBuf, json: bool) -> Result<()> {
    info!("Evidence store check");
    info!("====================");
    info!("Store: {}", store_path.display());

    let store = match EvidenceStore::open(&store_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Check error: {}", e);
            std::process::exit(1);
        }
    };

    match store.check() {
        Ok(report) => {
            if json {
                let out = serde_json::to_string_pretty(&report)
                    .context("Failed to serialize check report")?;
                println!("{}", out);
            } else {
                #[cfg(feature = "colorized_output")]
                {
                    println!("{}", report.format_colored());
                }

                #[cfg(not(feature = "colorized_output"))]
                {
                    println!("{}", report);
                }
            }

            if report.has_failures() {
                std::process::exit(1);
            }

            Ok(())
        }
        Err(e) => {
            eprintln!("Check error: {}", e);
            std::process::exit(1);
        }
    }
}
