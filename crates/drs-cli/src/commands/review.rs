use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use drs_core::{DeliveryInput, ReviewSettings};
use drs_executor::{review_delivery, ReviewReport};

/// Review every delivery file on its own blocking task.
pub async fn review_files(
    files: Vec<PathBuf>,
    settings: ReviewSettings,
    output: Option<PathBuf>,
) -> Result<()> {
    if let Some(dir) = &output {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }

    let settings = Arc::new(settings);
    let total = files.len();
    let handles: Vec<_> = files
        .into_iter()
        .map(|file| {
            let settings = Arc::clone(&settings);
            tokio::task::spawn_blocking(move || {
                let report = review_file(&file, &settings);
                (file, report)
            })
        })
        .collect();

    let mut failed = 0;
    for handle in handles {
        let (file, report) = handle.await.context("Review task panicked")?;
        let report = match report {
            Ok(report) => report,
            Err(err) => {
                tracing::error!("Failed to review {}: {:#}", file.display(), err);
                failed += 1;
                continue;
            }
        };
        println!("{}: {}", report.delivery_id, report.decision);
        if let Some(dir) = &output {
            if let Err(err) = write_report(dir, &report).await {
                tracing::error!("{:#}", err);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} deliveries could not be reviewed", failed, total);
    }
    Ok(())
}

fn review_file(path: &Path, settings: &ReviewSettings) -> Result<ReviewReport> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let input: DeliveryInput = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse delivery {}", path.display()))?;
    tracing::debug!(
        "Reviewing delivery {} ({} frames)",
        input.delivery_id,
        input.frames.len()
    );
    review_delivery(&input, settings)
        .with_context(|| format!("Failed to review delivery {}", input.delivery_id))
}

async fn write_report(dir: &Path, report: &ReviewReport) -> Result<()> {
    let path = dir.join(report_file_name(&report.delivery_id));
    let json = serde_json::to_string_pretty(report)
        .with_context(|| format!("Failed to serialize report {}", report.delivery_id))?;
    tokio::fs::write(&path, json)
        .await
        .with_context(|| format!("Failed to write report {}", path.display()))?;
    tracing::info!("Wrote report to {}", path.display());
    Ok(())
}

fn report_file_name(delivery_id: &str) -> String {
    let stem: String = delivery_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{stem}.json")
}
