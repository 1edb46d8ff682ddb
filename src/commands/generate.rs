//! Generate static files

use anyhow::Result;

use crate::generator::GenerateReport;
use crate::Site;

/// Generate the static site from the CMS
pub async fn run(site: &Site) -> Result<GenerateReport> {
    let start = std::time::Instant::now();

    let report = site.generate().await?;

    tracing::info!(
        "Listed {} posts, wrote {} post pages{}",
        report.listed,
        report.written,
        if report.has_more {
            ", more pages available on demand"
        } else {
            ""
        }
    );
    if !report.skipped.is_empty() {
        tracing::warn!("Skipped posts: {}", report.skipped.join(", "));
    }
    tracing::info!("Completed in {:.2}s", start.elapsed().as_secs_f64());

    Ok(report)
}
