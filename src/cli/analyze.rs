use super::ui;
use crate::core::TimeframeAnalyzer;
use anyhow::Result;

pub async fn run(
    analyzer: &TimeframeAnalyzer,
    lookback_days: u32,
    label: &str,
    json: bool,
) -> Result<()> {
    let spinner = ui::new_spinner(&format!(
        "Analyzing {} instruments over {label}...",
        analyzer.catalog().instruments.len()
    ));
    let analysis = analyzer.analyze_timeframe(lookback_days, label).await;
    spinner.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        println!("{}", analysis.display_as_table());
    }
    Ok(())
}
