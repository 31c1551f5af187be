use super::ui;
use crate::core::{RunCoordinator, TimeframeAnalysis};
use anyhow::Result;

/// Runs every configured timeframe, printing each table as soon as it lands.
pub async fn run(coordinator: &RunCoordinator, json: bool) -> Result<()> {
    let pb = ui::new_percent_bar();
    pb.set_message(format!(
        "Analyzing {} timeframes...",
        coordinator.timeframes().len()
    ));

    let progress = |stage: &str, pct: f64| {
        pb.set_position(pct.round() as u64);
        pb.set_message(stage.to_string());
    };
    let stream = |_label: &str, analysis: &TimeframeAnalysis| {
        if !json {
            pb.suspend(|| {
                println!("{}", analysis.display_as_table());
                ui::print_separator();
            });
        }
    };

    let run = coordinator
        .run_analysis(Some(&progress), Some(&stream))
        .await;
    pb.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&run)?);
        return Ok(());
    }

    let without_data: Vec<&str> = run
        .iter()
        .filter(|t| t.is_empty())
        .map(|t| t.label.as_str())
        .collect();
    if !without_data.is_empty() {
        println!(
            "{}",
            ui::style_text(
                &format!("No data for: {}", without_data.join(", ")),
                ui::StyleType::Error
            )
        );
    }
    Ok(())
}
