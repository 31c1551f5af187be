use super::ui;
use crate::core::ranking::HoldingRankEntry;
use crate::core::timeframe::TimeframeAnalysis;
use comfy_table::{Cell, Color};

fn format_holdings(entries: &[HoldingRankEntry]) -> String {
    if entries.is_empty() {
        return "-".to_string();
    }
    entries
        .iter()
        .map(|e| format!("{} {:+.2}", e.holding_symbol, e.relative_performance))
        .collect::<Vec<_>>()
        .join("\n")
}

impl TimeframeAnalysis {
    pub fn display_as_table(&self) -> String {
        let mut output = format!(
            "Timeframe: {} {}\n\n",
            ui::style_text(&self.label, ui::StyleType::Title),
            ui::style_text(
                &format!("({} trading days)", self.lookback_days),
                ui::StyleType::Subtle
            )
        );

        if self.is_empty() {
            output.push_str(&ui::style_text(
                "No data for this window",
                ui::StyleType::Error,
            ));
            return output;
        }

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("#"),
            ui::header_cell("Instrument"),
            ui::header_cell("Name"),
            ui::header_cell("vs Benchmark"),
            ui::header_cell("Trend"),
            ui::header_cell("Leaders"),
            ui::header_cell("Laggards"),
        ]);

        for (rank, entry) in self.instruments.iter().enumerate() {
            let trend_color = if entry.performance.value > 0.0 {
                Color::Green
            } else {
                Color::Red
            };
            table.add_row(vec![
                Cell::new(rank + 1),
                Cell::new(&entry.instrument.symbol),
                Cell::new(&entry.instrument.name),
                ui::relative_cell(entry.performance.value),
                Cell::new(entry.performance.trend).fg(trend_color),
                Cell::new(format_holdings(&entry.top_holdings)),
                Cell::new(format_holdings(&entry.worst_holdings)),
            ]);
        }

        output.push_str(&table.to_string());
        output
    }
}
