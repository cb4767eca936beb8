//! Chart Viewer Widget
//! Grouped bar chart of the leading numeric columns using egui_plot.

use data_sweeper::stats::{NumericSeries, NumericSummary};
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Legend, Plot};

const CHART_HEIGHT: f32 = 240.0;
const GROUP_WIDTH: f64 = 0.8;

/// Series colors, cycled
const PALETTE: [Color32; 4] = [
    Color32::from_rgb(31, 119, 180),
    Color32::from_rgb(255, 127, 14),
    Color32::from_rgb(44, 160, 44),
    Color32::from_rgb(214, 39, 40),
];

pub struct ChartViewer;

impl ChartViewer {
    pub fn show(ui: &mut egui::Ui, summary: &NumericSummary) {
        match summary {
            NumericSummary::NoNumericColumns => {
                ui.colored_label(
                    Color32::from_rgb(243, 156, 18),
                    "⚠️ No numeric columns available for visualization.",
                );
            }
            NumericSummary::Columns(series) => Self::draw_bars(ui, series),
        }
    }

    /// One bar group per row, one bar per series within the group.
    fn draw_bars(ui: &mut egui::Ui, series: &[NumericSeries]) {
        if series.iter().all(|s| s.values.iter().all(Option::is_none)) {
            ui.label(RichText::new("No values to plot").color(Color32::GRAY));
            return;
        }

        let bar_width = GROUP_WIDTH / series.len() as f64;
        let first_offset = -GROUP_WIDTH / 2.0 + bar_width / 2.0;

        Plot::new("numeric_bars")
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .x_axis_label("Row")
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                for (k, s) in series.iter().enumerate() {
                    let offset = first_offset + k as f64 * bar_width;
                    // Missing cells leave a gap in the group.
                    let bars: Vec<Bar> = s
                        .values
                        .iter()
                        .enumerate()
                        .filter_map(|(row, v)| v.map(|v| Bar::new(row as f64 + offset, v)))
                        .collect();

                    plot_ui.bar_chart(
                        BarChart::new(bars)
                            .name(&s.name)
                            .width(bar_width)
                            .color(PALETTE[k % PALETTE.len()]),
                    );
                }
            });
    }
}
