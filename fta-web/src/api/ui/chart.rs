//! Inline SVG rendering of [`ChartSpec`]

use std::fmt::Write;

use crate::services::sentiment_analyzer::ChartSpec;

use super::escape_html;

const WIDTH: f64 = 480.0;
const BAR_AREA_TOP: f64 = 40.0;
const BAR_HEIGHT: f64 = 28.0;
const BAR_GAP: f64 = 14.0;
const LABEL_WIDTH: f64 = 90.0;
const VALUE_WIDTH: f64 = 60.0;

/// Horizontal bar per proportion, then the compound gauge below
pub fn render_sentiment_svg(chart: &ChartSpec) -> String {
    let bar_span = WIDTH - LABEL_WIDTH - VALUE_WIDTH;
    let gauge_top = BAR_AREA_TOP + chart.bars.len() as f64 * (BAR_HEIGHT + BAR_GAP) + 10.0;
    let height = gauge_top + 60.0;

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg class="sentiment-chart" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}" role="img" aria-label="{title}">"#,
        w = WIDTH,
        h = height,
        title = escape_html(&chart.title),
    );
    let _ = write!(
        svg,
        r#"<text x="0" y="20" class="chart-title">{}</text>"#,
        escape_html(&chart.title)
    );

    for (i, bar) in chart.bars.iter().enumerate() {
        let y = BAR_AREA_TOP + i as f64 * (BAR_HEIGHT + BAR_GAP);
        let value = bar.value.clamp(0.0, 1.0);
        let _ = write!(
            svg,
            r#"<text x="0" y="{ty:.1}" class="chart-label">{label}</text><rect x="{x}" y="{y:.1}" width="{bw:.1}" height="{bh}" fill="{color}"/><text x="{vx:.1}" y="{ty:.1}" class="chart-value">{value:.2}</text>"#,
            ty = y + BAR_HEIGHT * 0.7,
            label = escape_html(&bar.label),
            x = LABEL_WIDTH,
            y = y,
            bw = value * bar_span,
            bh = BAR_HEIGHT,
            color = escape_html(&bar.color),
            vx = LABEL_WIDTH + value * bar_span + 6.0,
            value = value,
        );
    }

    // Gauge track spans [min, max]; the marker sits at the compound score
    let gauge = &chart.compound;
    let range = (gauge.max - gauge.min).max(f64::EPSILON);
    let fraction = ((gauge.value - gauge.min) / range).clamp(0.0, 1.0);
    let track = WIDTH - LABEL_WIDTH - VALUE_WIDTH;
    let marker_x = LABEL_WIDTH + fraction * track;
    let _ = write!(
        svg,
        r##"<text x="0" y="{ty:.1}" class="chart-label">Compound</text><rect x="{x}" y="{y:.1}" width="{track:.1}" height="8" fill="#3a3a3a"/><circle cx="{mx:.1}" cy="{cy:.1}" r="9" fill="{color}"/><text x="{vx:.1}" y="{ty:.1}" class="chart-value">{value:.2}</text>"##,
        ty = gauge_top + 14.0,
        x = LABEL_WIDTH,
        y = gauge_top + 6.0,
        track = track,
        mx = marker_x,
        cy = gauge_top + 10.0,
        color = escape_html(&gauge.color),
        vx = LABEL_WIDTH + track + 14.0,
        value = gauge.value,
    );

    svg.push_str("</svg>");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::sentiment_analyzer::{create_sentiment_chart, SentimentResult};

    #[test]
    fn test_svg_has_one_bar_per_proportion() {
        let chart = create_sentiment_chart(&SentimentResult::neutral());
        let svg = render_sentiment_svg(&chart);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<rect").count(), chart.bars.len() + 1);
        assert!(svg.contains("Sentiment Distribution"));
    }

    #[test]
    fn test_gauge_marker_position() {
        let mut chart = create_sentiment_chart(&SentimentResult::neutral());
        chart.compound.value = 1.0;
        let svg = render_sentiment_svg(&chart);
        let expected = format!(r#"cx="{:.1}""#, WIDTH - VALUE_WIDTH);
        assert!(svg.contains(&expected));
    }
}
