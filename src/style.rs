use ratatui::style::Color;

use crate::sort::ColumnClass;

pub const GAIN_COLOR: Color = Color::Rgb(0x57, 0xbd, 0x0d);
pub const LOSS_COLOR: Color = Color::Rgb(0xed, 0x55, 0x65);

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    Gain,
    Loss,
    #[default]
    Neutral,
}

impl Tone {
    pub fn color(self) -> Color {
        match self {
            Tone::Gain => GAIN_COLOR,
            Tone::Loss => LOSS_COLOR,
            Tone::Neutral => Color::Reset,
        }
    }
}

/// Tone of a price change. Only strictly positive changes count as a gain.
pub fn change_tone(value: f64) -> Tone {
    if value > 0.0 { Tone::Gain } else { Tone::Loss }
}

/// Tone of a trend series, comparing its first and last sample.
pub fn trend_tone(series: &[f64]) -> Tone {
    match (series.first(), series.last()) {
        (Some(first), Some(last)) if first < last => Tone::Gain,
        (Some(_), Some(_)) => Tone::Loss,
        _ => Tone::Neutral,
    }
}

pub fn sort_indicator(class: ColumnClass) -> &'static str {
    match class {
        ColumnClass::NotActive => "",
        ColumnClass::ActiveAscending => " ▲",
        ColumnClass::ActiveDescending => " ▼",
    }
}

/// Renders `series` as a row of block characters, `width` cells wide.
///
/// Longer series are resampled by averaging buckets, shorter series use one
/// cell per sample. A flat series is drawn at the lowest level.
pub fn sparkline_text(series: &[f64], width: usize) -> String {
    let samples: Vec<f64> = series.iter().copied().filter(|v| v.is_finite()).collect();
    if samples.is_empty() || width == 0 {
        return String::new();
    }

    let buckets = resample(&samples, width);
    let min = buckets.iter().copied().fold(f64::INFINITY, f64::min);
    let max = buckets.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    buckets
        .iter()
        .map(|&v| {
            let level = if span > 0.0 {
                (((v - min) / span) * (SPARK_LEVELS.len() - 1) as f64).round() as usize
            } else {
                0
            };
            SPARK_LEVELS[level.min(SPARK_LEVELS.len() - 1)]
        })
        .collect()
}

fn resample(samples: &[f64], width: usize) -> Vec<f64> {
    if samples.len() <= width {
        return samples.to_vec();
    }
    (0..width)
        .map(|bucket| {
            let begin = bucket * samples.len() / width;
            let end = ((bucket + 1) * samples.len() / width).max(begin + 1);
            let chunk = &samples[begin..end];
            chunk.iter().sum::<f64>() / chunk.len() as f64
        })
        .collect()
}

/// Scales a series to integers for ratatui's `Sparkline` widget.
pub fn sparkline_bars(series: &[f64]) -> Vec<u64> {
    let min = series
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::INFINITY, f64::min);
    if !min.is_finite() {
        return Vec::new();
    }
    series
        .iter()
        .map(|v| {
            if v.is_finite() {
                ((v - min) * 1000.0).round() as u64 + 1
            } else {
                0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_change_is_a_loss() {
        assert_eq!(change_tone(0.01), Tone::Gain);
        assert_eq!(change_tone(0.0), Tone::Loss);
        assert_eq!(change_tone(-2.0), Tone::Loss);
    }

    #[test]
    fn trend_compares_first_and_last() {
        assert_eq!(trend_tone(&[1.0, 5.0, 2.0]), Tone::Gain);
        assert_eq!(trend_tone(&[3.0, 5.0, 2.0]), Tone::Loss);
        assert_eq!(trend_tone(&[3.0]), Tone::Loss);
        assert_eq!(trend_tone(&[]), Tone::Neutral);
        assert_eq!(Tone::Gain.color(), GAIN_COLOR);
    }

    #[test]
    fn sparkline_spans_all_levels() {
        let line = sparkline_text(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0], 8);
        assert_eq!(line, "▁▂▃▄▅▆▇█");
    }

    #[test]
    fn sparkline_resamples_to_width() {
        let series: Vec<f64> = (0..168).map(|i| i as f64).collect();
        let line = sparkline_text(&series, 12);
        assert_eq!(line.chars().count(), 12);
        assert!(line.starts_with('▁'));
        assert!(line.ends_with('█'));
    }

    #[test]
    fn flat_or_empty_sparklines() {
        assert_eq!(sparkline_text(&[2.0, 2.0, 2.0], 10), "▁▁▁");
        assert_eq!(sparkline_text(&[], 10), "");
        assert_eq!(sparkline_text(&[1.0, 2.0], 0), "");
    }

    #[test]
    fn bars_are_offset_from_minimum() {
        assert_eq!(sparkline_bars(&[1.0, 1.5, 1.0]), vec![1, 501, 1]);
        assert!(sparkline_bars(&[]).is_empty());
    }

    #[test]
    fn indicator_follows_column_class() {
        assert_eq!(sort_indicator(ColumnClass::NotActive), "");
        assert_eq!(sort_indicator(ColumnClass::ActiveAscending), " ▲");
        assert_eq!(sort_indicator(ColumnClass::ActiveDescending), " ▼");
    }
}
