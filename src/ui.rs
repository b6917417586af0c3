use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use tapr::metrics::TimeSeriesPoint;
use tapr::session::{Phase, Verdict};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.session.phase() {
            Phase::Inactive => render_welcome(area, buf),
            Phase::Active => render_typing(self, area, buf),
            Phase::Complete => render_results(self, area, buf),
        }
    }
}

fn render_welcome(area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height / 2),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    let title = Paragraph::new(Span::styled(
        "tapr",
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center);
    title.render(chunks[1], buf);

    let hint = Paragraph::new(Span::styled(
        "press (enter) to start a test, (esc) to quit",
        Style::default()
            .add_modifier(Modifier::ITALIC)
            .add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center);
    hint.render(chunks[2], buf);
}

fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);
    let underlined_dim_bold_style = Style::default()
        .patch(dim_bold_style)
        .add_modifier(Modifier::UNDERLINED);

    let model = app.session.render_model();

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let prompt_width = app.session.text().width();
    let prompt_occupied_lines = if prompt_width <= max_chars_per_line as usize {
        1
    } else {
        ((prompt_width as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(
                (area.height.saturating_sub(prompt_occupied_lines) as f64 / 2.0) as u16,
            ),
            Constraint::Length(2),
            Constraint::Length(prompt_occupied_lines),
            Constraint::Min(0),
        ])
        .split(area);

    let stats = Paragraph::new(Span::styled(
        format!(
            "{} wpm   {}% acc   {}s",
            model.metrics.wpm, model.metrics.accuracy, model.elapsed_secs
        ),
        dim_bold_style,
    ))
    .alignment(Alignment::Center);
    stats.render(chunks[1], buf);

    let spans = app
        .session
        .reference()
        .iter()
        .zip(model.verdicts.iter())
        .map(|(&c, verdict)| match verdict {
            Verdict::Correct => Span::styled(c.to_string(), green_bold_style),
            Verdict::Incorrect => Span::styled(
                match c {
                    ' ' => "·".to_owned(),
                    other => other.to_string(),
                },
                red_bold_style,
            ),
            Verdict::Current => Span::styled(c.to_string(), underlined_dim_bold_style),
            Verdict::Untouched => Span::styled(c.to_string(), dim_bold_style),
        })
        .collect::<Vec<Span>>();

    let prompt = Paragraph::new(Line::from(spans))
        .alignment(if prompt_occupied_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true });

    prompt.render(chunks[2], buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let summary = match app.session.completion() {
        Some(summary) => summary,
        None => return,
    };

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);
    let magenta_style = Style::default().fg(Color::Magenta);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),    // wpm chart
            Constraint::Length(1), // stats
            Constraint::Length(1), // completion message
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    let (overall_duration, highest_wpm) = chart_params(&summary.wpm_series);

    let coords: Vec<(f64, f64)> = summary.wpm_series.iter().map(|p| (p.secs, p.wpm)).collect();
    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(magenta_style)
        .graph_type(GraphType::Line)
        .data(&coords)];

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([1.0, overall_duration])
                .labels(vec![
                    Span::styled("1", bold_style),
                    Span::styled(axis_label(overall_duration), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, highest_wpm])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(axis_label(highest_wpm), bold_style),
                ]),
        );
    chart.render(chunks[0], buf);

    let stats = Paragraph::new(Span::styled(
        format!(
            "{} wpm   {}% acc   {:.2} sd   {}s",
            summary.metrics.wpm,
            summary.metrics.accuracy,
            summary.std_dev,
            summary.elapsed.as_secs()
        ),
        bold_style,
    ))
    .alignment(Alignment::Center);
    stats.render(chunks[1], buf);

    let message = match summary.tier {
        Some(tier) => format!("Test complete! {tier}"),
        None => "Test complete!".to_owned(),
    };
    let message = Paragraph::new(Span::styled(
        message,
        Style::default().fg(Color::Cyan).patch(italic_style),
    ))
    .alignment(Alignment::Center);
    message.render(chunks[2], buf);

    let legend = Paragraph::new(Span::styled(
        "(r)etry / (n)ew / (esc)ape",
        italic_style,
    ));
    legend.render(chunks[4], buf);
}

/// X (seconds) and Y (wpm) bounds for the results chart.
fn chart_params(series: &[TimeSeriesPoint]) -> (f64, f64) {
    let highest_wpm = series.iter().map(|p| p.wpm).fold(0.0, f64::max);
    let overall_duration = series.last().map_or(1.0, |p| p.secs).max(1.0);

    (overall_duration, highest_wpm.round())
}

fn axis_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
