//! Interactive prediction form.
//!
//! One bounded numeric input per chemical measurement, an explicit predict
//! action, and rendered output: the predicted cultivar, one probability bar
//! per class, and a summary of the raw inputs. The whole form is a
//! single-threaded draw/input loop; the only shared state is the read-only
//! model bundle inside the classifier.

use std::io;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph},
    Frame, Terminal,
};

use crate::classifier::{Classifier, FeatureSample, Prediction};
use crate::features::{FeatureSpec, FEATURE_SPECS};

/// Multiplier for the coarse PageUp/PageDown adjustment.
const COARSE_STEP: f64 = 10.0;

/// Application state
struct App {
    classifier: Classifier,
    /// Current input values, aligned with `FEATURE_SPECS`
    values: [f64; FEATURE_SPECS.len()],
    /// Index of the focused input
    selected: usize,
    /// Result of the most recent predict action
    prediction: Option<Prediction>,
    /// Error message to display
    error_message: Option<String>,
    /// Should quit
    should_quit: bool,
}

impl App {
    fn new(classifier: Classifier) -> Self {
        let mut values = [0.0; FEATURE_SPECS.len()];
        for (value, spec) in values.iter_mut().zip(FEATURE_SPECS.iter()) {
            *value = spec.default;
        }
        Self {
            classifier,
            values,
            selected: 0,
            prediction: None,
            error_message: None,
            should_quit: false,
        }
    }

    fn select_next(&mut self) {
        self.selected = (self.selected + 1) % FEATURE_SPECS.len();
    }

    fn select_prev(&mut self) {
        self.selected = if self.selected == 0 {
            FEATURE_SPECS.len() - 1
        } else {
            self.selected - 1
        };
    }

    /// Adjusts the focused input by `multiplier` steps, clamped to its range.
    fn adjust(&mut self, multiplier: f64) {
        let spec = &FEATURE_SPECS[self.selected];
        let adjusted = self.values[self.selected] + spec.step * multiplier;
        // Snap away float drift so repeated steps land on round values.
        let snapped = (adjusted / spec.step).round() * spec.step;
        self.values[self.selected] = spec.clamp(snapped);
    }

    fn reset(&mut self) {
        for (value, spec) in self.values.iter_mut().zip(FEATURE_SPECS.iter()) {
            *value = spec.default;
        }
        self.prediction = None;
        self.error_message = None;
    }

    /// Collects the current inputs keyed by feature name.
    ///
    /// The classifier reorders them into the bundle's feature order, so the
    /// form's presentation order never influences the model input.
    fn sample(&self) -> FeatureSample {
        self.values
            .iter()
            .zip(FEATURE_SPECS.iter())
            .map(|(&value, spec)| (spec.name.to_string(), value))
            .collect()
    }

    fn predict(&mut self) {
        match self.classifier.predict(&self.sample()) {
            Ok(prediction) => {
                self.prediction = Some(prediction);
                self.error_message = None;
            }
            Err(e) => {
                log::error!("Prediction failed: {}", e);
                self.error_message = Some(e.to_string());
                self.prediction = None;
            }
        }
    }
}

/// Runs the interactive form until the user quits.
pub fn run(classifier: Classifier) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app and run
    let mut app = App::new(classifier);
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    res
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
                        KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => app.select_next(),
                        KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => app.select_prev(),
                        KeyCode::Left | KeyCode::Char('h') => app.adjust(-1.0),
                        KeyCode::Right | KeyCode::Char('l') => app.adjust(1.0),
                        KeyCode::PageDown => app.adjust(-COARSE_STEP),
                        KeyCode::PageUp => app.adjust(COARSE_STEP),
                        KeyCode::Char('r') => app.reset(),
                        KeyCode::Enter => app.predict(),
                        _ => {}
                    }
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(f: &mut Frame<'_>, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    render_title(f, chunks[0]);

    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(64), Constraint::Min(0)])
        .split(chunks[1]);

    render_inputs(f, content[0], app);
    render_results(f, content[1], app);
    render_status(f, chunks[2], app);
}

fn render_title(f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Red))
        .title(Span::styled(
            " Wine Cultivar Origin Prediction ",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ));
    let subtitle = Paragraph::new("Predict wine cultivar from chemical properties").block(block);
    f.render_widget(subtitle, area);
}

fn format_value(spec: &FeatureSpec, value: f64) -> String {
    if spec.step >= 1.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

fn feature_item(app: &App, index: usize) -> ListItem<'static> {
    let spec = &FEATURE_SPECS[index];
    let focused = index == app.selected;
    let marker = if focused { "> " } else { "  " };
    let label_style = if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    ListItem::new(vec![
        Line::from(vec![
            Span::raw(marker),
            Span::styled(spec.display_label(), label_style),
        ]),
        Line::from(vec![
            Span::raw("    "),
            Span::styled(
                format!("{:>7}", format_value(spec, app.values[index])),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(
                format!(
                    "  [{} - {}]",
                    format_value(spec, spec.min),
                    format_value(spec, spec.max)
                ),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
    ])
}

fn render_inputs(f: &mut Frame<'_>, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Chemical Properties ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    // Two side-by-side columns of three, mirroring the original page layout.
    // Focus navigation runs down the left column, then the right.
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    let split = FEATURE_SPECS.len() / 2;
    let left: Vec<ListItem<'_>> = (0..split).map(|index| feature_item(app, index)).collect();
    let right: Vec<ListItem<'_>> = (split..FEATURE_SPECS.len())
        .map(|index| feature_item(app, index))
        .collect();
    f.render_widget(List::new(left), columns[0]);
    f.render_widget(List::new(right), columns[1]);
}

fn render_results(f: &mut Frame<'_>, area: Rect, app: &App) {
    if let Some(message) = &app.error_message {
        let error = Paragraph::new(Line::from(Span::styled(
            message.as_str(),
            Style::default().fg(Color::Red),
        )))
        .block(Block::default().borders(Borders::ALL).title(" Error "));
        f.render_widget(error, area);
        return;
    }

    let Some(prediction) = &app.prediction else {
        render_about(f, area, app);
        return;
    };

    let class_count = app.classifier.target_names().len() as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                   // Predicted label
            Constraint::Length(class_count * 2 + 2), // Confidence bars
            Constraint::Length(class_count + 2),     // Detailed listing
            Constraint::Min(0),                      // Input summary
        ])
        .split(area);

    let predicted = Paragraph::new(Line::from(vec![
        Span::raw("The wine sample is predicted to be from: "),
        Span::styled(
            prediction.label.as_str(),
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Prediction Result "),
    );
    f.render_widget(predicted, chunks[0]);

    render_confidence(f, chunks[1], app, prediction);
    render_confidence_detail(f, chunks[2], app, prediction);
    render_input_summary(f, chunks[3], app);
}

/// Textual per-class percentages under the bars.
fn render_confidence_detail(f: &mut Frame<'_>, area: Rect, app: &App, prediction: &Prediction) {
    let lines: Vec<Line<'_>> = app
        .classifier
        .target_names()
        .iter()
        .zip(prediction.probabilities.iter())
        .map(|(name, &probability)| {
            let winning = *name == prediction.label;
            Line::from(vec![
                Span::styled(
                    format!("{}: ", name),
                    if winning {
                        Style::default().add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    },
                ),
                Span::raw(format!("{:.2}%", probability * 100.0)),
            ])
        })
        .collect();

    let detail = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Detailed Confidence "),
    );
    f.render_widget(detail, area);
}

fn render_confidence(f: &mut Frame<'_>, area: Rect, app: &App, prediction: &Prediction) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Confidence Scores ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let target_names = app.classifier.target_names();
    let constraints = vec![Constraint::Length(2); target_names.len()];
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for ((name, &probability), row) in target_names
        .iter()
        .zip(prediction.probabilities.iter())
        .zip(rows.iter())
    {
        let winning = *name == prediction.label;
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(if winning { Color::Red } else { Color::DarkGray }))
            .ratio(probability.clamp(0.0, 1.0))
            .label(format!("{}: {:.2}%", name, probability * 100.0));
        f.render_widget(gauge, *row);
    }
}

fn render_input_summary(f: &mut Frame<'_>, area: Rect, app: &App) {
    let lines: Vec<Line<'_>> = FEATURE_SPECS
        .iter()
        .zip(app.values.iter())
        .map(|(spec, &value)| {
            Line::from(vec![
                Span::raw(format!("{:<22}", spec.display_label())),
                Span::styled(
                    format_value(spec, value),
                    Style::default().fg(Color::Cyan),
                ),
            ])
        })
        .collect();

    let summary = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Input Summary "),
    );
    f.render_widget(summary, area);
}

/// Sidebar-style panel shown until the first prediction.
fn render_about(f: &mut Frame<'_>, area: Rect, app: &App) {
    let info = app.classifier.info();
    let mut lines = vec![
        Line::from(Span::styled(
            "About",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!(
            "A {} classifier predicts the wine's cultivar from {} chemical properties.",
            info.algorithm, info.num_features
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Model Info",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("Algorithm: {}", info.algorithm)),
        Line::from(format!("Trees: {}", info.num_trees)),
        Line::from(format!("Features: {}", info.num_features)),
        Line::from(format!("Classes: {}", info.num_classes)),
        Line::from(""),
        Line::from(Span::styled(
            "Features",
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];
    for (index, name) in info.feature_names.iter().enumerate() {
        lines.push(Line::from(format!("{}. {}", index + 1, name)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Instructions",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from("1. Adjust the chemical properties"));
    lines.push(Line::from("2. Press Enter to predict the cultivar"));
    lines.push(Line::from("3. Review the confidence scores"));

    let about = Paragraph::new(lines)
        .wrap(ratatui::widgets::Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Info "));
    f.render_widget(about, area);
}

fn render_status(f: &mut Frame<'_>, area: Rect, app: &App) {
    let spec = &FEATURE_SPECS[app.selected];
    let status = Line::from(vec![
        Span::styled(
            format!(" {} ", spec.display_label()),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw("| \u{2190}/\u{2192} adjust | PgUp/PgDn coarse | \u{2191}/\u{2193} field | Enter predict | r reset | q quit"),
    ]);
    f.render_widget(Paragraph::new(status), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::test_bundle;
    use std::sync::Arc;

    fn test_app() -> App {
        App::new(Classifier::from_bundle(Arc::new(test_bundle())))
    }

    #[test]
    fn test_initial_values_are_defaults() {
        let app = test_app();
        for (value, spec) in app.values.iter().zip(FEATURE_SPECS.iter()) {
            assert_eq!(*value, spec.default);
        }
    }

    #[test]
    fn test_adjust_clamps_at_range_edges() {
        let mut app = test_app();
        app.selected = 0; // alcohol, 11.0..15.0
        for _ in 0..100 {
            app.adjust(1.0);
        }
        assert_eq!(app.values[0], 15.0);
        for _ in 0..100 {
            app.adjust(-1.0);
        }
        assert_eq!(app.values[0], 11.0);
    }

    #[test]
    fn test_adjust_snaps_to_step() {
        let mut app = test_app();
        app.selected = 5; // proline, step 10
        app.adjust(1.0);
        assert_eq!(app.values[5], 760.0);
        app.adjust(-COARSE_STEP);
        assert_eq!(app.values[5], 660.0);
    }

    #[test]
    fn test_selection_wraps() {
        let mut app = test_app();
        app.selected = FEATURE_SPECS.len() - 1;
        app.select_next();
        assert_eq!(app.selected, 0);
        app.select_prev();
        assert_eq!(app.selected, FEATURE_SPECS.len() - 1);
    }

    #[test]
    fn test_sample_uses_feature_names() {
        let app = test_app();
        let sample = app.sample();
        for spec in &FEATURE_SPECS {
            assert_eq!(sample[spec.name], spec.default);
        }
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut app = test_app();
        app.selected = 2;
        app.adjust(5.0);
        app.reset();
        assert_eq!(app.values[2], FEATURE_SPECS[2].default);
        assert!(app.prediction.is_none());
    }

    fn render_to_lines(app: &App, width: u16, height: u16) -> Vec<String> {
        let backend = ratatui::backend::TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect()
    }

    #[test]
    fn test_inputs_render_in_two_columns() {
        let app = test_app();
        let lines = render_to_lines(&app, 120, 40);
        // Column pairs share a row: alcohol/flavanoids, malic/color,
        // phenols/proline.
        for (left, right) in [
            ("Alcohol", "Flavanoids"),
            ("Malic Acid", "Color Intensity"),
            ("Total Phenols", "Proline"),
        ] {
            assert!(
                lines
                    .iter()
                    .any(|line| line.contains(left) && line.contains(right)),
                "'{}' and '{}' should render on the same row",
                left,
                right
            );
        }
    }

    #[test]
    fn test_prediction_renders_bars_and_detailed_listing() {
        let mut app = test_app();
        app.predict();
        assert!(app.prediction.is_some());

        let lines = render_to_lines(&app, 120, 40);
        assert!(lines.iter().any(|line| line.contains("Detailed Confidence")));
        // Each class percentage appears twice: once in its gauge label and
        // once in the textual listing below the bars.
        for name in app.classifier.target_names() {
            let occurrences = lines
                .iter()
                .filter(|line| line.contains(&format!("{}:", name)))
                .count();
            assert!(
                occurrences >= 2,
                "'{}' should appear in both the gauge and the listing, found {}",
                name,
                occurrences
            );
        }
    }
}
