use super::app::{App, Page};
use crate::format::{format_amount, format_millions, group_thousands};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, List, ListItem, ListState, Paragraph},
};

const SIDEBAR_WIDTH: u16 = 30;

/// One horizontal bar: label, length, text drawn on the bar
struct BarRow {
    label: String,
    value: u64,
    text: String,
}

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header (single line, no border)
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Footer (single line, no border)
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    let body = Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(40)])
        .split(chunks[1]);
    render_sidebar(frame, app, body[0]);
    match app.page {
        Page::Customers => render_customers_page(frame, app, body[1]),
        Page::States => render_states_page(frame, app, body[1]),
    }

    render_footer(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    // Split header: left (status) | right (tabs)
    let chunks = Layout::horizontal([
        Constraint::Min(40),
        Constraint::Length(21), // "[Customers] [States]"
    ])
    .split(area);

    let view = app.view();
    let range = match view.range {
        Some(r) => format!("{} .. {}", r.start, r.end),
        None => "no transactions".to_string(),
    };
    let file_name = app.file_name().unwrap_or_else(|| "dataset".to_string());

    let header = Line::from(vec![
        Span::styled(
            "shopdash",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(" E-COMMERCE ", Style::default().bg(Color::Blue).fg(Color::White)),
        Span::raw(format!(
            " {} │ {} │ {}",
            file_name,
            range,
            view.segments.describe()
        )),
    ]);
    frame.render_widget(Paragraph::new(header), chunks[0]);

    let active_style = Style::default().bg(Color::Cyan).fg(Color::Black);
    let inactive_style = Style::default().fg(Color::DarkGray);
    let style_for = |page: Page| {
        if app.page == page {
            active_style
        } else {
            inactive_style
        }
    };
    let tabs = Line::from(vec![
        Span::styled("[Customers]", style_for(Page::Customers)),
        Span::raw(" "),
        Span::styled("[States]", style_for(Page::States)),
    ]);
    frame.render_widget(Paragraph::new(tabs), chunks[1]);
}

fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([Constraint::Length(5), Constraint::Min(3)]).split(area);

    // Date pickers
    let view = app.view();
    let dates = match view.range {
        Some(r) => vec![
            Line::from(vec![
                Span::styled("Start ", Style::default().fg(Color::DarkGray)),
                Span::raw(r.start.to_string()),
            ]),
            Line::from(vec![
                Span::styled("End   ", Style::default().fg(Color::DarkGray)),
                Span::raw(r.end.to_string()),
            ]),
            Line::from(vec![
                Span::styled("Days  ", Style::default().fg(Color::DarkGray)),
                Span::raw(r.days().to_string()),
            ]),
        ],
        None => vec![Line::from(Span::styled(
            "No purchase dates",
            Style::default().fg(Color::DarkGray),
        ))],
    };
    let block = Block::default()
        .title(" Purchase dates ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(Paragraph::new(dates).block(block), chunks[0]);

    // Segment multi-select
    let items: Vec<ListItem> = app
        .labels()
        .iter()
        .map(|label| {
            let mark = if app.is_checked(label) { "[x]" } else { "[ ]" };
            ListItem::new(format!("{} {}", mark, label))
        })
        .collect();
    let block = Block::default()
        .title(" Segments ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if items.is_empty() {
        let text = Paragraph::new(Span::styled(
            "No segments",
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        frame.render_widget(text, chunks[1]);
        return;
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));
    let mut state = ListState::default().with_selected(Some(app.cursor()));
    frame.render_stateful_widget(list, chunks[1], &mut state);
}

fn render_customers_page(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([Constraint::Length(3), Constraint::Min(6)]).split(area);
    let view = app.view();
    let summary = &view.summary;

    let cards = Layout::horizontal([
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ])
    .split(chunks[0]);
    render_metric(
        frame,
        "Customers",
        group_thousands(summary.distinct_customers as u64),
        cards[0],
    );
    render_metric(frame, "Revenue", format_amount(summary.total_monetary), cards[1]);
    render_metric(
        frame,
        "Segments",
        summary.distinct_segments.to_string(),
        cards[2],
    );

    let charts = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    let counts: Vec<BarRow> = view
        .segment_counts
        .iter()
        .map(|c| BarRow {
            label: c.segment.clone(),
            value: c.customers as u64,
            text: group_thousands(c.customers as u64),
        })
        .collect();
    render_bar_chart(frame, "Customers per segment", &counts, Color::Cyan, charts[0]);

    let revenue: Vec<BarRow> = view
        .segment_revenue
        .iter()
        .map(|r| BarRow {
            label: r.segment.clone(),
            value: bar_value(r.revenue),
            text: format_millions(r.revenue),
        })
        .collect();
    render_bar_chart(frame, "Revenue per segment", &revenue, Color::Green, charts[1]);
}

fn render_states_page(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let view = app.view();

    let customers: Vec<BarRow> = view
        .top_states_by_customers
        .iter()
        .map(|s| BarRow {
            label: s.state.clone(),
            value: s.customers as u64,
            text: group_thousands(s.customers as u64),
        })
        .collect();
    let title = format!("Top {} states by customers", view.top_states_by_customers.len());
    render_bar_chart(frame, &title, &customers, Color::Cyan, chunks[0]);

    let revenue: Vec<BarRow> = view
        .top_states_by_revenue
        .iter()
        .map(|s| BarRow {
            label: s.state.clone(),
            value: bar_value(s.revenue),
            text: format_millions(s.revenue),
        })
        .collect();
    let title = format!("Top {} states by revenue", view.top_states_by_revenue.len());
    render_bar_chart(frame, &title, &revenue, Color::Green, chunks[1]);
}

fn render_metric(frame: &mut Frame, title: &str, value: String, area: Rect) {
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let text = Paragraph::new(Span::styled(
        value,
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    ))
    .block(block);
    frame.render_widget(text, area);
}

fn render_bar_chart(frame: &mut Frame, title: &str, rows: &[BarRow], color: Color, area: Rect) {
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    if rows.is_empty() {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "No data for this filter",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        frame.render_widget(Paragraph::new(text).block(block), area);
        return;
    }

    let bars: Vec<Bar> = rows
        .iter()
        .map(|row| {
            Bar::default()
                .label(Line::from(row.label.clone()))
                .value(row.value)
                .text_value(row.text.clone())
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(Color::Black).bg(color))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}

/// Bars are integral; revenue is never negative by data contract
fn bar_value(amount: f64) -> u64 {
    amount.max(0.0).round() as u64
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(warning) = &app.view().warning {
        let line = Line::from(vec![
            Span::styled(" ! ", Style::default().bg(Color::Yellow).fg(Color::Black)),
            Span::styled(format!(" {} ", warning), Style::default().fg(Color::Yellow)),
            Span::styled(" r ", Style::default().bg(Color::DarkGray)),
            Span::raw(" reset "),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let keys = [
        (" q ", " quit "),
        (" 1/2 ", " page "),
        (" j/k ", " segment "),
        (" space ", " toggle "),
        (" a/n ", " all/none "),
        (" [ ] ", " start "),
        (" { } ", " end "),
        (" r ", " reset "),
    ];
    let spans: Vec<Span> = keys
        .iter()
        .flat_map(|(key, label)| {
            [
                Span::styled(*key, Style::default().bg(Color::DarkGray)),
                Span::raw(*label),
            ]
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
