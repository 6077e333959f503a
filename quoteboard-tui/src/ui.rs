use chrono::Local;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
};
use quoteboard_core::model::{CarrierOffer, MetricsReport, QuoteRecord};

use crate::app::{App, FormField, Screen};

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    // Title / header
    let header = Paragraph::new(format!(
        "quoteboard – shipping quotes via {}",
        app.service.provider().name
    ))
    .block(Block::default().borders(Borders::ALL).title("Quoteboard"));
    frame.render_widget(header, *header_area);

    // Main screen
    match app.screen {
        Screen::Shipment => draw_shipment_form(frame, app, *content_area),
        Screen::Offers => draw_offers(frame, app, *content_area),
        Screen::Metrics => draw_metrics(frame, app, *content_area),
    }

    // Status bar
    let nav_hint = match app.screen {
        Screen::Shipment => {
            "↑/↓ field · type to edit · Ctrl-A add volume · Ctrl-X clear volumes · Enter quote · → offers · Tab metrics · Esc/Ctrl-C quit"
        }
        Screen::Offers => "Esc/←/b back to shipment · Tab/m metrics · q/Ctrl-C quit",
        Screen::Metrics => {
            "+/- window · 0 all quotes · r refresh · Esc/←/b back · q/Ctrl-C quit"
        }
    };

    let status_text = if app.is_loading {
        format!("Loading… · {nav_hint}")
    } else if let Some(msg) = &app.error_message {
        format!("{msg} · {nav_hint}")
    } else {
        nav_hint.to_owned()
    };

    let status_style = if app.error_message.is_some() {
        Style::default().fg(Color::Red)
    } else if app.is_loading {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn draw_shipment_form(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [form_area, volumes_area] = chunks else {
        return;
    };

    let focused = app.focused_field();
    let items = FormField::ALL
        .iter()
        .map(|field| {
            let prefix = if *field == focused { "> " } else { "  " };
            ListItem::new(format!(
                "{prefix}{:<20}{}",
                field.label(),
                app.form.value(*field)
            ))
        })
        .collect::<Vec<ListItem<'_>>>();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Shipment (↑/↓ to move, Enter to quote)"),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    state.select(Some(app.field_index));
    frame.render_stateful_widget(list, *form_area, &mut state);

    let volume_items = if app.form.volumes.is_empty() {
        vec![ListItem::new(
            "No volumes added. Enter quotes the volume being edited.",
        )]
    } else {
        app.form
            .volumes
            .iter()
            .enumerate()
            .map(|(idx, volume)| {
                ListItem::new(format!(
                    "{}. {} ×{} · cat {} · {:.2} kg · {:.2} · {}×{}×{} m",
                    idx + 1,
                    volume.sku,
                    volume.amount,
                    volume.category,
                    volume.unitary_weight,
                    volume.price,
                    volume.height,
                    volume.width,
                    volume.length
                ))
            })
            .collect()
    };

    let volumes = List::new(volume_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Volumes ({})", app.form.volumes.len())),
    );
    frame.render_widget(volumes, *volumes_area);
}

fn draw_offers(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(record) = app.last_quote.as_ref() else {
        let paragraph = Paragraph::new("No quote yet. Fill in the shipment and press Enter.")
            .block(Block::default().borders(Borders::ALL).title("Offers"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    };

    let title = format!(
        "Offers for quote {} at {} (Esc/←/b to go back)",
        record.id,
        record.created_at.with_timezone(&Local).format("%d.%m.%Y %H:%M:%S")
    );

    if record.carriers.is_empty() {
        let paragraph = Paragraph::new("The provider returned no offers for this shipment.")
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let cheapest = record
        .carriers
        .iter()
        .map(|offer| offer.price)
        .reduce(f64::min);

    let rows = record.carriers.iter().map(|offer| {
        let mut style = Style::default();
        if Some(offer.price) == cheapest {
            style = style.fg(Color::Green).add_modifier(Modifier::BOLD);
        }
        Row::new(offer_cells(offer)).style(style)
    });

    let column_widths = [
        Constraint::Min(20),
        Constraint::Length(16),
        Constraint::Length(10),
        Constraint::Length(12),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["Carrier", "Service", "Deadline", "Price"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .column_spacing(1);

    frame.render_widget(table, area);
}

fn offer_cells(offer: &CarrierOffer) -> Vec<Cell<'_>> {
    vec![
        Cell::from(offer.name.as_str()),
        Cell::from(offer.service.as_str()),
        Cell::from(deadline_label(&offer.deadline)),
        Cell::from(format!("{:>10.2}", offer.price)),
    ]
}

fn draw_metrics(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [report_area, recent_area] = chunks else {
        return;
    };

    let title = format!("Carrier metrics over {}", app.window_label());

    match app.report.as_ref() {
        None => {
            let text = if app.is_loading {
                "Loading metrics…"
            } else {
                "No metrics loaded yet. Press r to refresh."
            };
            let paragraph = Paragraph::new(text)
                .block(Block::default().borders(Borders::ALL).title(title))
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, *report_area);
        }
        Some(report) => draw_report(frame, report, title, *report_area),
    }

    draw_recent_quotes(frame, &app.recent_quotes, *recent_area);
}

fn draw_report(frame: &mut Frame<'_>, report: &MetricsReport, title: String, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(4)])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [table_area, extremes_area] = chunks else {
        return;
    };

    let rows = report.carrier_metrics.iter().map(|metrics| {
        Row::new(vec![
            Cell::from(metrics.carrier_name.as_str()),
            Cell::from(metrics.total_quotes.to_string()),
            Cell::from(format!("{:>12.2}", metrics.total_shipping_price)),
            Cell::from(format!("{:>10.2}", metrics.average_shipping_price)),
        ])
    });

    let column_widths = [
        Constraint::Min(20),
        Constraint::Length(8),
        Constraint::Length(14),
        Constraint::Length(12),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["Carrier", "Quotes", "Total", "Average"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .column_spacing(1);

    frame.render_widget(table, *table_area);

    let extremes = report.cheapest_and_most_expensive;
    let summary = Paragraph::new(vec![
        Line::from(format!("Cheapest shipping:       {:.2}", extremes.cheapest_shipping))
            .style(Style::default().fg(Color::Green)),
        Line::from(format!(
            "Most expensive shipping: {:.2}",
            extremes.most_expensive_shipping
        ))
        .style(Style::default().fg(Color::Red)),
    ])
    .block(Block::default().borders(Borders::ALL).title("Extremes"));

    frame.render_widget(summary, *extremes_area);
}

fn draw_recent_quotes(frame: &mut Frame<'_>, quotes: &[QuoteRecord], area: Rect) {
    let items = if quotes.is_empty() {
        vec![ListItem::new("No quotes in the window.")]
    } else {
        quotes
            .iter()
            .map(|record| {
                let cheapest = record
                    .carriers
                    .iter()
                    .map(|offer| offer.price)
                    .reduce(f64::min)
                    .map_or_else(|| "-".to_owned(), |price| format!("{price:.2}"));
                ListItem::new(format!(
                    "{} · {} offers · from {cheapest}",
                    record.created_at.with_timezone(&Local).format("%d.%m %H:%M:%S"),
                    record.carriers.len()
                ))
            })
            .collect()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Recent quotes ({})", quotes.len())),
    );
    frame.render_widget(list, area);
}

fn deadline_label(deadline: &str) -> String {
    match deadline.parse::<i64>() {
        Ok(0) => "same day".to_owned(),
        Ok(1) => "1 day".to_owned(),
        Ok(days) => format!("{days} days"),
        Err(_) => deadline.to_owned(),
    }
}
