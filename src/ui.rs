use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{
        Block, Cell, Clear, Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState,
        Sparkline, Table, TableState, Wrap,
    },
};

use crate::domain::{CMDMode, TTConfig};
use crate::model::{DetailData, Model, UIData};
use crate::record::Field;
use crate::sort::ColumnClass;
use crate::style::{self, Tone};

pub const CMDLINE_HEIGH: usize = 1;
pub const TABLE_HEADER_HEIGHT: usize = 1;
pub const SCROLLBAR_WIDTH: usize = 1;
pub const COLUMN_WIDTH_MARGIN: usize = 1;

const DETAIL_INFO_HEIGHT: u16 = 10;

#[derive(Debug, Default)]
pub struct TableUI {
    table_state: TableState,
}

impl TableUI {
    pub fn new(_cfg: &TTConfig) -> Self {
        Self::default()
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();
        let [main_area, status_area] = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(CMDLINE_HEIGH as u16),
        ])
        .areas(frame.area());

        match &uidata.detail {
            Some(detail) => Self::render_detail(frame, main_area, detail),
            None => self.render_table(frame, main_area, uidata),
        }
        Self::render_statusline(frame, status_area, uidata);

        if uidata.show_popup {
            Self::render_popup(frame, frame.area(), &uidata.popup_message);
        }
    }

    fn render_table(&mut self, frame: &mut Frame, area: Rect, uidata: &UIData) {
        let [table_area, scrollbar_area] = Layout::horizontal([
            Constraint::Min(0),
            Constraint::Length(SCROLLBAR_WIDTH as u16),
        ])
        .areas(area);

        let header = Row::new(uidata.header.iter().map(|h| {
            let style = match h.class {
                ColumnClass::NotActive => Style::default().bold(),
                ColumnClass::ActiveAscending | ColumnClass::ActiveDescending => {
                    Style::default().bold().fg(Color::Yellow)
                }
            };
            Cell::from(h.label.clone()).style(style)
        }))
        .style(Style::default().bg(Color::DarkGray));

        let rows = uidata.rows.iter().enumerate().map(|(ridx, row)| {
            Row::new(row.iter().enumerate().map(|(cidx, cell)| {
                let mut style = Style::default().fg(cell.tone.color());
                if cell.tone != Tone::Neutral {
                    style = style.add_modifier(Modifier::BOLD);
                }
                if ridx == uidata.selected_row && cidx == uidata.selected_column {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                Cell::from(cell.text.clone()).style(style)
            }))
        });

        let widths = uidata
            .header
            .iter()
            .map(|h| Constraint::Length(h.width as u16));

        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(COLUMN_WIDTH_MARGIN as u16)
            .row_highlight_style(Style::default().bg(Color::Rgb(0x33, 0x41, 0x55)));

        self.table_state.select(if uidata.rows.is_empty() {
            None
        } else {
            Some(uidata.selected_row)
        });
        *self.table_state.offset_mut() = 0;
        frame.render_stateful_widget(table, table_area, &mut self.table_state);

        let mut scrollbar_state = ScrollbarState::new(uidata.nrows).position(uidata.abs_selected_row);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None),
            scrollbar_area,
            &mut scrollbar_state,
        );
    }

    fn render_detail(frame: &mut Frame, area: Rect, detail: &DetailData) {
        let token = &detail.token;
        let block = Block::bordered()
            .title(Line::from(format!(" {} ({}) ", token.name, token.symbol.to_uppercase())).bold())
            .title_bottom(
                Line::from(format!(" {}/{} ", detail.position + 1, detail.total)).centered(),
            );
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [info_area, chart_area] =
            Layout::vertical([Constraint::Length(DETAIL_INFO_HEIGHT), Constraint::Min(3)])
                .areas(inner);

        let mut lines: Vec<Line> = Field::ALL
            .iter()
            .filter(|&&field| field != Field::Sparkline)
            .map(|&field| {
                let tone = token
                    .signed_value(field)
                    .map(style::change_tone)
                    .unwrap_or_default();
                Line::from(vec![
                    Span::raw(format!("{:<12}", Self::detail_label(field))).bold(),
                    Span::styled(token.display(field), Style::default().fg(tone.color())),
                ])
            })
            .collect();
        lines.push(Line::from(vec![
            Span::raw(format!("{:<12}", "Route")).bold(),
            Span::raw(token.route.clone()).underlined(),
        ]));
        frame.render_widget(Paragraph::new(lines), info_area);

        let trend = style::trend_tone(&token.sparkline);
        let sparkline = Sparkline::default()
            .block(Block::bordered().title(format!(" {} ", Field::Sparkline.label())))
            .data(style::sparkline_bars(&token.sparkline))
            .style(Style::default().fg(trend.color()));
        frame.render_widget(sparkline, chart_area);
    }

    fn detail_label(field: Field) -> &'static str {
        match field {
            Field::Id => "Rank",
            Field::Name => "Name",
            Field::PriceChange24h => "24h Change",
            Field::PriceChange7d => "7d Change",
            _ => field.label(),
        }
    }

    fn render_statusline(frame: &mut Frame, area: Rect, uidata: &UIData) {
        if uidata.active_cmdinput {
            let prefix = match uidata.cmd_mode {
                Some(CMDMode::SearchTable) => "/",
                Some(CMDMode::FilterByColumn) => "filter: ",
                None => ":",
            };
            let line = format!("{prefix}{}", uidata.cmdinput.input);
            frame.render_widget(Paragraph::new(line), area);
            let x = area.x as usize + prefix.chars().count() + uidata.cmdinput.cursor_pos;
            frame.set_cursor_position(Position::new(
                std::cmp::min(x, (area.x + area.width).saturating_sub(1) as usize) as u16,
                area.y,
            ));
            return;
        }

        let position = if uidata.nrows > 0 {
            format!(" {}/{} ", uidata.abs_selected_row + 1, uidata.nrows)
        } else {
            String::new()
        };
        let [left_area, right_area] = Layout::horizontal([
            Constraint::Min(0),
            Constraint::Length(position.chars().count() as u16),
        ])
        .areas(area);

        let status = Line::from(vec![
            Span::raw(format!(" {} ", uidata.name)).black().on_yellow(),
            Span::raw(" "),
            Span::raw(uidata.status_message.clone()),
        ]);
        frame.render_widget(Paragraph::new(status), left_area);
        frame.render_widget(
            Paragraph::new(position).alignment(Alignment::Right).reversed(),
            right_area,
        );
    }

    fn render_popup(frame: &mut Frame, area: Rect, message: &str) {
        let area = Self::popup_area(area, 60, 80);
        let popup = Paragraph::new(Text::from(message.to_string()))
            .wrap(Wrap { trim: false })
            .block(
                Block::bordered()
                    .title(Line::from(" Help ").bold().centered())
                    .title_bottom(Line::from(" <Esc> close ").centered()),
            );
        frame.render_widget(Clear, area);
        frame.render_widget(popup, area);
    }

    fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
        let [area] = Layout::vertical([Constraint::Percentage(percent_y)])
            .flex(Flex::Center)
            .areas(area);
        let [area] = Layout::horizontal([Constraint::Percentage(percent_x)])
            .flex(Flex::Center)
            .areas(area);
        area
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Message;
    use crate::record::TrendingToken;
    use ratatui::{Terminal, backend::TestBackend};

    fn rendered(model: &Model, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let mut ui = TableUI::new(&TTConfig::default());
        terminal.draw(|f| ui.draw(model, f)).unwrap();
        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn model() -> Model {
        let mut model = Model::init(&TTConfig::default(), 120, 12);
        model.set_tokens(
            "tokens".into(),
            vec![
                TrendingToken::new(
                    1,
                    "Bitcoin",
                    "btc",
                    67000.0,
                    1.5,
                    -2.0,
                    3.1e10,
                    1.3e12,
                    vec![1.0, 2.0, 3.0],
                ),
                TrendingToken::new(
                    2,
                    "Ethereum",
                    "eth",
                    3500.0,
                    -0.5,
                    4.0,
                    1.5e10,
                    4.2e11,
                    vec![3.0, 2.0, 1.0],
                ),
            ],
        );
        model
    }

    #[test]
    fn renders_header_rows_and_status() {
        let mut model = model();
        model
            .update(Some(Message::SortColumn(Field::Price.index())))
            .unwrap();
        let screen = rendered(&model, 120, 12);
        assert!(screen.contains("Price ▲"));
        assert!(screen.contains("Last 7 days"));
        assert!(screen.contains("$3,500.00"));
        assert!(screen.contains("Sorted by Price ▲"));
        assert!(screen.contains("1/2"));
        // Cheaper token comes first
        assert!(screen.find("Ethereum") < screen.find("Bitcoin"));
    }

    #[test]
    fn renders_detail_view() {
        let mut model = model();
        model.update(Some(Message::Enter)).unwrap();
        let screen = rendered(&model, 120, 24);
        assert!(screen.contains("Bitcoin (BTC)"));
        assert!(screen.contains("/coins/btc"));
        assert!(screen.contains("24h Change"));
    }

    #[test]
    fn renders_help_popup() {
        let mut model = model();
        model.update(Some(Message::Help)).unwrap();
        let screen = rendered(&model, 120, 40);
        assert!(screen.contains("Help"));
        assert!(screen.contains("sort by selected column"));
    }
}
