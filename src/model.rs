use arboard::Clipboard;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, trace};

use crate::domain::{CMDMode, HELP_TEXT, Message, TTConfig, TTError};
use crate::inputter::{InputResult, Inputter};
use crate::loader;
use crate::record::{Field, TrendingToken};
use crate::sort::{ColumnClass, SortManager};
use crate::style::{self, Tone};
use crate::ui::{CMDLINE_HEIGH, COLUMN_WIDTH_MARGIN, SCROLLBAR_WIDTH, TABLE_HEADER_HEIGHT};

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    DETAIL,
    POPUP,
    CMDINPUT,
}

/// One table on the view stack: the loaded tokens or a filter of them.
///
/// Every view owns its own sort state. A filtered view starts unsorted, with
/// the rows in the order its parent showed them.
struct TokenView {
    name: String,
    sorter: SortManager<Arc<TrendingToken>>,
    column_widths: Vec<usize>, // Render width of every field, in Field::ALL order
    visible_columns: Vec<usize>,
    cursor_row: usize,
    cursor_column: usize, // Field index, not relative to the visible columns
    offset_row: usize,
    offset_column: usize,
    search_results: Vec<(usize, usize)>,
    search_idx: usize,
}

impl TokenView {
    fn new(name: String, tokens: Vec<Arc<TrendingToken>>, config: &TTConfig) -> Self {
        let mut view = TokenView {
            name,
            sorter: SortManager::new(tokens),
            column_widths: Vec::new(),
            visible_columns: Vec::new(),
            cursor_row: 0,
            cursor_column: 0,
            offset_row: 0,
            offset_column: 0,
            search_results: Vec::new(),
            search_idx: 0,
        };
        view.calculate_column_widths(config);
        view
    }

    fn selected_row(&self) -> usize {
        self.offset_row + self.cursor_row
    }

    fn selected_field(&self) -> Field {
        Field::from_index(self.cursor_column).unwrap_or(Field::Id)
    }

    fn selected_token(&self) -> Option<&Arc<TrendingToken>> {
        self.sorter.get(self.selected_row())
    }

    fn calculate_column_widths(&mut self, config: &TTConfig) {
        self.column_widths = Field::ALL
            .iter()
            .map(|&field| {
                if field == Field::Sparkline {
                    return config.sparkline_width.max(field.label().chars().count());
                }
                // Leave room for the sort indicator
                let header = field.label().chars().count() + 2;
                let content = self
                    .sorter
                    .items()
                    .iter()
                    .map(|t| t.display(field).chars().count())
                    .max()
                    .unwrap_or(0);
                std::cmp::min(std::cmp::max(header, content), config.max_column_width)
            })
            .collect();
    }

    // Moves the cursor to an absolute row, scrolling when it leaves the window.
    fn select_row(&mut self, row: usize, height: usize) {
        let nrows = self.sorter.len();
        if nrows == 0 || height == 0 {
            self.offset_row = 0;
            self.cursor_row = 0;
            return;
        }
        let row = std::cmp::min(row, nrows - 1);
        if row < self.offset_row {
            self.offset_row = row;
        } else if row >= self.offset_row + height {
            self.offset_row = row + 1 - height;
        }
        self.cursor_row = row - self.offset_row;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellView {
    pub text: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderView {
    pub label: String,
    pub class: ColumnClass,
    pub width: usize,
}

#[derive(Debug, Clone)]
pub struct DetailData {
    pub token: Arc<TrendingToken>,
    pub position: usize,
    pub total: usize,
}

/// Everything the UI needs to draw one frame. Rebuilt by the model after each
/// change, the UI never reads the model directly.
pub struct UIData {
    pub name: String,
    pub header: Vec<HeaderView>,
    pub rows: Vec<Vec<CellView>>,
    pub nrows: usize, // Total number of rows in this view
    pub selected_row: usize,
    pub selected_column: usize,
    pub abs_selected_row: usize,
    pub detail: Option<DetailData>,
    pub show_popup: bool,
    pub popup_message: String,
    pub layout: UILayout,
    pub cmdinput: InputResult,
    pub cmd_mode: Option<CMDMode>,
    pub active_cmdinput: bool,
    pub status_message: String,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            name: String::new(),
            header: Vec::new(),
            rows: Vec::new(),
            nrows: 0,
            selected_row: 0,
            selected_column: 0,
            abs_selected_row: 0,
            detail: None,
            show_popup: false,
            popup_message: String::new(),
            layout: UILayout::default(),
            cmdinput: InputResult::default(),
            cmd_mode: None,
            active_cmdinput: false,
            status_message: String::new(),
        }
    }
}

#[derive(Default, Clone, Debug)]
pub struct UILayout {
    pub width: usize,
    pub height: usize,
    pub table_width: usize,
    pub table_height: usize,
}

impl UILayout {
    pub fn from_values(ui_width: usize, ui_height: usize) -> Self {
        let layout = UILayout {
            width: ui_width,
            height: ui_height,
            table_width: ui_width.saturating_sub(SCROLLBAR_WIDTH),
            table_height: ui_height
                .saturating_sub(CMDLINE_HEIGH)
                .saturating_sub(TABLE_HEADER_HEIGHT),
        };
        trace!("Build UILayout: {:?}", layout);
        layout
    }
}

pub struct Model {
    config: TTConfig,
    source: Option<PathBuf>,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    tables: Vec<TokenView>,
    detail_row: usize,
    uilayout: UILayout,
    uidata: UIData,
    clipboard: Option<Clipboard>,
    input: Inputter,
    cmd_mode: Option<CMDMode>,
    last_input: InputResult,
    active_cmdinput: bool,
    status_message: String,
}

impl Model {
    pub fn init(config: &TTConfig, ui_width: usize, ui_height: usize) -> Self {
        let mut model = Self {
            config: config.clone(),
            source: None,
            status: Status::READY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            tables: Vec::new(),
            detail_row: 0,
            uilayout: UILayout::from_values(ui_width, ui_height),
            uidata: UIData::empty(),
            clipboard: None,
            input: Inputter::default(),
            cmd_mode: None,
            last_input: InputResult::default(),
            active_cmdinput: false,
            status_message: String::new(),
        };
        model.update_table_data();
        model.set_status_message("Loading ...");
        model
    }

    pub fn load_data_file(&mut self, path: &Path) -> Result<(), TTError> {
        let start_time = Instant::now();
        let (file_info, tokens) = loader::load_tokens(path)?;
        let name = file_info
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("???")
            .to_string();
        self.source = Some(file_info.path);
        self.set_tokens(name, tokens);
        self.set_status_message(format!(
            "Loaded {} tokens in {}ms ...",
            self.tables.first().map(|t| t.sorter.len()).unwrap_or(0),
            start_time.elapsed().as_millis()
        ));
        Ok(())
    }

    /// Replaces all views with a single, unsorted view of `tokens`.
    pub fn set_tokens(&mut self, name: String, tokens: Vec<TrendingToken>) {
        let tokens = tokens.into_iter().map(Arc::new).collect();
        self.tables = vec![TokenView::new(name, tokens, &self.config)];
        self.modus = Modus::TABLE;
        self.update_table_data();
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn raw_keyevents(&self) -> bool {
        self.active_cmdinput
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), TTError> {
        let Some(msg) = message else {
            return Ok(());
        };
        trace!("Update: Modus {:?}, Message {:?}", self.modus, msg);

        if let Message::Resize(width, height) = msg {
            self.ui_resize(width, height);
            return Ok(());
        }

        match self.modus {
            Modus::TABLE => match msg {
                Message::Quit => self.quit(),
                Message::MoveDown => self.move_table_selection(1),
                Message::MoveUp => self.move_table_selection(-1),
                Message::MovePageDown => {
                    self.move_table_selection(self.uilayout.table_height as isize)
                }
                Message::MovePageUp => {
                    self.move_table_selection(-(self.uilayout.table_height as isize))
                }
                Message::MoveBeginning => self.select_table_row(0),
                Message::MoveEnd => self.select_table_row(usize::MAX),
                Message::MoveLeft => self.move_table_column(-1),
                Message::MoveRight => self.move_table_column(1),
                Message::Sort => {
                    if let Some(field) = self.tables.last().map(|t| t.selected_field()) {
                        self.sort_column(field);
                    }
                }
                Message::SortColumn(idx) => {
                    if let Some(field) = Field::from_index(idx) {
                        self.sort_column(field);
                    }
                }
                Message::Enter => self.open_detail(),
                Message::Exit => self.exit(),
                Message::Help => self.show_help(),
                Message::Search => self.enter_cmd_mode(CMDMode::SearchTable),
                Message::Filter => self.enter_cmd_mode(CMDMode::FilterByColumn),
                Message::SearchNext => self.search_next(1),
                Message::SearchPrev => self.search_next(-1),
                Message::CopyCell => self.copy_table_cell(),
                Message::CopyRow => self.copy_table_row(),
                Message::Reload => self.reload(),
                _ => (),
            },
            Modus::DETAIL => match msg {
                Message::Quit => self.quit(),
                Message::MoveLeft | Message::MoveUp => self.step_detail(-1),
                Message::MoveRight | Message::MoveDown => self.step_detail(1),
                Message::CopyCell => self.copy_detail_route(),
                Message::CopyRow => self.copy_table_row(),
                Message::Help => self.show_help(),
                Message::Exit | Message::Enter => self.exit(),
                _ => (),
            },
            Modus::POPUP => match msg {
                Message::Quit => self.quit(),
                Message::Exit | Message::Help | Message::Enter => self.exit(),
                _ => (),
            },
            Modus::CMDINPUT => {
                if let Message::RawKey(key) = msg {
                    self.raw_input(key)
                }
            }
        }
        Ok(())
    }

    // -------------------- View data ---------------------- //

    fn update_table_data(&mut self) {
        let Some(table) = self.tables.last_mut() else {
            self.uidata = UIData::empty();
            self.uidata.layout = self.uilayout.clone();
            self.uidata.status_message = self.status_message.clone();
            return;
        };

        let height = self.uilayout.table_height;
        table.select_row(table.selected_row(), height);

        // Keep the cursor column inside the window of visible columns
        table.offset_column = std::cmp::min(table.offset_column, table.cursor_column);
        loop {
            table.visible_columns = Self::get_visible_columns(
                &table.column_widths,
                table.offset_column,
                self.uilayout.table_width,
            );
            if table.visible_columns.contains(&table.cursor_column)
                || table.offset_column >= table.cursor_column
            {
                break;
            }
            table.offset_column += 1;
        }

        let rbegin = table.offset_row;
        let rend = std::cmp::min(rbegin + height, table.sorter.len());
        trace!(
            "Table: Cr {}, Cc {}, Or {}, Oc {}, Rb {}, Re {}, visible {:?}",
            table.cursor_row,
            table.cursor_column,
            table.offset_row,
            table.offset_column,
            rbegin,
            rend,
            table.visible_columns
        );

        let fields: Vec<Field> = table
            .visible_columns
            .iter()
            .filter_map(|&idx| Field::from_index(idx))
            .collect();

        let header = fields
            .iter()
            .map(|&field| {
                let class = table.sorter.class_for_column(field);
                HeaderView {
                    label: format!("{}{}", field.label(), style::sort_indicator(class)),
                    class,
                    width: table.column_widths[field.index()],
                }
            })
            .collect();

        let rows = table
            .sorter
            .sorted_items()
            .skip(rbegin)
            .take(rend - rbegin)
            .map(|token| {
                fields
                    .iter()
                    .map(|&field| Self::build_cell(token, field, table.column_widths[field.index()]))
                    .collect()
            })
            .collect();

        self.uidata = UIData {
            name: table.name.clone(),
            header,
            rows,
            nrows: table.sorter.len(),
            selected_row: table.cursor_row,
            selected_column: table
                .visible_columns
                .iter()
                .position(|&c| c == table.cursor_column)
                .unwrap_or(0),
            abs_selected_row: table.selected_row(),
            detail: None,
            show_popup: false,
            popup_message: String::new(),
            layout: self.uilayout.clone(),
            cmdinput: self.last_input.clone(),
            cmd_mode: self.cmd_mode,
            active_cmdinput: self.active_cmdinput,
            status_message: self.status_message.clone(),
        };
    }

    fn build_cell(token: &TrendingToken, field: Field, width: usize) -> CellView {
        match field {
            Field::Sparkline => CellView {
                text: style::sparkline_text(&token.sparkline, width),
                tone: style::trend_tone(&token.sparkline),
            },
            _ => CellView {
                text: Self::get_visible_text(token.display(field), width),
                tone: token
                    .signed_value(field)
                    .map(style::change_tone)
                    .unwrap_or_default(),
            },
        }
    }

    fn get_visible_columns(widths: &[usize], offset: usize, table_width: usize) -> Vec<usize> {
        let mut visible = Vec::new();
        let mut used = 0;
        for (idx, width) in widths.iter().enumerate().skip(offset) {
            if used + width + COLUMN_WIDTH_MARGIN > table_width && !visible.is_empty() {
                break;
            }
            visible.push(idx);
            used += width + COLUMN_WIDTH_MARGIN;
        }
        visible
    }

    fn get_visible_text(text: String, width: usize) -> String {
        if text.chars().count() <= width {
            return text;
        }
        if width < 3 {
            return text.chars().take(width).collect();
        }
        let mut reduced: String = text.chars().take(width - 1).collect();
        reduced.push('…');
        reduced
    }

    fn update_detail_data(&mut self) {
        let Some(table) = self.tables.last() else {
            return;
        };
        self.uidata.detail = table.sorter.get(self.detail_row).map(|token| DetailData {
            token: Arc::clone(token),
            position: self.detail_row,
            total: table.sorter.len(),
        });
        self.uidata.name = format!("D[{}]", table.name);
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.uidata.status_message = self.status_message.clone();
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.uilayout.width, width, self.uilayout.height, height
        );
        self.uilayout = UILayout::from_values(width, height);
        self.update_table_data();
        self.restore_overlay();
    }

    // Re-applies detail / popup / command line state on top of fresh table data.
    fn restore_overlay(&mut self) {
        let modus = if self.modus == Modus::CMDINPUT {
            self.previous_modus
        } else {
            self.modus
        };
        match modus {
            Modus::DETAIL => self.update_detail_data(),
            Modus::POPUP => {
                self.uidata.popup_message = HELP_TEXT.to_string();
                self.uidata.show_popup = true;
            }
            Modus::TABLE | Modus::CMDINPUT => {}
        }
    }

    // -------------------- Control handling functions ---------------------- //

    fn move_table_selection(&mut self, delta: isize) {
        let Some(table) = self.tables.last() else {
            return;
        };
        let row = table.selected_row().saturating_add_signed(delta);
        self.select_table_row(row);
    }

    fn select_table_row(&mut self, row: usize) {
        let height = self.uilayout.table_height;
        if let Some(table) = self.tables.last_mut() {
            table.select_row(row, height);
        }
        self.update_table_data();
    }

    fn move_table_column(&mut self, delta: isize) {
        if let Some(table) = self.tables.last_mut() {
            table.cursor_column = table
                .cursor_column
                .saturating_add_signed(delta)
                .min(Field::ALL.len() - 1);
        }
        self.update_table_data();
    }

    fn sort_column(&mut self, field: Field) {
        let Some(table) = self.tables.last_mut() else {
            return;
        };
        if !field.is_sortable() {
            self.set_status_message(format!("Column \"{}\" can not be sorted", field.label()));
            return;
        }
        table.sorter.request_sort(field);
        table.cursor_column = field.index();
        // Search results refer to row positions that just changed
        table.search_results.clear();
        debug!("Sorted {} by {:?}", table.name, table.sorter.state());

        let indicator = style::sort_indicator(table.sorter.class_for_column(field));
        self.set_status_message(format!("Sorted by {}{}", field.label(), indicator));
        self.update_table_data();
    }

    fn open_detail(&mut self) {
        let Some(table) = self.tables.last() else {
            return;
        };
        if table.sorter.is_empty() {
            return;
        }
        self.detail_row = table.selected_row();
        self.previous_modus = self.modus;
        self.modus = Modus::DETAIL;
        self.update_detail_data();
    }

    fn step_detail(&mut self, delta: isize) {
        let Some(table) = self.tables.last() else {
            return;
        };
        let last = table.sorter.len().saturating_sub(1);
        self.detail_row = self.detail_row.saturating_add_signed(delta).min(last);
        self.update_detail_data();
    }

    fn exit(&mut self) {
        match self.modus {
            Modus::TABLE => {
                // There is no exit from the root table, only quit
                if self.tables.len() > 1 {
                    self.tables.pop();
                    self.update_table_data();
                }
            }
            Modus::DETAIL => {
                self.previous_modus = Modus::DETAIL;
                self.modus = Modus::TABLE;
                // Leave the table cursor on the token last shown
                self.select_table_row(self.detail_row);
            }
            Modus::POPUP => {
                trace!("Close popup ...");
                self.modus = self.previous_modus;
                self.previous_modus = Modus::POPUP;
                self.uidata.show_popup = false;
            }
            Modus::CMDINPUT => {}
        }
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
        self.uidata.popup_message = HELP_TEXT.to_string();
        self.uidata.show_popup = true;
    }

    fn reload(&mut self) {
        let Some(path) = self.source.clone() else {
            self.set_status_message("Nothing to reload");
            return;
        };
        match loader::load_tokens(&path) {
            Ok((_, tokens)) => {
                let count = tokens.len();
                // Filtered views hold stale tokens, drop them
                self.tables.truncate(1);
                if let Some(table) = self.tables.last_mut() {
                    table
                        .sorter
                        .replace_items(tokens.into_iter().map(Arc::new).collect());
                    table.search_results.clear();
                    table.calculate_column_widths(&self.config);
                }
                info!("Reloaded {count} tokens from {path:?}");
                self.set_status_message(format!("Reloaded {count} tokens"));
                self.update_table_data();
            }
            Err(e) => {
                error!("Reloading {path:?} failed: {e:?}");
                self.set_status_message(format!("Reload failed: {e}"));
            }
        }
    }

    // -------------------- Command input ---------------------- //

    fn raw_input(&mut self, key: ratatui::crossterm::event::KeyEvent) {
        if self.active_cmdinput {
            self.last_input = self.input.read(key);
            if self.last_input.finished {
                self.handle_cmd_input();
            }
            self.uidata.cmdinput = self.last_input.clone();
            self.uidata.cmd_mode = self.cmd_mode;
            self.uidata.active_cmdinput = self.active_cmdinput;
        }
    }

    fn enter_cmd_mode(&mut self, mode: CMDMode) {
        trace!("Entering command mode {:?} ...", mode);
        self.previous_modus = self.modus;
        self.modus = Modus::CMDINPUT;
        self.cmd_mode = Some(mode);

        self.active_cmdinput = true;
        self.input.clear();
        self.last_input = self.input.get();

        self.uidata.cmdinput = self.last_input.clone();
        self.uidata.active_cmdinput = self.active_cmdinput;
        self.uidata.cmd_mode = self.cmd_mode;
    }

    fn handle_cmd_input(&mut self) {
        trace!("Handle cmd input {}", self.last_input.input);

        self.active_cmdinput = false;
        self.modus = self.previous_modus;
        self.previous_modus = Modus::CMDINPUT;

        let cmd_mode = self.cmd_mode.take();
        if self.last_input.canceled {
            return;
        }
        let term = self.last_input.input.clone();
        if term.is_empty() {
            return;
        }
        match cmd_mode {
            Some(CMDMode::SearchTable) => self.search(&term),
            Some(CMDMode::FilterByColumn) => self.filter(&term),
            None => info!("Cmd mode is none!"),
        }
    }

    // -------------------- Search & filter ---------------------- //

    // Return row positions of tokens whose text in `field` contains `term`, ignoring case
    fn search_column<'a>(
        term: &str,
        field: Field,
        tokens: impl Iterator<Item = &'a Arc<TrendingToken>>,
    ) -> Vec<usize> {
        let term = term.to_lowercase();
        tokens
            .enumerate()
            .filter(|(_, token)| token.display(field).to_lowercase().contains(&term))
            .map(|(row, _)| row)
            .collect()
    }

    fn search(&mut self, term: &str) {
        trace!("Starting search for {} ...", term);
        let Some(table) = self.tables.last_mut() else {
            return;
        };
        let start_time = Instant::now();

        let sorter = &table.sorter;
        let mut matches: Vec<(usize, usize)> = Field::ALL
            .par_iter()
            .filter(|field| **field != Field::Sparkline)
            .flat_map(|&field| {
                Self::search_column(term, field, sorter.sorted_items())
                    .into_iter()
                    .map(move |row| (row, field.index()))
                    .collect::<Vec<_>>()
            })
            .collect();
        matches.sort_unstable();

        trace!(
            "Search found {} matches in {}ms",
            matches.len(),
            start_time.elapsed().as_millis()
        );

        if matches.is_empty() {
            table.search_results.clear();
            self.set_status_message(format!("Found no matches for \"{term}\""));
            return;
        }

        // Start at the first match at or after the cursor
        let cursor = table.selected_row();
        table.search_idx = matches
            .iter()
            .position(|&(row, _)| row >= cursor)
            .unwrap_or(0);
        table.search_results = matches;
        self.search_next(0);
    }

    // Selects the next search result, step is -1, 0 or 1
    fn search_next(&mut self, step: isize) {
        let Some(table) = self.tables.last_mut() else {
            return;
        };
        let total = table.search_results.len();
        if total == 0 {
            self.set_status_message("No search results");
            return;
        }
        table.search_idx = (table.search_idx as isize + step).rem_euclid(total as isize) as usize;
        let (row, column) = table.search_results[table.search_idx];
        let position = table.search_idx + 1;
        table.cursor_column = column;
        self.select_table_row(row);
        self.set_status_message(format!("Search result {position}/{total}"));
    }

    fn filter(&mut self, term: &str) {
        let Some(table) = self.tables.last() else {
            return;
        };
        let field = table.selected_field();
        let matches = Self::search_column(term, field, table.sorter.sorted_items());
        trace!("Filter {:?} by \"{}\" matched {} rows", field, term, matches.len());

        if matches.is_empty() {
            self.set_status_message(format!("No token matches \"{term}\" in {}", field.label()));
            return;
        }

        let tokens: Vec<Arc<TrendingToken>> = matches
            .iter()
            .filter_map(|&row| table.sorter.get(row).cloned())
            .collect();
        let count = tokens.len();
        let mut view = TokenView::new(format!("F[{}]", table.name), tokens, &self.config);
        view.cursor_column = table.cursor_column;
        self.tables.push(view);
        self.set_status_message(format!("Filtered {count} tokens"));
        self.update_table_data();
    }

    // -------------------- Clipboard ---------------------- //

    fn wrap_cell_content(c: &str) -> String {
        let needs_escaping = c.contains('"');
        let needs_wrapping = c.chars().any(|c| c == ' ' || c == '\t' || c == ',');
        let mut out = String::from(c);

        if needs_escaping {
            out = out.replace('"', "\"\"");
        }
        if needs_wrapping || needs_escaping {
            out = format!("\"{out}\"");
        }
        out
    }

    fn cell_content(token: &TrendingToken, field: Field) -> String {
        match field {
            Field::Sparkline => token
                .sparkline
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(";"),
            _ => token.display(field),
        }
    }

    fn row_as_csv(token: &TrendingToken) -> String {
        Field::ALL
            .iter()
            .map(|&field| Self::wrap_cell_content(&Self::cell_content(token, field)))
            .chain(std::iter::once(Self::wrap_cell_content(&token.route)))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn copy_table_cell(&mut self) {
        let Some(table) = self.tables.last() else {
            return;
        };
        let Some(token) = table.selected_token() else {
            return;
        };
        let cell = Self::cell_content(token, table.selected_field());
        self.copy_to_clipboard(cell);
    }

    fn copy_table_row(&mut self) {
        let Some(table) = self.tables.last() else {
            return;
        };
        let row = if self.modus == Modus::DETAIL {
            self.detail_row
        } else {
            table.selected_row()
        };
        let Some(token) = table.sorter.get(row) else {
            return;
        };
        let content = Self::row_as_csv(token);
        self.copy_to_clipboard(content);
    }

    fn copy_detail_route(&mut self) {
        let route = self
            .tables
            .last()
            .and_then(|t| t.sorter.get(self.detail_row))
            .map(|token| token.route.clone());
        if let Some(route) = route {
            self.copy_to_clipboard(route);
        }
    }

    fn copy_to_clipboard(&mut self, content: String) {
        trace!("Clipboard content: {}", content);
        if self.clipboard.is_none() {
            match Clipboard::new() {
                Ok(clipboard) => self.clipboard = Some(clipboard),
                Err(e) => {
                    error!("Clipboard not available: {:?}", e);
                    self.set_status_message("Clipboard not available");
                    return;
                }
            }
        }
        if let Some(clipboard) = self.clipboard.as_mut() {
            match clipboard.set_text(content) {
                Ok(_) => self.set_status_message("Copied to clipboard"),
                Err(e) => {
                    error!("Error copying to clipboard: {:?}", e);
                    self.set_status_message("Copy failed");
                }
            }
        }
    }
}
