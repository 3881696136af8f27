// src/ui/picklist.rs
use anyhow::Result;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::{radio_mark, row_rect, run_form, Form, FormEvent, FormStatus, Theme};

const ITEM_SPACING: u16 = 2;
const FIRST_ITEM_ROW: u16 = 3;
/// Bottom panel holding the focused message in full, wrapped.
const DETAIL_HEIGHT: u16 = 5;

/// Single-choice list of commit message candidates.
///
/// Enter on a different item only moves the check mark; Enter on the
/// checked item picks it. A click checks immediately.
#[derive(Debug, Default)]
pub struct Picklist {
    items: Vec<String>,
    focused: usize,
    checked: Option<usize>,
}

impl Picklist {
    #[cfg(test)]
    pub fn new(items: Vec<String>) -> Self {
        let mut list = Self::default();
        list.reset(items);
        list
    }

    /// Replaces every item; focus and check go back to the first entry.
    pub fn reset(&mut self, items: Vec<String>) {
        self.checked = if items.is_empty() { None } else { Some(0) };
        self.focused = 0;
        self.items = items;
    }

    #[cfg(test)]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    #[cfg(test)]
    pub fn focused(&self) -> usize {
        self.focused
    }

    #[cfg(test)]
    pub fn checked(&self) -> Option<usize> {
        self.checked
    }

    /// Shows `messages` and waits for a pick. `None` when cancelled.
    pub fn show_messages(&mut self, messages: Vec<String>) -> Result<Option<String>> {
        self.reset(messages);
        run_form(self)
    }

    fn confirm(&mut self) -> FormStatus<String> {
        if self.items.is_empty() {
            return FormStatus::Active;
        }
        if self.checked == Some(self.focused) {
            FormStatus::Submitted(self.items[self.focused].clone())
        } else {
            self.checked = Some(self.focused);
            FormStatus::Active
        }
    }

    fn body(area: Rect) -> Rect {
        Block::default().borders(Borders::ALL).inner(Rect {
            y: area.y.saturating_add(1),
            height: area.height.saturating_sub(1),
            ..area
        })
    }

    /// Whether the body is tall enough for the detail panel.
    fn shows_detail(body: Rect) -> bool {
        body.height >= FIRST_ITEM_ROW + DETAIL_HEIGHT + 1
    }

    /// Number of items that fit between the hint and the detail panel.
    fn capacity(body: Rect) -> usize {
        let reserved = FIRST_ITEM_ROW + if Self::shows_detail(body) { DETAIL_HEIGHT } else { 0 };
        let rows = body.height.saturating_sub(reserved);
        usize::from(rows.div_ceil(ITEM_SPACING)).max(1)
    }

    /// First visible item; keeps the focused item on screen.
    fn scroll_offset(&self, body: Rect) -> usize {
        (self.focused + 1).saturating_sub(Self::capacity(body))
    }
}

/// Cuts `text` to `width` columns, marking the cut with an ellipsis.
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", kept)
}

impl Form for Picklist {
    type Output = String;

    fn update(&mut self, event: FormEvent) -> FormStatus<String> {
        let len = self.items.len();
        match event {
            FormEvent::Cancel | FormEvent::Char('q') => return FormStatus::Cancelled,
            FormEvent::Confirm | FormEvent::Char(' ') => return self.confirm(),
            _ if len == 0 => {}
            FormEvent::Up | FormEvent::Char('k') => self.focused = self.focused.saturating_sub(1),
            FormEvent::Down | FormEvent::Char('j') => self.focused = (self.focused + 1).min(len - 1),
            FormEvent::Tab => self.focused = (self.focused + 1) % len,
            FormEvent::BackTab => self.focused = (self.focused + len - 1) % len,
            FormEvent::Click(i) if i < len => {
                self.focused = i;
                self.checked = Some(i);
            }
            _ => {}
        }
        FormStatus::Active
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        if let Some(header) = row_rect(area, 0, 0) {
            frame.render_widget(
                Paragraph::new(" Select Commit Message").style(Theme::HEADER),
                header,
            );
        }

        let outer = Rect {
            y: area.y.saturating_add(1),
            height: area.height.saturating_sub(1),
            ..area
        };
        frame.render_widget(Block::default().borders(Borders::ALL), outer);
        let body = Self::body(area);

        if let Some(hint) = row_rect(body, 1, 1) {
            frame.render_widget(
                Paragraph::new("↑↓ to move, Enter to check/submit, Esc to cancel")
                    .style(Theme::HINT),
                hint,
            );
        }

        if self.items.is_empty() {
            if let Some(row) = row_rect(body, 1, FIRST_ITEM_ROW) {
                frame.render_widget(Paragraph::new("No commit messages to choose from."), row);
            }
            return;
        }

        let offset = self.scroll_offset(body);
        let visible = self.items.iter().enumerate().skip(offset).take(Self::capacity(body));
        for (slot, (i, item)) in visible.enumerate() {
            let y = FIRST_ITEM_ROW + slot as u16 * ITEM_SPACING;
            let Some(row) = row_rect(body, 1, y) else {
                break;
            };
            let checked = self.checked == Some(i);
            let mark_style = if checked { Theme::CHECKED } else { Default::default() };
            let mark = radio_mark(checked);
            let room = usize::from(row.width).saturating_sub(mark.chars().count() + 1);
            let mut line = Line::from(vec![
                Span::styled(mark, mark_style),
                Span::raw(truncate(item, room)),
            ]);
            if i == self.focused {
                line = line.style(Theme::FOCUS);
            }
            frame.render_widget(Paragraph::new(line), row);
        }

        if Self::shows_detail(body) {
            let detail = Rect {
                y: body.y + body.height - DETAIL_HEIGHT,
                height: DETAIL_HEIGHT,
                ..body
            };
            let block = Block::default()
                .borders(Borders::TOP)
                .title(format!(" {}/{} ", self.focused + 1, self.items.len()))
                .style(Theme::HINT);
            frame.render_widget(
                Paragraph::new(self.items[self.focused].as_str())
                    .wrap(Wrap { trim: false })
                    .block(block),
                detail,
            );
        }
    }

    fn hit_test(&self, area: Rect, column: u16, row: u16) -> Option<FormEvent> {
        let body = Self::body(area);
        if column < body.x || column >= body.x + body.width || row < body.y + FIRST_ITEM_ROW {
            return None;
        }
        let offset = row - body.y - FIRST_ITEM_ROW;
        if offset % ITEM_SPACING != 0 {
            return None;
        }
        let slot = (offset / ITEM_SPACING) as usize;
        if slot >= Self::capacity(body) {
            return None;
        }
        let index = self.scroll_offset(body) + slot;
        (index < self.items.len()).then_some(FormEvent::Click(index))
    }
}

// =============================================================================
// MODULE TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn messages(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("feat: candidate {}", i)).collect()
    }

    fn screen_text(list: &Picklist) -> String {
        screen_text_sized(list, 60, 16)
    }

    fn screen_text_sized(list: &Picklist, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| list.render(f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn first_item_is_checked_and_focused() {
        let list = Picklist::new(messages(3));
        assert_eq!(list.checked(), Some(0));
        assert_eq!(list.focused(), 0);
    }

    #[test]
    fn immediate_confirm_picks_first_item() {
        for n in 1..5 {
            let mut list = Picklist::new(messages(n));
            assert_eq!(
                list.update(FormEvent::Confirm),
                FormStatus::Submitted("feat: candidate 1".to_string())
            );
        }
    }

    #[test]
    fn navigation_moves_focus_not_check() {
        let mut list = Picklist::new(messages(3));
        list.update(FormEvent::Down);
        list.update(FormEvent::Down);
        assert_eq!(list.focused(), 2);
        assert_eq!(list.checked(), Some(0));

        list.update(FormEvent::Down);
        assert_eq!(list.focused(), 2);
        list.update(FormEvent::Char('k'));
        assert_eq!(list.focused(), 1);
    }

    #[test]
    fn confirm_on_other_item_checks_then_second_confirm_submits() {
        let mut list = Picklist::new(messages(3));
        list.update(FormEvent::Down);

        assert_eq!(list.update(FormEvent::Confirm), FormStatus::Active);
        assert_eq!(list.checked(), Some(1));

        assert_eq!(
            list.update(FormEvent::Confirm),
            FormStatus::Submitted("feat: candidate 2".to_string())
        );
    }

    #[test]
    fn click_checks_without_submitting() {
        let mut list = Picklist::new(messages(3));
        assert_eq!(list.update(FormEvent::Click(2)), FormStatus::Active);
        assert_eq!(list.checked(), Some(2));
        assert_eq!(list.focused(), 2);
        assert_eq!(list.update(FormEvent::Click(9)), FormStatus::Active);
        assert_eq!(list.checked(), Some(2));
    }

    #[test]
    fn cancel_after_navigation_yields_nothing() {
        let mut list = Picklist::new(messages(4));
        list.update(FormEvent::Down);
        list.update(FormEvent::Confirm);
        list.update(FormEvent::Tab);
        assert_eq!(list.update(FormEvent::Cancel), FormStatus::Cancelled);
    }

    #[test]
    fn tab_wraps_around() {
        let mut list = Picklist::new(messages(2));
        list.update(FormEvent::Tab);
        list.update(FormEvent::Tab);
        assert_eq!(list.focused(), 0);
        list.update(FormEvent::BackTab);
        assert_eq!(list.focused(), 1);
    }

    #[test]
    fn empty_list_has_no_check_and_ignores_confirm() {
        let mut list = Picklist::new(Vec::new());
        assert_eq!(list.checked(), None);
        assert_eq!(list.update(FormEvent::Confirm), FormStatus::Active);
        assert_eq!(list.update(FormEvent::Down), FormStatus::Active);
        assert_eq!(list.update(FormEvent::Cancel), FormStatus::Cancelled);
        assert!(screen_text(&list).contains("No commit messages"));
    }

    #[test]
    fn reset_discards_previous_items() {
        let mut list = Picklist::new(vec!["old: first".into(), "old: second".into()]);
        list.update(FormEvent::Down);
        list.update(FormEvent::Confirm);

        list.reset(vec!["new: only".into()]);
        assert_eq!(list.items(), ["new: only".to_string()]);
        assert_eq!(list.checked(), Some(0));
        assert_eq!(list.focused(), 0);

        let text = screen_text(&list);
        assert!(text.contains("new: only"));
        assert!(!text.contains("old:"));
    }

    #[test]
    fn renders_check_marks() {
        let mut list = Picklist::new(messages(2));
        list.update(FormEvent::Click(1));
        let text = screen_text(&list);
        assert!(text.contains("( ) feat: candidate 1"));
        assert!(text.contains("(*) feat: candidate 2"));
    }

    #[test]
    fn hit_test_maps_rows_to_items() {
        let list = Picklist::new(messages(3));
        let area = Rect::new(0, 0, 60, 16);
        let body = Picklist::body(area);
        let first = body.y + FIRST_ITEM_ROW;
        assert_eq!(list.hit_test(area, 5, first), Some(FormEvent::Click(0)));
        assert_eq!(list.hit_test(area, 5, first + 2), Some(FormEvent::Click(1)));
        assert_eq!(list.hit_test(area, 5, first + 1), None);
        assert_eq!(list.hit_test(area, 5, first + 6), None);
        assert_eq!(list.hit_test(area, 5, 0), None);
    }

    #[test]
    fn list_scrolls_to_keep_focus_visible() {
        let mut list = Picklist::new(messages(10));
        for _ in 0..9 {
            list.update(FormEvent::Down);
        }
        assert_eq!(list.focused(), 9);

        let text = screen_text_sized(&list, 80, 24);
        assert!(text.contains("( ) feat: candidate 10"));
        assert!(text.contains("( ) feat: candidate 9"));
        assert!(!text.contains("feat: candidate 3"));

        list.update(FormEvent::Tab);
        assert!(screen_text_sized(&list, 80, 24).contains("(*) feat: candidate 1"));
    }

    #[test]
    fn hit_test_follows_scroll_offset() {
        let mut list = Picklist::new(messages(10));
        for _ in 0..9 {
            list.update(FormEvent::Down);
        }
        let area = Rect::new(0, 0, 80, 24);
        let body = Picklist::body(area);
        let first = body.y + FIRST_ITEM_ROW;
        let offset = 10 - Picklist::capacity(body);
        assert_eq!(list.hit_test(area, 5, first), Some(FormEvent::Click(offset)));
    }

    #[test]
    fn long_message_is_shown_in_full_below_the_list() {
        let long = "feat: rework the provider registry so every backend shares one \
                    request builder and response parser ENDMARK"
            .to_string();
        let list = Picklist::new(vec![long, "fix: short".into()]);

        let text = screen_text_sized(&list, 40, 16);
        assert!(text.contains("…"));
        assert!(text.contains("ENDMARK"));
        assert!(text.contains(" 1/2 "));
    }

    #[test]
    fn truncate_marks_the_cut() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
