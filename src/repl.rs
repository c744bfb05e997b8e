use nu_ansi_term::{Color, Style};
use reedline::{
    Highlighter, Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus,
    PromptViMode, StyledText, ValidationResult, Validator,
};
use std::borrow::Cow;

use crate::tokenizer::{tokenize, TokenType};

/// Prompt that numbers each entry, like `tanglish[3]❯ `.
#[derive(Debug, Clone)]
pub struct REPLPrompt {
    entry: usize,
}

impl REPLPrompt {
    pub fn new() -> Self {
        REPLPrompt { entry: 1 }
    }

    pub fn next_entry(&mut self) {
        self.entry += 1;
    }
}

impl Default for REPLPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompt for REPLPrompt {
    fn render_prompt_left(&self) -> Cow<str> {
        Cow::Owned(format!("tanglish[{}]", self.entry))
    }

    fn render_prompt_right(&self) -> Cow<str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, edit_mode: PromptEditMode) -> Cow<str> {
        match edit_mode {
            PromptEditMode::Vi(PromptViMode::Normal) => Cow::Borrowed(": "),
            _ => Cow::Borrowed("❯ "),
        }
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<str> {
        let width = format!("tanglish[{}]", self.entry).chars().count();
        Cow::Owned(format!("{:>width$} ", "|", width = width + 1))
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<str> {
        let label = match history_search.status {
            PromptHistorySearchStatus::Passing => "history",
            PromptHistorySearchStatus::Failing => "no match",
        };
        Cow::Owned(format!("[{}: {}] ", label, history_search.term))
    }
}

/// Keeps reading lines while a block, a parenthesis or a string is open.
pub struct REPLValidator;

impl Validator for REPLValidator {
    fn validate(&self, line: &str) -> ValidationResult {
        let mut depth = 0i64;
        let mut in_string = false;
        let mut in_comment = false;
        let mut escaped = false;

        for c in line.chars() {
            if in_comment {
                in_comment = c != '\n';
                continue;
            }

            if in_string {
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }

            match c {
                '"' => in_string = true,
                '#' => in_comment = true,
                '{' | '(' => depth += 1,
                '}' | ')' => depth -= 1,
                _ => {}
            }
        }

        if in_string || depth > 0 {
            ValidationResult::Incomplete
        } else {
            ValidationResult::Complete
        }
    }
}

pub static KEYWORD_COLOR: Color = Color::LightBlue;
pub static LITERAL_COLOR: Color = Color::Yellow;
pub static DEFAULT_COLOR: Color = Color::White;
pub static OPERATOR_COLOR: Color = Color::DarkGray;
pub static COMMENT_COLOR: Color = Color::Green;

fn token_color(token_type: &TokenType) -> Color {
    match token_type {
        TokenType::Keyword(_) | TokenType::Boolean(_) => KEYWORD_COLOR,
        TokenType::Number(_) | TokenType::String(_) => LITERAL_COLOR,
        TokenType::Operator(_)
        | TokenType::Assign
        | TokenType::LeftParen
        | TokenType::RightParen
        | TokenType::LeftBrace
        | TokenType::RightBrace => OPERATOR_COLOR,
        TokenType::Identifier(_) | TokenType::EOF => DEFAULT_COLOR,
    }
}

pub struct SyntaxHighlighter;

impl Highlighter for SyntaxHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled_text = StyledText::new();

        let tokens = match tokenize(line) {
            Ok(t) => t,
            Err(_) => {
                styled_text.push((Style::new().fg(DEFAULT_COLOR), line.to_string()));
                return styled_text;
            }
        };

        let mut written = 0;

        for token in tokens {
            // gaps between tokens hold whitespace and comments
            let gap = &line[written..token.byte_span.start];
            if !gap.is_empty() {
                let color = if gap.contains('#') {
                    COMMENT_COLOR
                } else {
                    DEFAULT_COLOR
                };
                styled_text.push((Style::new().fg(color), gap.to_string()));
            }

            if token.token_type == TokenType::EOF {
                break;
            }

            styled_text.push((
                Style::new().fg(token_color(&token.token_type)),
                line[token.byte_span.clone()].to_string(),
            ));
            written = token.byte_span.end;
        }

        styled_text
    }
}
