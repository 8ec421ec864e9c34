// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::path::PathBuf;

/// Errors raised while building a region catalog from an instrument definition.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("SFZ parsing error at line {line}, column {column}: {message}\n\nContent around error:\n{context}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
        context: String,
    },

    #[error("Unable to read instrument definition {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    pub(super) fn syntax(content: &str, error: pest::error::Error<super::Rule>) -> ParseError {
        let (line, column) = match error.line_col {
            pest::error::LineColLocation::Pos((line, column)) => (line, column),
            pest::error::LineColLocation::Span((line, column), _) => (line, column),
        };
        ParseError::Syntax {
            line,
            column,
            message: error.variant.message().to_string(),
            context: error_context(content, line, column),
        }
    }
}

/// Renders the lines surrounding a parse error with a caret under the failing column.
fn error_context(content: &str, line: usize, column: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();

    // Errors at end of input point one past the last line.
    if line == 0 || lines.is_empty() {
        return "Unable to determine error context".to_string();
    }
    let error_line = (line - 1).min(lines.len() - 1);
    let first = error_line.saturating_sub(2);
    let last = (error_line + 2).min(lines.len() - 1);

    let mut context = String::new();
    for (i, text) in lines.iter().enumerate().take(last + 1).skip(first) {
        context.push_str(&format!("{:4} | {}\n", i + 1, text));
        if i == error_line {
            context.push_str(&format!("     | {}^\n", " ".repeat(column.saturating_sub(1))));
        }
    }

    context
}
