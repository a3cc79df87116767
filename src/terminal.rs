//! Terminal presentation adapter
//!
//! Executes [`RenderCommand`]s against a line-oriented terminal. The chat
//! pane is kept as a log so that re-entering the chat view can redraw it;
//! other views are printed when they become visible.

use crate::config::Config;
use crate::error::{NoduError, Result};
use crate::session::history::HistoryEntry;
use crate::session::message::{MessageHandle, Role};
use crate::session::render::{MarkupRenderer, Presenter, RenderCommand, Typesetter};
use crate::session::view::View;
use crate::tutors::{self, TutorId};
use colored::Colorize;
use prettytable::{format, Table};
use regex::{Captures, Regex};
use std::fmt::Display;
use std::io::{self, Write};

#[derive(Debug, Clone)]
struct PaneLine {
    handle: MessageHandle,
    role: Role,
    markup: String,
    tutor: Option<TutorId>,
}

/// Presenter printing to a terminal (or any writer)
pub struct TerminalPresenter<W: Write + Send = io::Stdout> {
    out: W,
    visible: View,
    header: Option<(TutorId, &'static str)>,
    pane: Vec<PaneLine>,
    user_name: String,
    server_url: String,
    settings: Vec<(&'static str, String)>,
}

impl TerminalPresenter<io::Stdout> {
    /// Presenter writing to standard output
    pub fn stdout(config: &Config) -> Self {
        Self::new(io::stdout(), config)
    }
}

impl<W: Write + Send> TerminalPresenter<W> {
    /// Presenter writing to `out`
    pub fn new(out: W, config: &Config) -> Self {
        let settings = vec![
            ("Server", config.server.base_url.clone()),
            (
                "Timeout",
                format!("{} s", config.server.timeout_seconds),
            ),
            (
                "Session cookie",
                if config.server.session_cookie.is_some() {
                    "set".to_string()
                } else {
                    "not set".to_string()
                },
            ),
            (
                "Max image size",
                format_bytes(config.attachments.max_image_bytes),
            ),
            (
                "Max document size",
                format_bytes(config.attachments.max_document_bytes),
            ),
            ("Document type", config.attachments.document_mime.clone()),
        ];
        Self {
            out,
            visible: View::Dashboard,
            header: None,
            pane: Vec::new(),
            user_name: config.chat.user_name.clone(),
            server_url: config.server.base_url.clone(),
            settings,
        }
    }

    /// View currently shown
    pub fn visible(&self) -> View {
        self.visible
    }

    /// Consume the presenter and return its writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: impl Display) {
        if let Err(e) = writeln!(self.out, "{}", text) {
            tracing::warn!("Failed to write to terminal: {}", e);
        }
    }

    fn show_view(&mut self, view: View) {
        let entering = self.visible != view;
        self.visible = view;
        match view {
            View::Dashboard => self.print_dashboard(),
            View::Chat => {
                if entering {
                    self.redraw_pane();
                }
            }
            View::Profile => self.print_profile(),
            // Content arrives with the following ShowHistory.
            View::History => self.line(format!("\n{}", "Conversation history".bold())),
            View::Settings => self.print_settings(),
        }
    }

    fn print_dashboard(&mut self) {
        self.line(format!("\n{}", "Choose your tutor".bold()));
        for descriptor in tutors::all() {
            let line = format!(
                "  [{}] {:<20} /tutor {}",
                descriptor.visual_theme.icon,
                descriptor.display_name,
                descriptor.id
            );
            self.line(line);
        }
        self.line("");
    }

    fn print_profile(&mut self) {
        let name = self.user_name.clone();
        self.line(format!("\n{}", "Profile".bold()));
        self.line(format!("  Name:    {}", name));
        let server = self.server_url.clone();
        self.line(format!("  Backend: {}", server));
        self.line("");
    }

    fn print_settings(&mut self) {
        self.line(format!("\n{}", "Settings".bold()));
        let rows: Vec<String> = self
            .settings
            .iter()
            .map(|(key, value)| format!("  {:<18} {}", format!("{}:", key), value))
            .collect();
        for row in rows {
            self.line(row);
        }
        self.line("");
    }

    fn print_history(&mut self, entries: &[HistoryEntry]) {
        if entries.is_empty() {
            self.line("No conversation history found.".yellow());
            return;
        }

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
        table.set_titles(prettytable::row![
            "#".bold(),
            "Tutor".bold(),
            "Messages".bold(),
            "Last Updated".bold()
        ]);
        for (index, entry) in entries.iter().enumerate() {
            let updated = entry
                .last_updated
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string());
            table.add_row(prettytable::row![
                (index + 1).to_string().cyan(),
                format!("[{}] {}", entry.icon, entry.display_name),
                entry.message_count,
                updated
            ]);
        }
        if let Err(e) = table.print(&mut self.out) {
            tracing::warn!("Failed to print history table: {}", e);
        }
        self.line(format!("Use {} to reopen a conversation.", "/open <#>".cyan()));
    }

    fn redraw_pane(&mut self) {
        if let Some((_, name)) = self.header {
            self.line(format!("\n── {} ──", name.bold()));
        }
        let lines: Vec<String> = self.pane.iter().map(|l| self.format_line(l)).collect();
        for line in lines {
            self.line(line);
        }
    }

    fn format_line(&self, line: &PaneLine) -> String {
        match line.role {
            Role::User => {
                let name = format!("{}:", self.user_name);
                format!("{} {}", name.green().bold(), line.markup)
            }
            Role::Assistant => {
                let icon = line
                    .tutor
                    .map(|t| t.descriptor().visual_theme.icon)
                    .unwrap_or("AI");
                format!("{} {}", format!("[{}]", icon).blue().bold(), line.markup)
            }
        }
    }
}

impl<W: Write + Send> Presenter for TerminalPresenter<W> {
    fn apply(&mut self, command: RenderCommand) {
        match command {
            RenderCommand::ShowView { view, .. } => self.show_view(view),
            RenderCommand::FocusInput { .. } | RenderCommand::ScrollToEnd { .. } => {
                tracing::trace!("Terminal ignores {:?}", command);
            }
            RenderCommand::SetChatHeader { tutor, name, .. } => {
                self.header = Some((tutor, name));
            }
            RenderCommand::ClearChat => self.pane.clear(),
            RenderCommand::AppendMessage {
                handle,
                role,
                markup,
                tutor,
            } => {
                let line = PaneLine {
                    handle,
                    role,
                    markup,
                    tutor,
                };
                if self.visible == View::Chat {
                    let text = self.format_line(&line);
                    self.line(text);
                }
                self.pane.push(line);
            }
            RenderCommand::RemoveMessage(handle) => {
                // Printed lines cannot be taken back; the redraw drops it.
                self.pane.retain(|l| l.handle != handle);
            }
            RenderCommand::ShowImagePreview { name, mime_type } => {
                self.line(format!("{} {} ({})", "📎 image:".cyan(), name, mime_type));
            }
            RenderCommand::ShowDocumentChip { name } => {
                self.line(format!("{} {}", "📄 document:".cyan(), name));
            }
            RenderCommand::HidePreviews => tracing::trace!("Attachment preview hidden"),
            RenderCommand::Notice(text) => self.line(text.yellow()),
            RenderCommand::ShowHistory(entries) => self.print_history(&entries),
            RenderCommand::AcknowledgeSelection(tutor) => {
                tracing::debug!("Tutor {} acknowledged", tutor);
            }
        }
        if let Err(e) = self.out.flush() {
            tracing::warn!("Failed to flush terminal: {}", e);
        }
    }
}

fn format_bytes(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes % MIB == 0 {
        format!("{} MiB", bytes / MIB)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Renders the inline markdown subset used by the tutors with ANSI styles
///
/// Code spans and math fragments are kept verbatim (highlighted) so the
/// typesetter still sees their delimiters; emphasis is applied only to the
/// text between them.
pub struct TerminalMarkup {
    verbatim: Regex,
    bold: Regex,
    italic: Regex,
}

impl TerminalMarkup {
    /// Compile the markup patterns
    pub fn new() -> Result<Self> {
        Ok(Self {
            verbatim: compile(
                r"`([^`\n]+)`|\$\$[^$]+\$\$|\$[^$\n]+\$|\\\(.+?\\\)|\\\[.+?\\\]",
            )?,
            // Delimiters must hug the emphasized text, as in CommonMark.
            bold: compile(r"\*\*([^*\s](?:[^*]*[^*\s])?)\*\*")?,
            italic: compile(r"(^|[^*])\*([^*\s](?:[^*\n]*[^*\s])?)\*")?,
        })
    }

    fn emphasis(&self, text: &str) -> String {
        let result = self
            .bold
            .replace_all(text, |c: &Captures| c[1].bold().to_string());
        let result = self.italic.replace_all(&result, |c: &Captures| {
            format!("{}{}", &c[1], c[2].italic())
        });
        result.into_owned()
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| NoduError::Config(format!("invalid markup pattern: {}", e)).into())
}

impl MarkupRenderer for TerminalMarkup {
    fn render(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in self.verbatim.captures_iter(text) {
            let Some(span) = caps.get(0) else {
                continue;
            };
            out.push_str(&self.emphasis(&text[last..span.start()]));
            match caps.get(1) {
                Some(code) => out.push_str(&code.as_str().cyan().to_string()),
                None => out.push_str(&span.as_str().magenta().to_string()),
            }
            last = span.end();
        }
        out.push_str(&self.emphasis(&text[last..]));
        out
    }
}

/// Checks that math delimiters in a fragment are balanced
///
/// The terminal cannot typeset, so the pass only reports fragments whose
/// math would fail to render.
#[derive(Debug, Default, Clone, Copy)]
pub struct MathTypesetter;

impl Typesetter for MathTypesetter {
    fn typeset(&self, fragment: &str) -> Result<()> {
        let mut display = 0usize;
        let mut inline = 0usize;
        let mut paren = 0isize;
        let mut bracket = 0isize;

        let mut chars = fragment.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some('(') => paren += 1,
                    Some(')') => paren -= 1,
                    Some('[') => bracket += 1,
                    Some(']') => bracket -= 1,
                    _ => {}
                },
                '$' if chars.peek() == Some(&'$') => {
                    chars.next();
                    display += 1;
                }
                '$' => inline += 1,
                _ => {}
            }
            if paren < 0 || bracket < 0 {
                break;
            }
        }

        if display % 2 != 0 || inline % 2 != 0 || paren != 0 || bracket != 0 {
            anyhow::bail!("unbalanced math delimiters in {:?}", fragment);
        }
        Ok(())
    }
}
