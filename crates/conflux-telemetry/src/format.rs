//! Template-driven event formatting.
//!
//! A template is plain text with `{placeholder}` fields:
//!
//! | Placeholder        | Output                                      |
//! |--------------------|---------------------------------------------|
//! | `{time}`           | local time in the sink's `time_format`      |
//! | `{time:FMT}`       | local time in the inline strftime `FMT`     |
//! | `{level}`          | level name, `{level: <8}` pads to 8 columns |
//! | `{name}`, `{target}` | event target                              |
//! | `{module}`         | module path                                 |
//! | `{file}`, `{line}` | source location                             |
//! | `{message}`        | message and fields                          |
//!
//! Unknown placeholders are written as-is.

use std::fmt;

use chrono::format::{Item, StrftimeItems};
use chrono::Local;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use crate::error::TelemetryError;
use crate::TelemetryResult;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Time(Option<String>),
    Level(usize),
    Target,
    Module,
    File,
    Line,
    Message,
}

/// Formats events from a `{placeholder}` template.
#[derive(Debug, Clone)]
pub struct TemplateFormat {
    segments: Vec<Segment>,
    time_format: String,
}

impl TemplateFormat {
    /// Compile a template.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::InvalidConfig` if `time_format` or an inline
    /// `{time:FMT}` is not a valid strftime string.
    pub fn new(template: &str, time_format: &str) -> TelemetryResult<Self> {
        check_time_format(time_format)?;
        let segments = parse(template);
        for segment in &segments {
            if let Segment::Time(Some(inline)) = segment {
                check_time_format(inline)?;
            }
        }
        Ok(Self {
            segments,
            time_format: time_format.to_string(),
        })
    }
}

fn check_time_format(time_format: &str) -> TelemetryResult<()> {
    if StrftimeItems::new(time_format).any(|item| matches!(item, Item::Error)) {
        return Err(TelemetryError::InvalidConfig(format!(
            "invalid time format '{time_format}'"
        )));
    }
    Ok(())
}

/// Whether `time_format` contains at least one strftime field.
///
/// Token styles such as `YYYY-MM-DD HH:mm:ss` contain none and would be
/// printed verbatim.
pub fn has_time_fields(time_format: &str) -> bool {
    StrftimeItems::new(time_format).any(|item| {
        !matches!(
            item,
            Item::Literal(_) | Item::OwnedLiteral(_) | Item::Space(_) | Item::OwnedSpace(_)
        )
    })
}

fn parse(template: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        literal.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            rest = &rest[open..];
            break;
        };
        let inner = &after[..close];
        match placeholder(inner) {
            Some(segment) => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(segment);
            }
            None => {
                literal.push('{');
                literal.push_str(inner);
                literal.push('}');
            }
        }
        rest = &after[close + 1..];
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}

fn placeholder(inner: &str) -> Option<Segment> {
    let (name, format_spec) = match inner.split_once(':') {
        Some((name, format_spec)) => (name.trim(), Some(format_spec)),
        None => (inner.trim(), None),
    };
    let segment = match name {
        "time" => Segment::Time(format_spec.map(str::to_string)),
        "level" => Segment::Level(format_spec.map_or(0, width)),
        "name" | "target" => Segment::Target,
        "module" | "function" => Segment::Module,
        "file" => Segment::File,
        "line" => Segment::Line,
        "message" => Segment::Message,
        _ => return None,
    };
    Some(segment)
}

/// Width from a format spec like ` <8`.
fn width(format_spec: &str) -> usize {
    let digits: String = format_spec.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

impl<S, N> FormatEvent<S, N> for TemplateFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        let now = Local::now();

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => writer.write_str(text)?,
                Segment::Time(inline) => {
                    let time_format = inline.as_deref().unwrap_or(&self.time_format);
                    write!(writer, "{}", now.format(time_format))?;
                }
                Segment::Level(width) => {
                    write!(writer, "{:<width$}", metadata.level().as_str(), width = *width)?;
                }
                Segment::Target => writer.write_str(metadata.target())?,
                Segment::Module => writer.write_str(metadata.module_path().unwrap_or_default())?,
                Segment::File => writer.write_str(metadata.file().unwrap_or_default())?,
                Segment::Line => match metadata.line() {
                    Some(line) => write!(writer, "{line}")?,
                    None => writer.write_char('?')?,
                },
                Segment::Message => ctx.format_fields(writer.by_ref(), event)?,
            }
        }

        writeln!(writer)
    }
}
