use moire_dump_types::StackSnapshot;
use std::fmt::Write as _;
use std::num::NonZeroUsize;

/// Symbol prefixes of the dump machinery itself. Leading frames that match
/// are left out so the rendered stack starts at the caller.
const INTERNAL_PREFIXES: &[&str] = &["backtrace::", "moire_dump_stats::", "moire_dump::"];

#[derive(Debug, Clone, Copy)]
pub struct CaptureOptions {
    pub max_frames: NonZeroUsize,
    /// Frames to drop after the internal ones.
    pub skip_frames: usize,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            max_frames: NonZeroUsize::new(128)
                .expect("invariant violated: default max_frames must be non-zero"),
            skip_frames: 0,
        }
    }
}

struct Frame {
    ip: usize,
    symbols: Vec<(Option<String>, Option<String>)>,
}

impl Frame {
    fn is_internal(&self) -> bool {
        !self.symbols.is_empty()
            && self.symbols.iter().all(|(name, _)| {
                name.as_deref().is_some_and(|name| {
                    let name = name.trim_start_matches('<');
                    INTERNAL_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
                })
            })
    }
}

/// Demangled name without the trailing `::h<hash>`.
fn display_name(name: &backtrace::SymbolName<'_>) -> String {
    format!("{name:#}")
}

/// Captures the calling thread's stack as text, one symbol per entry:
///
/// ```text
/// my_app::handler
///     src/handler.rs:42
/// ```
pub fn capture_stack(options: CaptureOptions) -> StackSnapshot {
    let mut frames = Vec::new();
    backtrace::trace(|raw| {
        let mut frame = Frame {
            ip: raw.ip() as usize,
            symbols: Vec::new(),
        };
        backtrace::resolve_frame(raw, |symbol| {
            let name = symbol.name().map(|name| display_name(&name));
            let location = match (symbol.filename(), symbol.lineno()) {
                (Some(file), Some(line)) => Some(format!("{}:{line}", file.display())),
                (Some(file), None) => Some(file.display().to_string()),
                _ => None,
            };
            frame.symbols.push((name, location));
        });
        frames.push(frame);
        true
    });

    let caller_frames = frames
        .into_iter()
        .skip_while(Frame::is_internal)
        .skip(options.skip_frames);

    let mut text = String::new();
    for (index, frame) in caller_frames.enumerate() {
        if index == options.max_frames.get() {
            text.push_str("...\n");
            break;
        }
        if frame.symbols.is_empty() {
            let _ = writeln!(text, "0x{:x}", frame.ip);
            continue;
        }
        for (name, location) in &frame.symbols {
            let _ = writeln!(text, "{}", name.as_deref().unwrap_or("<unknown>"));
            if let Some(location) = location {
                let _ = writeln!(text, "    {location}");
            }
        }
    }
    StackSnapshot::new(text)
}
