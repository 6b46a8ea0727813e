use std::io::Write;
use std::time::Duration;

use colored::{ColoredString, Colorize};
use env_logger::{Builder, Env};
use log::{Level, LevelFilter};

/// Set up `log` output for the CLI.
///
/// `RUST_LOG` wins over `default_level` when set.
pub fn init_logging(default_level: LevelFilter) {
    let logging_env = Env::default().filter_or("RUST_LOG", default_level.as_str());
    Builder::from_env(logging_env)
        .format(|buf, record| {
            let timestamp = chrono::Local::now().format("%H:%M:%S").to_string().dimmed();
            let level = match record.level() {
                Level::Error => "error".bold().red(),
                Level::Warn => "warn".bold().yellow(),
                Level::Info => "quill".bold().bright_yellow(),
                Level::Debug | Level::Trace => record.target().to_ascii_lowercase().dimmed(),
            };
            writeln!(buf, "{} {} {}", timestamp, level, record.args())
        })
        .init();
}

/// Level for the `-v`/`-q` flags: each `-v` adds a level, `-q` only shows errors.
pub fn level_from_flags(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Build durations, colored once they get slow.
pub fn format_elapsed(elapsed: Duration) -> ColoredString {
    match elapsed.as_secs() {
        secs if secs >= 60 => format!("{}m{}s", secs / 60, secs % 60).red(),
        secs if secs > 2 => format!("{}s", secs).red(),
        secs if secs > 0 => format!("{}s", secs).yellow(),
        _ => match elapsed.as_millis() {
            millis if millis > 500 => format!("{}ms", millis).yellow(),
            millis if millis > 0 => format!("{}ms", millis).normal(),
            _ => format!("{}μs", elapsed.as_micros()).normal(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_flags() {
        assert_eq!(level_from_flags(0, false), LevelFilter::Info);
        assert_eq!(level_from_flags(1, false), LevelFilter::Debug);
        assert_eq!(level_from_flags(4, false), LevelFilter::Trace);
        assert_eq!(level_from_flags(2, true), LevelFilter::Error);
    }

    #[test]
    fn test_format_elapsed() {
        colored::control::set_override(false);
        assert_eq!(format_elapsed(Duration::from_micros(40)).to_string(), "40μs");
        assert_eq!(format_elapsed(Duration::from_millis(120)).to_string(), "120ms");
        assert_eq!(format_elapsed(Duration::from_millis(2500)).to_string(), "2s");
        assert_eq!(format_elapsed(Duration::from_secs(75)).to_string(), "1m15s");
    }
}
