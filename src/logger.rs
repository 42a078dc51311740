use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

/// Log to stderr so records never interleave with the rendered views.
pub fn init(verbose: bool) {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    let _ = TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto);
}
