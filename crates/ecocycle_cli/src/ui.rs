use owo_colors::OwoColorize;

/// Output policy for status lines and tables.
#[derive(Clone, Copy, Debug)]
pub struct Style {
    pub color: bool,
}

impl Style {
    /// Color on an interactive stdout, unless `NO_COLOR` is set.
    pub fn detect() -> Self {
        let color = atty::is(atty::Stream::Stdout) && std::env::var_os("NO_COLOR").is_none();
        Self { color }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::detect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl Level {
    fn tag(self) -> &'static str {
        match self {
            Level::Info => "[info]",
            Level::Success => "[ok]",
            Level::Warning => "[warn]",
            Level::Error => "[error]",
        }
    }
}

pub fn info(msg: impl AsRef<str>) {
    println!("{}", render(Level::Info, msg.as_ref(), Style::detect()));
}

pub fn success(msg: impl AsRef<str>) {
    println!("{}", render(Level::Success, msg.as_ref(), Style::detect()));
}

pub fn warning(msg: impl AsRef<str>) {
    eprintln!("{}", render(Level::Warning, msg.as_ref(), Style::detect()));
}

pub fn error(msg: impl AsRef<str>) {
    eprintln!("{}", render(Level::Error, msg.as_ref(), Style::detect()));
}

fn render(level: Level, msg: &str, style: Style) -> String {
    let tag = level.tag();
    if !style.color {
        return format!("{tag} {msg}");
    }

    let tag = match level {
        Level::Info => tag.cyan().to_string(),
        Level::Success => tag.green().to_string(),
        Level::Warning => tag.yellow().to_string(),
        Level::Error => tag.red().bold().to_string(),
    };
    format!("{tag} {msg}")
}
