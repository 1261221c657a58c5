use ecocycle_core::model::VolumeTier;
use owo_colors::OwoColorize;

use crate::ui::Style;

/// Color helper with a single policy shared across commands.
///
/// Every helper returns an owned `String`; colors apply only when
/// `style.color` is set.
pub struct Colors {
    pub enabled: bool,
}

impl Colors {
    pub fn new(style: &Style) -> Self {
        Self {
            enabled: style.color,
        }
    }

    #[inline]
    pub fn ok(&self, s: impl AsRef<str>) -> String {
        let s = s.as_ref();
        if self.enabled {
            s.green().to_string()
        } else {
            s.to_string()
        }
    }

    #[inline]
    pub fn warn(&self, s: impl AsRef<str>) -> String {
        let s = s.as_ref();
        if self.enabled {
            s.yellow().to_string()
        } else {
            s.to_string()
        }
    }

    #[inline]
    pub fn info(&self, s: impl AsRef<str>) -> String {
        let s = s.as_ref();
        if self.enabled {
            s.cyan().to_string()
        } else {
            s.to_string()
        }
    }

    #[inline]
    pub fn dim(&self, s: impl AsRef<str>) -> String {
        let s = s.as_ref();
        if self.enabled {
            s.bright_black().to_string()
        } else {
            s.to_string()
        }
    }

    /// High = green, Medium = yellow, Low = dim. Padded to `width` before
    /// coloring so table columns stay aligned.
    pub fn volume(&self, tier: VolumeTier, width: usize) -> String {
        let label = format!("{:<width$}", tier.to_string());
        match tier {
            VolumeTier::High => self.ok(label),
            VolumeTier::Medium => self.warn(label),
            VolumeTier::Low => self.dim(label),
        }
    }

    /// Podium positions stand out.
    pub fn position(&self, pos: usize, width: usize) -> String {
        let label = format!("{:<width$}", format!("#{pos}"));
        match pos {
            1 => self.ok(label),
            2 | 3 => self.info(label),
            _ => label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_when_disabled() {
        let c = Colors { enabled: false };
        assert_eq!(c.volume(VolumeTier::High, 0), "High");
        assert_eq!(c.volume(VolumeTier::Low, 6), "Low   ");
        assert_eq!(c.position(1, 4), "#1  ");
        assert_eq!(c.dim("note"), "note");
    }
}
