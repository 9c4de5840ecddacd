//! Text outline of a quota and an excerpt over a whole document.

use crate::domain::model::{Fragment, FragmentSet};
use crate::infra::config::Config;

/// Glyphs used when painting an outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlineStyle {
    pub background: char,
    pub excerpt: char,
    pub quota: char,
    pub overlap: char,
    pub exceeded: char,
}

impl Default for OutlineStyle {
    fn default() -> Self {
        Self {
            background: '.',
            excerpt: '#',
            quota: 'q',
            overlap: '*',
            exceeded: '!',
        }
    }
}

impl OutlineStyle {
    /// Build a style from configuration. Empty glyph settings keep the default glyph.
    pub fn from_config(config: &Config) -> Self {
        let defaults = Self::default();
        let outline = &config.outline;
        Self {
            background: first_char(&outline.background).unwrap_or(defaults.background),
            excerpt: first_char(&outline.excerpt).unwrap_or(defaults.excerpt),
            quota: first_char(&outline.quota).unwrap_or(defaults.quota),
            overlap: first_char(&outline.overlap).unwrap_or(defaults.overlap),
            exceeded: first_char(&outline.exceeded).unwrap_or(defaults.exceeded),
        }
    }
}

fn first_char(value: &str) -> Option<char> {
    value.chars().next()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Empty,
    Excerpt,
    Quota,
    Both,
}

/// Paints fragment sets onto a bar of fixed width.
#[derive(Debug, Clone, Copy)]
pub struct Outline {
    width: usize,
    style: OutlineStyle,
}

impl Outline {
    pub fn new(width: usize, style: OutlineStyle) -> Self {
        Self { width, style }
    }

    /// Render `excerpt` and `quota` over a document of `segments` segments.
    ///
    /// The excerpt is drawn with the exceeded glyph when `exceeded` is set. Quota cells are
    /// painted on top; cells covered by both use the overlap glyph.
    pub fn render(
        &self,
        quota: &FragmentSet,
        excerpt: &FragmentSet,
        segments: u64,
        exceeded: bool,
    ) -> String {
        let mut cells = vec![Cell::Empty; self.width];

        for fragment in excerpt {
            for cell in &mut cells[self.columns(fragment, segments)] {
                *cell = Cell::Excerpt;
            }
        }
        for fragment in quota {
            for cell in &mut cells[self.columns(fragment, segments)] {
                *cell = match *cell {
                    Cell::Excerpt | Cell::Both => Cell::Both,
                    Cell::Empty | Cell::Quota => Cell::Quota,
                };
            }
        }

        let excerpt_glyph = if exceeded {
            self.style.exceeded
        } else {
            self.style.excerpt
        };
        cells
            .into_iter()
            .map(|cell| match cell {
                Cell::Empty => self.style.background,
                Cell::Excerpt => excerpt_glyph,
                Cell::Quota => self.style.quota,
                Cell::Both => self.style.overlap,
            })
            .collect()
    }

    /// Cell range covered by `fragment`, never empty for fragments inside the document.
    fn columns(&self, fragment: &Fragment, segments: u64) -> std::ops::Range<usize> {
        if segments == 0 || self.width == 0 {
            return 0..0;
        }
        let width = self.width as u128;
        let segments = u128::from(segments);
        let begin = u128::from(fragment.begin() - 1);
        let end = u128::from(fragment.end());

        let start = (begin * width / segments).min(width);
        let stop = end.saturating_mul(width).div_ceil(segments).min(width);
        start as usize..stop.max(start) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::domain::codec::parse_fragments;

    fn set(text: &str) -> FragmentSet {
        parse_fragments(text).unwrap()
    }

    #[test]
    fn paints_excerpt_quota_and_overlap() {
        let outline = Outline::new(10, OutlineStyle::default());
        let rendered = outline.render(&set("1-3"), &set("3-6"), 10, false);
        assert_eq!(rendered, "qq*###....");
    }

    #[test]
    fn exceeded_excerpt_uses_warning_glyph() {
        let outline = Outline::new(10, OutlineStyle::default());
        let rendered = outline.render(&FragmentSet::new(), &set("9-10"), 10, true);
        assert_eq!(rendered, "........!!");
    }

    #[test]
    fn scales_down_long_documents() {
        let outline = Outline::new(4, OutlineStyle::default());
        assert_eq!(outline.render(&FragmentSet::new(), &set("1"), 1_000, false), "#...");
        assert_eq!(outline.render(&FragmentSet::new(), &set("1000"), 1_000, false), "...#");
    }

    #[test]
    fn fragments_past_the_document_are_clipped() {
        let outline = Outline::new(4, OutlineStyle::default());
        assert_eq!(outline.render(&FragmentSet::new(), &set("3-9"), 4, false), "..##");
        assert_eq!(outline.render(&FragmentSet::new(), &set("7-9"), 4, false), "....");
    }

    #[test]
    fn degenerate_sizes_do_not_panic() {
        let outline = Outline::new(0, OutlineStyle::default());
        assert_eq!(outline.render(&set("1"), &set("1"), 10, false), "");
        let outline = Outline::new(3, OutlineStyle::default());
        assert_eq!(outline.render(&set("1"), &set("1"), 0, false), "...");
    }
}
