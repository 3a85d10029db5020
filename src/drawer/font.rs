use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::drawer::error::{invalid, Result};

pub const GLYPH_COLUMNS: usize = 5;
pub const GLYPH_ROWS: usize = 7;

const EMBEDDED_CHARMAP: &str = include_str!("../../assets/charmap.txt");

static CHARMAP: Lazy<CharMap> = Lazy::new(|| match CharMap::parse(EMBEDDED_CHARMAP) {
    Ok(map) => map,
    Err(err) => {
        tracing::error!("embedded charmap is unusable: {err}");
        CharMap::default()
    }
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Glyph {
    rows: [[bool; GLYPH_COLUMNS]; GLYPH_ROWS],
}

impl Glyph {
    pub fn is_lit(&self, column: usize, row: usize) -> bool {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .copied()
            .unwrap_or(false)
    }
}

/// Fixed 5x7 bitmap font keyed by character, used by the character console.
#[derive(Debug, Clone, Default)]
pub struct CharMap {
    glyphs: HashMap<char, Glyph>,
}

impl CharMap {
    /// Parses `[c]` header lines each followed by 7 rows of `*`/`.` cells.
    pub fn parse(source: &str) -> Result<Self> {
        let mut glyphs = HashMap::new();
        let mut lines = source.lines().enumerate();
        while let Some((number, line)) = lines.next() {
            if line.trim().is_empty() {
                continue;
            }
            let key = parse_header(line)
                .ok_or_else(|| invalid(format!("line {}: expected [c] header", number + 1)))?;
            let mut glyph = Glyph::default();
            for row in 0..GLYPH_ROWS {
                let (number, cells) = lines.next().ok_or_else(|| {
                    invalid(format!("glyph '{key}' ends after {row} rows"))
                })?;
                let cells: Vec<char> = cells.chars().collect();
                if cells.len() != GLYPH_COLUMNS {
                    return Err(invalid(format!(
                        "line {}: glyph '{key}' row has {} cells",
                        number + 1,
                        cells.len()
                    )));
                }
                for (column, cell) in cells.into_iter().enumerate() {
                    glyph.rows[row][column] = match cell {
                        '*' => true,
                        '.' => false,
                        other => {
                            return Err(invalid(format!(
                                "line {}: unexpected cell '{other}'",
                                number + 1
                            )))
                        }
                    };
                }
            }
            glyphs.insert(key, glyph);
        }
        Ok(Self { glyphs })
    }

    pub fn embedded() -> &'static CharMap {
        &CHARMAP
    }

    pub fn get(&self, c: char) -> Option<&Glyph> {
        self.glyphs.get(&c)
    }

    /// Glyph for `c`, falling back to `?` and then to a blank cell.
    pub fn glyph_or_fallback(&self, c: char) -> Glyph {
        self.get(c)
            .or_else(|| self.get('?'))
            .copied()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

fn parse_header(line: &str) -> Option<char> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?;
    let mut chars = inner.chars();
    let key = chars.next()?;
    chars.next().is_none().then_some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_map_covers_printable_ascii() {
        let map = CharMap::embedded();
        assert_eq!(map.len(), 95);
        for c in ' '..='~' {
            assert!(map.get(c).is_some(), "missing glyph for {c:?}");
        }
    }

    #[test]
    fn bracket_glyphs_parse_from_their_headers() {
        let map = CharMap::embedded();
        assert!(map.get('[').is_some());
        assert!(map.get(']').is_some());
    }

    #[test]
    fn letter_a_has_a_closed_crossbar() {
        let glyph = CharMap::embedded().glyph_or_fallback('A');
        assert!((0..GLYPH_COLUMNS).all(|column| glyph.is_lit(column, 4)));
        assert!(!glyph.is_lit(0, 0));
    }

    #[test]
    fn unknown_characters_fall_back_to_question_mark() {
        let map = CharMap::embedded();
        assert_eq!(map.glyph_or_fallback('\u{263A}'), map.glyph_or_fallback('?'));
    }

    #[test]
    fn short_glyph_is_rejected() {
        let err = CharMap::parse("[x]\n*....\n").unwrap_err();
        assert!(err.to_string().contains("ends after 1 rows"));
    }
}
