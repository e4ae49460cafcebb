use crate::raster::font::ink_coverage;

/// Glyphs ordered ascending by measured ink coverage.
///
/// Index 0 is the sparsest glyph, index `len - 1` the densest. Measurement
/// happens once per glyph set; inverting just reverses the sorted order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DensityPalette {
    glyphs: Vec<char>,
}

impl DensityPalette {
    /// Measure a glyph set: deduplicate, rate each glyph's ink coverage on
    /// the fixed offscreen cell, and sort ascending (stable, so ties keep
    /// input order).
    pub fn measure(glyphs: &str) -> Self {
        let mut seen = Vec::<char>::new();
        for ch in glyphs.chars() {
            if !seen.contains(&ch) {
                seen.push(ch);
            }
        }
        let mut rated: Vec<(u32, char)> =
            seen.into_iter().map(|ch| (ink_coverage(ch), ch)).collect();
        rated.sort_by_key(|&(cov, _)| cov);
        Self {
            glyphs: rated.into_iter().map(|(_, ch)| ch).collect(),
        }
    }

    /// Reverse the density order in place; no re-measurement.
    pub fn invert(&mut self) {
        self.glyphs.reverse();
    }

    /// Number of distinct glyphs.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Whether the palette holds no glyphs at all.
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Glyph at density rank `index`.
    pub fn glyph(&self, index: usize) -> char {
        self.glyphs[index]
    }

    /// The ordered glyph sequence.
    pub fn glyphs(&self) -> &[char] {
        &self.glyphs
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/density.rs"]
mod tests;
