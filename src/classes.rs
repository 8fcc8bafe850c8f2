//! Class name table and per-class display colors.

use crate::util::{DetPipeError, DetPipeResult};
use std::path::Path;

/// Ordered class names indexed by `Detection::class_id`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassNames {
    names: Vec<String>,
}

impl ClassNames {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Parses one name per line, trimming whitespace and skipping blank lines.
    pub fn parse(text: &str) -> Self {
        let names = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect();
        Self { names }
    }

    /// Reads a newline-separated names file such as `coco.names`.
    pub fn load<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, class_id: usize) -> Option<&str> {
        self.names.get(class_id).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Fails unless the table has exactly `num_classes` entries.
    pub fn ensure_len(&self, num_classes: usize) -> DetPipeResult<()> {
        if self.names.len() != num_classes {
            return Err(DetPipeError::ClassTableMismatch {
                expected: num_classes,
                got: self.names.len(),
            });
        }
        Ok(())
    }
}

/// Deterministic RGB color for a class id.
///
/// Mixes the id with a 32-bit finalizer so neighboring ids get unrelated
/// colors. Channels are kept in `[64, 255]` to stay visible on dark frames.
pub fn class_color(class_id: usize) -> [u8; 3] {
    let mut h = (class_id as u32).wrapping_add(0x9e37_79b9);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    let channel = |shift: u32| 64 + ((h >> shift) & 0xff) as u8 % 192;
    [channel(0), channel(8), channel(16)]
}

#[cfg(test)]
mod tests {
    use super::{class_color, ClassNames};

    #[test]
    fn parse_trims_and_skips_blank_lines() {
        let names = ClassNames::parse("person\n bicycle \n\ncar\r\n");
        assert_eq!(names.len(), 3);
        assert_eq!(names.name(1), Some("bicycle"));
        assert_eq!(names.name(2), Some("car"));
        assert_eq!(names.name(3), None);
    }

    #[test]
    fn colors_are_stable_and_distinct() {
        assert_eq!(class_color(7), class_color(7));
        assert_ne!(class_color(0), class_color(1));
        for c in class_color(42) {
            assert!(c >= 64);
        }
    }
}
