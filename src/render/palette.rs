//! # Color Palettes
//!
//! A palette maps the four shade indices of a raster to RGB colors. Shade 0
//! is the lightest, shade 3 the darkest.
//!
//! ## Available Palettes
//!
//! | # | Name |
//! |---|------|
//! | 0 | Black and White |
//! | 1 | Grayscale (default) |
//! | 2 | Original Game Boy |
//! | 3 | Game Boy Pocket |
//! | 4 | Game Boy Color (Game Boy Camera, UE/US) |
//! | 5 | Game Boy Color (PocketCamera, JP) |
//! | 6 | bgb emulator |
//! | 7 | Grafixkid Gray |
//! | 8 | Grafixkid Green |
//! | 9 | Game Boy (Black Zero) |
//!
//! ## Usage
//!
//! ```
//! use gbprinter::render::palette;
//!
//! let bw = palette::by_name("black and white").unwrap();
//! assert_eq!(bw.color(0), Some(0xFFFFFF));
//! assert_eq!(bw.color(3), Some(0x000000));
//!
//! // Index or name both work
//! assert_eq!(palette::lookup("2").unwrap().name, "Original Game Boy");
//! ```

use crate::error::GbPrinterError;

/// Four colors as `0xRRGGBB`, indexed by shade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub name: &'static str,
    pub colors: [u32; 4],
}

impl Palette {
    /// Color for a shade index, `None` when the shade is above 3.
    #[inline]
    pub fn color(&self, shade: u8) -> Option<u32> {
        self.colors.get(shade as usize).copied()
    }
}

/// Index of the palette used when none is configured
pub const DEFAULT_PALETTE: usize = 1;

/// Every built-in palette, in CLI index order
pub const PALETTES: [Palette; 10] = [
    Palette {
        name: "Black and White",
        colors: [0xFFFFFF, 0xFFFFFF, 0x000000, 0x000000],
    },
    Palette {
        name: "Grayscale",
        colors: [0xFFFFFF, 0xAAAAAA, 0x555555, 0x000000],
    },
    Palette {
        name: "Original Game Boy",
        colors: [0x9BBC0F, 0x77A112, 0x306230, 0x0F380F],
    },
    Palette {
        name: "Game Boy Pocket",
        colors: [0xC4CFA1, 0x8B956D, 0x4D533C, 0x1F1F1F],
    },
    Palette {
        name: "Game Boy Color (Game Boy Camera, UE/US)",
        colors: [0xFFFFFF, 0x7BFF30, 0x0163C6, 0x000000],
    },
    Palette {
        name: "Game Boy Color (PocketCamera, JP)",
        colors: [0xFFFFFF, 0xFFAD63, 0x833100, 0x000000],
    },
    Palette {
        name: "bgb emulator",
        colors: [0xE0F8D0, 0x88C070, 0x346856, 0x081820],
    },
    Palette {
        name: "Grafixkid Gray",
        colors: [0xE0DBCD, 0xA89F94, 0x706B66, 0x2B2B26],
    },
    Palette {
        name: "Grafixkid Green",
        colors: [0xDBF4B4, 0xABC396, 0x7B9278, 0x4C625A],
    },
    Palette {
        name: "Game Boy (Black Zero)",
        colors: [0x7E8416, 0x577B46, 0x385D49, 0x2E463D],
    },
];

/// The default (Grayscale) palette
pub fn default_palette() -> &'static Palette {
    &PALETTES[DEFAULT_PALETTE]
}

pub fn by_index(index: usize) -> Option<&'static Palette> {
    PALETTES.get(index)
}

/// Case-insensitive lookup by name
pub fn by_name(name: &str) -> Option<&'static Palette> {
    PALETTES.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Resolve a palette from user input: an index (`"3"`) or a name.
pub fn lookup(query: &str) -> Result<&'static Palette, GbPrinterError> {
    let query = query.trim();
    let found = match query.parse::<usize>() {
        Ok(index) => by_index(index),
        Err(_) => by_name(query),
    };
    found.ok_or_else(|| GbPrinterError::UnknownPalette(query.to_string()))
}

/// List all palette names with their index.
pub fn list_palettes() -> impl Iterator<Item = (usize, &'static str)> {
    PALETTES.iter().enumerate().map(|(i, p)| (i, p.name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_grayscale() {
        assert_eq!(default_palette().name, "Grayscale");
    }

    #[test]
    fn test_names_are_unique() {
        for (i, a) in PALETTES.iter().enumerate() {
            for b in &PALETTES[i + 1..] {
                assert!(!a.name.eq_ignore_ascii_case(b.name), "{}", a.name);
            }
        }
    }

    #[test]
    fn test_shade_out_of_range() {
        assert_eq!(default_palette().color(4), None);
        assert_eq!(default_palette().color(255), None);
    }

    #[test]
    fn test_lookup_by_index_and_name() {
        assert_eq!(lookup("0").unwrap().name, "Black and White");
        assert_eq!(lookup("  bgb EMULATOR ").unwrap().name, "bgb emulator");
        assert!(lookup("10").is_err());
        assert!(lookup("sepia").is_err());
    }

    #[test]
    fn test_list_palettes() {
        let names: Vec<_> = list_palettes().collect();
        assert_eq!(names.len(), 10);
        assert_eq!(names[1], (1, "Grayscale"));
    }
}
