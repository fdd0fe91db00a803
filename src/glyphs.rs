use image::{Rgb, RgbImage};

use crate::report::transliterate;

pub const GLYPH_WIDTH: u32 = 5;
pub const GLYPH_HEIGHT: u32 = 7;
const GLYPH_SPACING: u32 = 1;

pub fn text_width(text: &str, scale: u32) -> u32 {
    let count = transliterate(text).chars().count() as u32;
    if count == 0 {
        return 0;
    }
    (count * (GLYPH_WIDTH + GLYPH_SPACING) - GLYPH_SPACING) * scale
}

/// Draws upper-cased, transliterated `text` with its top-left corner at
/// `(x, top)`. Pixels falling outside the image are dropped.
pub fn draw_text(
    image: &mut RgbImage,
    mut x: u32,
    top: u32,
    text: &str,
    scale: u32,
    color: Rgb<u8>,
) {
    let advance = (GLYPH_WIDTH + GLYPH_SPACING) * scale;
    for ch in transliterate(text).to_ascii_uppercase().chars() {
        if let Some(pattern) = glyph_rows(ch) {
            for (row_idx, row) in pattern.iter().enumerate() {
                for (col_idx, pixel) in row.chars().enumerate() {
                    if pixel == ' ' {
                        continue;
                    }
                    let px = x + col_idx as u32 * scale;
                    let py = top + row_idx as u32 * scale;
                    fill_block(image, px, py, scale, color);
                }
            }
        }
        x = x.saturating_add(advance);
    }
}

/// Same as [`draw_text`] but rotated a quarter turn counter-clockwise, reading
/// bottom to top. `(left, bottom)` is where the first glyph starts.
pub fn draw_text_vertical(
    image: &mut RgbImage,
    left: u32,
    mut bottom: u32,
    text: &str,
    scale: u32,
    color: Rgb<u8>,
) {
    let advance = (GLYPH_WIDTH + GLYPH_SPACING) * scale;
    for ch in transliterate(text).to_ascii_uppercase().chars() {
        if let Some(pattern) = glyph_rows(ch) {
            for (row_idx, row) in pattern.iter().enumerate() {
                for (col_idx, pixel) in row.chars().enumerate() {
                    if pixel == ' ' {
                        continue;
                    }
                    let px = left + row_idx as u32 * scale;
                    let Some(py) = bottom.checked_sub((col_idx as u32 + 1) * scale) else {
                        continue;
                    };
                    fill_block(image, px, py, scale, color);
                }
            }
        }
        bottom = bottom.saturating_sub(advance);
    }
}

fn fill_block(image: &mut RgbImage, x: u32, y: u32, scale: u32, color: Rgb<u8>) {
    for dy in 0..scale {
        for dx in 0..scale {
            let (px, py) = (x + dx, y + dy);
            if px < image.width() && py < image.height() {
                image.put_pixel(px, py, color);
            }
        }
    }
}

fn glyph_rows(ch: char) -> Option<&'static [&'static str; 7]> {
    match ch {
        'A' => Some(&["  #  ", " # # ", "#   #", "#####", "#   #", "#   #", "#   #"]),
        'B' => Some(&["#### ", "#   #", "#   #", "#### ", "#   #", "#   #", "#### "]),
        'C' => Some(&[" ### ", "#   #", "#    ", "#    ", "#    ", "#   #", " ### "]),
        'D' => Some(&["#### ", "#   #", "#   #", "#   #", "#   #", "#   #", "#### "]),
        'E' => Some(&["#####", "#    ", "#    ", "#### ", "#    ", "#    ", "#####"]),
        'F' => Some(&["#####", "#    ", "#    ", "#### ", "#    ", "#    ", "#    "]),
        'G' => Some(&[" ### ", "#   #", "#    ", "# ###", "#   #", "#   #", " ### "]),
        'H' => Some(&["#   #", "#   #", "#   #", "#####", "#   #", "#   #", "#   #"]),
        'I' => Some(&[" ### ", "  #  ", "  #  ", "  #  ", "  #  ", "  #  ", " ### "]),
        'J' => Some(&["  ###", "   # ", "   # ", "   # ", "   # ", "#  # ", " ##  "]),
        'K' => Some(&["#   #", "#  # ", "# #  ", "##   ", "# #  ", "#  # ", "#   #"]),
        'L' => Some(&["#    ", "#    ", "#    ", "#    ", "#    ", "#    ", "#####"]),
        'M' => Some(&["#   #", "## ##", "# # #", "# # #", "#   #", "#   #", "#   #"]),
        'N' => Some(&["#   #", "##  #", "# # #", "#  ##", "#   #", "#   #", "#   #"]),
        'O' => Some(&[" ### ", "#   #", "#   #", "#   #", "#   #", "#   #", " ### "]),
        'P' => Some(&["#### ", "#   #", "#   #", "#### ", "#    ", "#    ", "#    "]),
        'Q' => Some(&[" ### ", "#   #", "#   #", "#   #", "# # #", "#  # ", " ## #"]),
        'R' => Some(&["#### ", "#   #", "#   #", "#### ", "# #  ", "#  # ", "#   #"]),
        'S' => Some(&[" ####", "#    ", "#    ", " ### ", "    #", "    #", "#### "]),
        'T' => Some(&["#####", "  #  ", "  #  ", "  #  ", "  #  ", "  #  ", "  #  "]),
        'U' => Some(&["#   #", "#   #", "#   #", "#   #", "#   #", "#   #", " ### "]),
        'V' => Some(&["#   #", "#   #", "#   #", "#   #", "#   #", " # # ", "  #  "]),
        'W' => Some(&["#   #", "#   #", "#   #", "# # #", "# # #", "## ##", "#   #"]),
        'X' => Some(&["#   #", "#   #", " # # ", "  #  ", " # # ", "#   #", "#   #"]),
        'Y' => Some(&["#   #", "#   #", " # # ", "  #  ", "  #  ", "  #  ", "  #  "]),
        'Z' => Some(&["#####", "    #", "   # ", "  #  ", " #   ", "#    ", "#####"]),
        '0' => Some(&[" ### ", "#   #", "#  ##", "# # #", "##  #", "#   #", " ### "]),
        '1' => Some(&["  #  ", " ##  ", "  #  ", "  #  ", "  #  ", "  #  ", " ### "]),
        '2' => Some(&[" ### ", "#   #", "    #", "   # ", "  #  ", " #   ", "#####"]),
        '3' => Some(&["#### ", "    #", "    #", " ### ", "    #", "    #", "#### "]),
        '4' => Some(&["   # ", "  ## ", " # # ", "#  # ", "#####", "   # ", "   # "]),
        '5' => Some(&["#####", "#    ", "#### ", "    #", "    #", "#   #", " ### "]),
        '6' => Some(&[" ### ", "#    ", "#    ", "#### ", "#   #", "#   #", " ### "]),
        '7' => Some(&["#####", "    #", "   # ", "  #  ", " #   ", " #   ", " #   "]),
        '8' => Some(&[" ### ", "#   #", "#   #", " ### ", "#   #", "#   #", " ### "]),
        '9' => Some(&[" ### ", "#   #", "#   #", " ####", "    #", "    #", " ### "]),
        '.' => Some(&["     ", "     ", "     ", "     ", "     ", " ##  ", " ##  "]),
        ':' => Some(&["     ", " ##  ", " ##  ", "     ", " ##  ", " ##  ", "     "]),
        '-' => Some(&["     ", "     ", "     ", "#####", "     ", "     ", "     "]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INK: Rgb<u8> = Rgb([0, 0, 0]);

    #[test]
    fn every_glyph_is_five_by_seven() {
        for ch in ('A'..='Z').chain('0'..='9').chain(['.', ':', '-']) {
            let rows = glyph_rows(ch).unwrap();
            assert!(rows.iter().all(|row| row.len() == 5), "glyph {ch}");
        }
    }

    #[test]
    fn text_width_counts_transliterated_chars() {
        assert_eq!(text_width("", 2), 0);
        assert_eq!(text_width("A", 1), 5);
        assert_eq!(text_width("Terça", 2), (5 * 6 - 1) * 2);
    }

    #[test]
    fn draws_inside_bounds_only() {
        let mut image = RgbImage::from_pixel(8, 8, Rgb([255, 255, 255]));
        draw_text(&mut image, 4, 4, "MM", 2, INK);
        assert_eq!(*image.get_pixel(4, 4), INK);
        assert_eq!(*image.get_pixel(0, 0), Rgb([255, 255, 255]));
    }

    #[test]
    fn vertical_text_stays_above_baseline() {
        let mut image = RgbImage::from_pixel(20, 40, Rgb([255, 255, 255]));
        draw_text_vertical(&mut image, 2, 30, "I", 1, INK);
        let inked: Vec<u32> = image
            .enumerate_pixels()
            .filter(|(_, _, pixel)| **pixel == INK)
            .map(|(_, y, _)| y)
            .collect();
        assert!(!inked.is_empty());
        assert!(inked.iter().all(|y| *y < 30 && *y >= 25));
    }
}
