// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use crate::lesson::Lesson;

pub const WIDTH: u32 = 1280;
pub const HEIGHT: u32 = 720;

const TOP: [u8; 3] = [0, 20, 60];
const BOTTOM: [u8; 3] = [0, 0, 20];
const BORDER: [u8; 3] = [60, 60, 90];
const FOOTER: [u8; 3] = [220, 220, 255];

const MARGIN: u32 = 80;
const BASELINE: u32 = 600;
const MIN_BAR: u32 = 40;
const MAX_BAR: u32 = 440;
const FOOTER_TOP: u32 = 640;
const FOOTER_HEIGHT: u32 = 20;
const FOOTER_GAP: u32 = 10;

/// One colour per pitch class, starting at C.
const PITCH_COLORS: [[u8; 3]; 12] = [
    [230, 70, 70],
    [230, 130, 60],
    [230, 190, 60],
    [190, 220, 60],
    [100, 210, 80],
    [60, 200, 150],
    [60, 190, 210],
    [70, 140, 230],
    [100, 90, 230],
    [160, 80, 220],
    [210, 80, 190],
    [230, 80, 130],
];

#[derive(Debug, thiserror::Error)]
pub enum ThumbnailError {
    #[error("PNG encoding error: {0}")]
    Encoding(#[from] png::EncodingError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Draws the picture for a lesson and writes it as a PNG. The picture has a bar per lesson note,
/// taller for higher notes, and a footer block per minute of prompt spacing.
pub fn draw(lesson: &Lesson, path: &Path) -> Result<(), ThumbnailError> {
    let canvas = paint(lesson);

    let mut encoder = png::Encoder::new(BufWriter::new(File::create(path)?), WIDTH, HEIGHT);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&canvas.pixels)?;
    writer.finish()?;
    Ok(())
}

fn paint(lesson: &Lesson) -> Canvas {
    let mut canvas = Canvas::new(WIDTH, HEIGHT);

    for y in 0..HEIGHT {
        let t = y as f32 / (HEIGHT - 1) as f32;
        let color: [u8; 3] = std::array::from_fn(|i| lerp(TOP[i], BOTTOM[i], t));
        canvas.fill_rect(0, y, WIDTH, 1, color);
    }

    canvas.fill_rect(10, 10, WIDTH - 20, 2, BORDER);
    canvas.fill_rect(10, HEIGHT - 12, WIDTH - 20, 2, BORDER);
    canvas.fill_rect(10, 10, 2, HEIGHT - 20, BORDER);
    canvas.fill_rect(WIDTH - 12, 10, 2, HEIGHT - 20, BORDER);

    let area = WIDTH - 2 * MARGIN;
    let notes = lesson.notes();
    if !notes.is_empty() {
        let slot = area / notes.len() as u32;
        for (index, note) in notes.iter().enumerate() {
            let midi = note.midi().unwrap_or(60);
            let height = bar_height(midi);
            let x = MARGIN + index as u32 * slot + slot / 5;
            canvas.fill_rect(
                x,
                BASELINE - height,
                slot * 3 / 5,
                height,
                PITCH_COLORS[usize::from(midi % 12)],
            );
        }
    }

    let minutes = lesson.prompt_spacing().div_ceil(60).clamp(1, 30);
    let block = (area - (minutes - 1) * FOOTER_GAP) / minutes;
    for minute in 0..minutes {
        canvas.fill_rect(
            MARGIN + minute * (block + FOOTER_GAP),
            FOOTER_TOP,
            block,
            FOOTER_HEIGHT,
            FOOTER,
        );
    }

    canvas
}

/// Scales the piano range A0..C8 onto the bar heights.
fn bar_height(midi: u8) -> u32 {
    let position = (f32::from(midi.clamp(21, 108)) - 21.0) / (108.0 - 21.0);
    MIN_BAR + (position * (MAX_BAR - MIN_BAR) as f32).round() as u32
}

fn lerp(from: u8, to: u8, t: f32) -> u8 {
    (f32::from(from) + (f32::from(to) - f32::from(from)) * t).round() as u8
}

struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![0; (width * height * 3) as usize],
        }
    }

    /// Fills a rectangle, clipped to the canvas.
    fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: [u8; 3]) {
        let right = x.saturating_add(width).min(self.width);
        let bottom = y.saturating_add(height).min(self.height);
        for row in y..bottom {
            for column in x..right {
                let offset = ((row * self.width + column) * 3) as usize;
                self.pixels[offset..offset + 3].copy_from_slice(&color);
            }
        }
    }

    #[cfg(test)]
    fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let offset = ((y * self.width + x) * 3) as usize;
        [
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::Note;

    fn lesson(notes: &[&str], prompt_spacing: u32) -> Lesson {
        Lesson::new(
            1,
            notes.iter().map(|note| note.parse::<Note>().unwrap()).collect(),
            vec!["piano".to_string()],
            prompt_spacing,
            3,
            10,
        )
        .unwrap()
    }

    #[test]
    fn test_bars_follow_pitch() {
        let canvas = paint(&lesson(&["c4", "a4"], 60));
        let slot = (WIDTH - 2 * MARGIN) / 2;
        let first = MARGIN + slot / 5 + 1;
        let second = MARGIN + slot + slot / 5 + 1;

        assert_eq!(PITCH_COLORS[0], canvas.pixel(first, BASELINE - 1));
        assert_eq!(PITCH_COLORS[9], canvas.pixel(second, BASELINE - 1));

        // The A is higher than the C, so its bar reaches further up.
        let c_top = BASELINE - bar_height(60);
        let a_top = BASELINE - bar_height(69);
        assert!(a_top < c_top);
        assert_eq!(PITCH_COLORS[9], canvas.pixel(second, c_top - 1));
        assert_ne!(PITCH_COLORS[0], canvas.pixel(first, c_top - 1));
    }

    #[test]
    fn test_footer_blocks() {
        let canvas = paint(&lesson(&["c4"], 150));
        let block = (WIDTH - 2 * MARGIN - 2 * FOOTER_GAP) / 3;

        assert_eq!(FOOTER, canvas.pixel(MARGIN, FOOTER_TOP));
        assert_eq!(FOOTER, canvas.pixel(MARGIN + 2 * (block + FOOTER_GAP), FOOTER_TOP));
        assert_ne!(FOOTER, canvas.pixel(MARGIN + block + 1, FOOTER_TOP));
    }

    #[test]
    fn test_background_gradient() {
        let canvas = paint(&lesson(&["c4"], 60));
        assert_eq!(TOP, canvas.pixel(WIDTH / 2, 0));
        assert_eq!(BOTTOM, canvas.pixel(WIDTH / 2, HEIGHT - 1));
    }

    #[test]
    fn test_draw_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lesson.png");
        draw(&lesson(&["c4", "bb3", "f4"], 60), &path).unwrap();

        let decoder = png::Decoder::new(File::open(&path).unwrap());
        let reader = decoder.read_info().unwrap();
        let info = reader.info();
        assert_eq!(WIDTH, info.width);
        assert_eq!(HEIGHT, info.height);
        assert_eq!(png::ColorType::Rgb, info.color_type);
    }
}
