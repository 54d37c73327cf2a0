use eframe::egui::{self, Color32, Pos2, Rect, Stroke};

use crate::models::{LineStyle, NotebookColor, NotebookTheme, TextureStyle};

/// Colors used to skin one notebook.
#[derive(Debug, Clone, Copy)]
pub struct Swatch {
    pub cover: Color32,
    pub border: Color32,
    pub accent: Color32,
    pub line: Color32,
    pub spine: Color32,
}

pub fn swatch(color: NotebookColor) -> Swatch {
    match color {
        NotebookColor::Pink => Swatch {
            cover: Color32::from_rgb(0xfc, 0xe7, 0xf3),
            border: Color32::from_rgb(0xfb, 0xcf, 0xe8),
            accent: Color32::from_rgb(0xec, 0x48, 0x99),
            line: Color32::from_rgb(0xfe, 0xcd, 0xd3),
            spine: Color32::from_rgb(0xf4, 0x72, 0xb6),
        },
        NotebookColor::Mint => Swatch {
            cover: Color32::from_rgb(0xd1, 0xfa, 0xe5),
            border: Color32::from_rgb(0xa7, 0xf3, 0xd0),
            accent: Color32::from_rgb(0x10, 0xb9, 0x81),
            line: Color32::from_rgb(0xa7, 0xf3, 0xd0),
            spine: Color32::from_rgb(0x34, 0xd3, 0x99),
        },
        NotebookColor::Lavender => Swatch {
            cover: Color32::from_rgb(0xf3, 0xe8, 0xff),
            border: Color32::from_rgb(0xe9, 0xd5, 0xff),
            accent: Color32::from_rgb(0xa8, 0x55, 0xf7),
            line: Color32::from_rgb(0xdd, 0xd6, 0xfe),
            spine: Color32::from_rgb(0xc0, 0x84, 0xfc),
        },
        NotebookColor::Lemon => Swatch {
            cover: Color32::from_rgb(0xfe, 0xf9, 0xc3),
            border: Color32::from_rgb(0xfe, 0xf0, 0x8a),
            accent: Color32::from_rgb(0xea, 0xb3, 0x08),
            line: Color32::from_rgb(0xfe, 0xf0, 0x8a),
            spine: Color32::from_rgb(0xfa, 0xcc, 0x15),
        },
        NotebookColor::Sky => Swatch {
            cover: Color32::from_rgb(0xe0, 0xf2, 0xfe),
            border: Color32::from_rgb(0xba, 0xe6, 0xfd),
            accent: Color32::from_rgb(0x0e, 0xa5, 0xe9),
            line: Color32::from_rgb(0xba, 0xe6, 0xfd),
            spine: Color32::from_rgb(0x38, 0xbd, 0xf8),
        },
    }
}

/// Distance between ruled lines (or dot rows); `None` for blank paper.
pub fn line_spacing(style: LineStyle) -> Option<f32> {
    match style {
        LineStyle::College | LineStyle::Dotted => Some(32.0),
        LineStyle::Wide => Some(48.0),
        LineStyle::Blank => None,
    }
}

/// Font size that keeps a line of text roughly inside one ruled row.
pub fn body_font_size(style: LineStyle) -> f32 {
    match style {
        LineStyle::Wide => 26.0,
        _ => 20.0,
    }
}

pub fn paint_paper(painter: &egui::Painter, rect: Rect, theme: NotebookTheme) {
    let colors = swatch(theme.color);
    painter.rect_filled(rect, 12.0, Color32::WHITE);
    paint_texture(painter, rect, theme.texture);

    let Some(spacing) = line_spacing(theme.line_style) else {
        return;
    };
    match theme.line_style {
        LineStyle::Dotted => {
            let mut y = rect.top() + spacing;
            while y < rect.bottom() {
                let mut x = rect.left() + spacing;
                while x < rect.right() {
                    painter.circle_filled(Pos2::new(x, y), 1.5, colors.line);
                    x += spacing;
                }
                y += spacing;
            }
        }
        _ => {
            let stroke = Stroke::new(1.0, colors.line);
            let mut y = rect.top() + spacing;
            while y < rect.bottom() {
                painter.hline(rect.x_range(), y, stroke);
                y += spacing;
            }
        }
    }
}

fn paint_texture(painter: &egui::Painter, rect: Rect, texture: TextureStyle) {
    match texture {
        TextureStyle::Plain => {}
        TextureStyle::Grain => {
            // fixed pseudo-random fibres so the paper doesn't shimmer between frames
            let tint = Color32::from_black_alpha(10);
            let mut seed: u32 = 0x9e37_79b9;
            let count = ((rect.width() * rect.height()) / 900.0) as usize;
            for _ in 0..count {
                seed ^= seed << 13;
                seed ^= seed >> 17;
                seed ^= seed << 5;
                let fx = (seed & 0xffff) as f32 / 65535.0;
                let fy = (seed >> 16) as f32 / 65535.0;
                let start = Pos2::new(rect.left() + fx * rect.width(), rect.top() + fy * rect.height());
                painter.line_segment([start, start + egui::vec2(3.0, 1.0)], Stroke::new(1.0, tint));
            }
        }
        TextureStyle::Grid => {
            let tint = Color32::from_black_alpha(14);
            let step = 8.0;
            let mut y = rect.top() + step / 2.0;
            while y < rect.bottom() {
                let mut x = rect.left() + step / 2.0;
                while x < rect.right() {
                    painter.circle_filled(Pos2::new(x, y), 0.6, tint);
                    x += step;
                }
                y += step;
            }
        }
    }
}
