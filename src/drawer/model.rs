use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const GRAY: Color = Color::rgb(128, 128, 128);
    pub const DARK_GRAY: Color = Color::rgb(169, 169, 169);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 128, 0);
    pub const LIME: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const CYAN: Color = Color::rgb(0, 255, 255);
    pub const MAGENTA: Color = Color::rgb(255, 0, 255);
    pub const ORANGE: Color = Color::rgb(255, 165, 0);
    pub const PURPLE: Color = Color::rgb(128, 0, 128);
    pub const PINK: Color = Color::rgb(255, 192, 203);
    pub const BROWN: Color = Color::rgb(165, 42, 42);
    pub const NAVY: Color = Color::rgb(0, 0, 128);
    pub const TEAL: Color = Color::rgb(0, 128, 128);
    pub const OLIVE: Color = Color::rgb(128, 128, 0);
    pub const MAROON: Color = Color::rgb(128, 0, 0);
    pub const SILVER: Color = Color::rgb(192, 192, 192);
    pub const GOLD: Color = Color::rgb(255, 215, 0);
    pub const INDIGO: Color = Color::rgb(75, 0, 130);
    pub const CORAL: Color = Color::rgb(255, 127, 80);
    pub const TURQUOISE: Color = Color::rgb(64, 224, 208);
    pub const CHARTREUSE: Color = Color::rgb(127, 255, 0);
    pub const CRIMSON: Color = Color::rgb(220, 20, 60);
    pub const ORCHID: Color = Color::rgb(218, 112, 214);
    pub const SKY_BLUE: Color = Color::rgb(135, 206, 235);
    pub const SALMON: Color = Color::rgb(250, 128, 114);
    pub const KHAKI: Color = Color::rgb(240, 230, 140);
    pub const TAN: Color = Color::rgb(210, 180, 140);
    pub const TOMATO: Color = Color::rgb(255, 99, 71);

    /// Named colors, in the order `palette::random_known_color` draws from.
    pub const KNOWN: &'static [(&'static str, Color)] = &[
        ("Black", Color::BLACK),
        ("White", Color::WHITE),
        ("Gray", Color::GRAY),
        ("DarkGray", Color::DARK_GRAY),
        ("Red", Color::RED),
        ("Green", Color::GREEN),
        ("Lime", Color::LIME),
        ("Blue", Color::BLUE),
        ("Yellow", Color::YELLOW),
        ("Cyan", Color::CYAN),
        ("Magenta", Color::MAGENTA),
        ("Orange", Color::ORANGE),
        ("Purple", Color::PURPLE),
        ("Pink", Color::PINK),
        ("Brown", Color::BROWN),
        ("Navy", Color::NAVY),
        ("Teal", Color::TEAL),
        ("Olive", Color::OLIVE),
        ("Maroon", Color::MAROON),
        ("Silver", Color::SILVER),
        ("Gold", Color::GOLD),
        ("Indigo", Color::INDIGO),
        ("Coral", Color::CORAL),
        ("Turquoise", Color::TURQUOISE),
        ("Chartreuse", Color::CHARTREUSE),
        ("Crimson", Color::CRIMSON),
        ("Orchid", Color::ORCHID),
        ("SkyBlue", Color::SKY_BLUE),
        ("Salmon", Color::SALMON),
        ("Khaki", Color::KHAKI),
        ("Tan", Color::TAN),
        ("Tomato", Color::TOMATO),
    ];
}

/// Integer pixel position. `Point::NONE` marks a mouse slot with no data yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const NONE: Point = Point { x: -1, y: -1 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn scaled(self, scale: i32) -> Self {
        Self::new(self.x.saturating_mul(scale), self.y.saturating_mul(scale))
    }

    pub fn scaled_down(self, scale: i32) -> Self {
        let scale = scale.max(1);
        Self::new(self.x / scale, self.y / scale)
    }
}

/// `hi - lo` for `lo < hi`, saturated to `i32::MAX`.
fn span_length(lo: i32, hi: i32) -> i32 {
    (i64::from(hi) - i64::from(lo)).min(i64::from(i32::MAX)) as i32
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn scaled(self, scale: i32) -> Self {
        Self::new(
            self.x.saturating_mul(scale),
            self.y.saturating_mul(scale),
            self.width.saturating_mul(scale),
            self.height.saturating_mul(scale),
        )
    }

    pub fn right(self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Grows the rect by `amount` on every side.
    pub fn inflate(self, amount: i32) -> Self {
        Self::new(
            self.x.saturating_sub(amount),
            self.y.saturating_sub(amount),
            self.width.saturating_add(amount.saturating_mul(2)),
            self.height.saturating_add(amount.saturating_mul(2)),
        )
    }

    /// Intersection with `[0,width)x[0,height)`, or `None` when nothing is left.
    pub fn clamp(self, width: u32, height: u32) -> Option<PixelRect> {
        self.intersect(PixelRect::new(
            0,
            0,
            width.min(i32::MAX as u32) as i32,
            height.min(i32::MAX as u32) as i32,
        ))
    }

    pub fn intersect(self, other: PixelRect) -> Option<PixelRect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(PixelRect::new(
            x0,
            y0,
            span_length(x0, x1),
            span_length(y0, y1),
        ))
    }

    pub fn contains(self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.right() && y < self.bottom()
    }
}
