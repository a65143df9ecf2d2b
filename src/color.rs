use glam::Vec2;

/// Luminance above which a backdrop counts as light.
const LIGHT_THRESHOLD: f32 = 0.5;

/// RGBA packed as u32 (`0xRRGGBBAA`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self((r as u32) << 24 | (g as u32) << 16 | (b as u32) << 8 | a as u32)
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    /// Relative luminance (Rec. 709 weights) over channels normalized to [0, 1].
    pub fn luminance(self) -> f32 {
        let r = self.r() as f32 / 255.0;
        let g = self.g() as f32 / 255.0;
        let b = self.b() as f32 / 255.0;
        0.2126 * r + 0.7152 * g + 0.0722 * b
    }
}

/// Dark colors, drawn over light backdrops.
pub const DARK_PALETTE: [Color; 5] = [
    Color::rgba(30, 64, 175, 217),
    Color::rgba(37, 99, 235, 230),
    Color::rgba(15, 23, 42, 191),
    Color::rgba(30, 41, 59, 204),
    Color::rgba(6, 78, 59, 179),
];

/// Light colors, drawn over dark backdrops.
pub const LIGHT_PALETTE: [Color; 5] = [
    Color::rgba(147, 197, 253, 242),
    Color::rgba(186, 230, 253, 230),
    Color::rgba(125, 211, 252, 242),
    Color::rgba(165, 180, 252, 230),
    Color::rgba(255, 255, 255, 204),
];

/// Color every particle starts with, before its first backdrop sample.
pub const INITIAL_COLOR: Color = Color::rgba(59, 130, 246, 230);

// ---------------------------------------------------------------------------
// Hit testing
// ---------------------------------------------------------------------------

/// Background color reported for the topmost content under a point.
#[derive(Debug, Clone, PartialEq)]
pub enum Background {
    /// Color already decoded by the host.
    Rgb(Color),
    /// Textual computed color such as `rgb(12, 34, 56)`.
    Css(String),
    /// Content exists but its color could not be read.
    Unreadable,
}

/// Finds what is rendered underneath the overlay at a screen point.
pub trait HitTest {
    /// `None` when nothing is found at `point`.
    fn background_at(&self, point: Vec2) -> Option<Background>;
}

impl<F> HitTest for F
where
    F: Fn(Vec2) -> Option<Background>,
{
    fn background_at(&self, point: Vec2) -> Option<Background> {
        self(point)
    }
}

/// Extract r, g, b from the first three runs of decimal digits.
/// Runs above 255 saturate. Returns `None` with fewer than three runs.
pub fn parse_rgb(text: &str) -> Option<[u8; 3]> {
    let mut runs = text
        .split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty());

    let mut channels = [0u8; 3];
    for channel in &mut channels {
        let run = runs.next()?;
        *channel = run.parse::<u32>().map_or(u8::MAX, |v| v.min(255) as u8);
    }
    Some(channels)
}

// ---------------------------------------------------------------------------
// Sampler
// ---------------------------------------------------------------------------

/// Luminance class of a backdrop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Light,
    Dark,
}

impl Tone {
    /// Palette that contrasts with this tone.
    pub fn contrasting_palette(self) -> &'static [Color; 5] {
        match self {
            Tone::Light => &DARK_PALETTE,
            Tone::Dark => &LIGHT_PALETTE,
        }
    }
}

/// Picks particle colors that stand out against whatever lies beneath them.
pub struct ColorSampler<H> {
    hit_test: H,
}

impl<H: HitTest> ColorSampler<H> {
    pub fn new(hit_test: H) -> Self {
        Self { hit_test }
    }

    /// Classify the backdrop at `point`. Anything undecidable counts as light.
    pub fn classify(&self, point: Vec2) -> Tone {
        let rgb = match self.hit_test.background_at(point) {
            Some(Background::Rgb(color)) => Some(color),
            Some(Background::Css(text)) => {
                parse_rgb(&text).map(|[r, g, b]| Color::rgba(r, g, b, 255))
            }
            Some(Background::Unreadable) | None => None,
        };

        match rgb {
            Some(color) if color.luminance() <= LIGHT_THRESHOLD => Tone::Dark,
            _ => Tone::Light,
        }
    }

    /// Random palette color contrasting with the backdrop at `point`.
    pub fn sample(&self, point: Vec2, rng: &mut fastrand::Rng) -> Color {
        let palette = self.classify(point).contrasting_palette();
        palette[rng.usize(0..palette.len())]
    }

    pub fn hit_test(&self) -> &H {
        &self.hit_test
    }
}
