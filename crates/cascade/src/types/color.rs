//! RGBA color values.
//!
//! Colors are carried through the cascade as opaque values; nothing here
//! mixes or converts them.
//!
//! ```
//! use cascade::types::Color;
//!
//! let overlay = Color::rgb(0, 0, 255).with_alpha(0.5);
//! assert_eq!(overlay, Color::rgba(0, 0, 255, 0.5));
//! assert!(!overlay.is_transparent());
//! ```

/// An RGBA color. Channels are 0-255, alpha is 0.0 (transparent) to 1.0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

impl Color {
    pub fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    pub fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub fn transparent() -> Self {
        Self::rgba(0, 0, 0, 0.0)
    }

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(&self, alpha: f32) -> Self {
        Self { a: alpha, ..*self }
    }

    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }
}
