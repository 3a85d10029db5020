use rand::Rng;

use crate::drawer::model::Color;

const STEP: u8 = 63;

/// One of 64 bright colors: a saturated channel plus two quantized ones.
pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> Color {
    let mut level = || rng.gen_range(0..4u8) * STEP;
    let (a, b) = (level(), level());
    match rng.gen_range(0..3) {
        0 => Color::rgb(255, a, b),
        1 => Color::rgb(a, 255, b),
        _ => Color::rgb(a, b, 255),
    }
}

pub fn random_known_color<R: Rng + ?Sized>(rng: &mut R) -> Color {
    let index = rng.gen_range(0..Color::KNOWN.len());
    Color::KNOWN[index].1
}
