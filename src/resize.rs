//! # Image Resize Module
//!
//! Calcolo puro delle dimensioni di output per il resize "bounding box".
//!
//! ## Regole
//! - Nessun resize se entrambe le dimensioni rientrano nel box
//! - Altrimenti scala uniforme `min(max_w / w, max_h / h)`: l'aspect ratio è preservato
//! - Arrotondamento al pixel più vicino, mai sotto 1 pixel
//! - Mai upscaling

use crate::engine::Dimensions;

/// Compute the output size that fits `source` inside `max_width` x `max_height`.
///
/// Returns `None` when the image already fits and must be encoded at its
/// original resolution.
pub fn fit_within(source: Dimensions, max_width: u32, max_height: u32) -> Option<Dimensions> {
    if source.width <= max_width && source.height <= max_height {
        return None;
    }

    let scale = f64::min(
        f64::from(max_width) / f64::from(source.width),
        f64::from(max_height) / f64::from(source.height),
    );

    let scaled = |value: u32, bound: u32| -> u32 {
        ((f64::from(value) * scale).round() as u32).clamp(1, bound)
    };

    Some(Dimensions {
        width: scaled(source.width, max_width),
        height: scaled(source.height, max_height),
    })
}
