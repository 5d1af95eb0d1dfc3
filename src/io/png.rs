use std::path::Path;

use image::{GrayImage, ImageError, Luma};

use crate::grid::arena::{RowWords, WordArena};

/// Exporte l'état final de la grille en niveaux de gris : noir pour une
/// cellule encore grise (piégée), blanc pour POTW, gris moyen pour les
/// lignes jamais allouées. La première ligne de l'image correspond à la
/// ligne haute de la grille (axe imaginaire vers le haut).
pub fn save_grid_png(
    path: &Path,
    arena: &WordArena,
    rows: &[Option<RowWords>],
    len_x: usize,
) -> Result<(), ImageError> {
    let width = (len_x * 32) as u32;
    let height = rows.len() as u32;
    if width == 0 || height == 0 {
        return Ok(());
    }

    let mut img = GrayImage::new(width, height);
    for (yi, row) in rows.iter().enumerate() {
        let py = height - 1 - yi as u32;
        match row {
            Some(hdl) => {
                for (mi, &w) in arena.words(*hdl).iter().enumerate() {
                    for bit in 0..32u32 {
                        let px = mi as u32 * 32 + bit;
                        let v = if (w >> bit) & 1 == 1 { 255u8 } else { 0u8 };
                        img.put_pixel(px, py, Luma([v]));
                    }
                }
            }
            None => {
                for px in 0..width {
                    img.put_pixel(px, py, Luma([128]));
                }
            }
        }
    }
    img.save(path)
}
