use std::io::Write;

use crate::error::PredictorError;

/// Taille d'un chunk en octets (1 GiB).
pub const CHUNK_BYTES: usize = 1 << 30;
/// Nombre maximal de chunks ; au-delà, la panne est fatale.
pub const MAX_CHUNKS: usize = 2048;

/// Poignée sur une allocation de mots contigus. Valide jusqu'au prochain
/// `free_all` ; l'arène ne laisse échapper aucun pointeur brut.
#[derive(Clone, Copy, Debug)]
pub struct RowWords {
    chunk: u32,
    offset: u32,
    len: u32,
}

/// Allocateur par gros blocs pour les mots de 32 bits de la grille.
///
/// Un vecteur de chunks possédés plus un curseur « bump » : une allocation
/// de n mots avance le curseur du chunk courant ; quand il reste moins de
/// n + 2 mots, un nouveau chunk est ouvert. `free_all` lâche tout d'un coup
/// entre deux niveaux de raffinement — toutes les poignées antérieures sont
/// alors invalides.
pub struct WordArena {
    chunks: Vec<Vec<u32>>,
    chunk_words: usize,
    cursor: usize,
}

impl WordArena {
    pub fn new() -> Self {
        Self::with_chunk_words(CHUNK_BYTES / std::mem::size_of::<u32>())
    }

    /// Taille de chunk réduite pour les tests de débordement.
    pub fn with_chunk_words(chunk_words: usize) -> Self {
        WordArena {
            chunks: Vec::new(),
            chunk_words,
            cursor: 0,
        }
    }

    /// Alloue `words` mots contigus, mis à zéro.
    pub fn alloc(&mut self, words: usize) -> Result<RowWords, PredictorError> {
        if self.chunks.len() >= MAX_CHUNKS - 8 {
            return Err(PredictorError::OutOfChunks { chunks: self.chunks.len() });
        }
        if self.chunks.is_empty() || self.cursor + words + 2 >= self.chunk_words {
            // Jalon visible : chaque chunk d'un gigaoctet s'annonce.
            print!("x");
            let _ = std::io::stdout().flush();
            self.chunks.push(vec![0u32; self.chunk_words]);
            self.cursor = 0;
        }
        let handle = RowWords {
            chunk: (self.chunks.len() - 1) as u32,
            offset: self.cursor as u32,
            len: words as u32,
        };
        self.cursor += words;
        Ok(handle)
    }

    #[inline]
    pub fn words(&self, h: RowWords) -> &[u32] {
        let start = h.offset as usize;
        &self.chunks[h.chunk as usize][start..start + h.len as usize]
    }

    #[inline]
    pub fn words_mut(&mut self, h: RowWords) -> &mut [u32] {
        let start = h.offset as usize;
        &mut self.chunks[h.chunk as usize][start..start + h.len as usize]
    }

    /// Libère tous les chunks. Les poignées émises auparavant ne doivent
    /// plus être utilisées.
    pub fn free_all(&mut self) {
        self.chunks.clear();
        self.cursor = 0;
    }

    #[allow(dead_code)]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }
}

impl Default for WordArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocations_are_zeroed_and_disjoint() {
        let mut arena = WordArena::with_chunk_words(64);
        let a = arena.alloc(8).unwrap();
        let b = arena.alloc(8).unwrap();
        arena.words_mut(a).fill(0xdead_beef);
        assert!(arena.words(b).iter().all(|&w| w == 0));
        assert!(arena.words(a).iter().all(|&w| w == 0xdead_beef));
    }

    #[test]
    fn overflow_opens_a_new_chunk() {
        // 16 mots par chunk, garde de 2 : trois allocations de 6 mots ne
        // tiennent pas dans un seul chunk.
        let mut arena = WordArena::with_chunk_words(16);
        let _a = arena.alloc(6).unwrap();
        let _b = arena.alloc(6).unwrap();
        assert_eq!(arena.chunk_count(), 1);
        let c = arena.alloc(6).unwrap();
        assert_eq!(arena.chunk_count(), 2);
        assert_eq!(arena.words(c).len(), 6);
    }

    #[test]
    fn free_all_resets_everything() {
        let mut arena = WordArena::with_chunk_words(32);
        let _ = arena.alloc(8).unwrap();
        arena.free_all();
        assert_eq!(arena.chunk_count(), 0);
        // L'arène reste utilisable après libération.
        let h = arena.alloc(4).unwrap();
        assert_eq!(arena.words(h).len(), 4);
    }
}
