use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Journal d'exécution : chaque ligne de progression est à la fois affichée
/// sur la sortie standard et ajoutée au fichier journal (mode append).
pub struct RunLog {
    file: File,
}

impl RunLog {
    pub fn open(path: &Path) -> io::Result<Self> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        // Séparateur entre exécutions, dans le fichier seulement.
        let _ = writeln!(file, "\n-----------------");
        Ok(RunLog { file })
    }

    /// Ligne complète, console + fichier.
    pub fn line(&mut self, msg: &str) {
        println!("{msg}");
        let _ = writeln!(self.file, "{msg}");
        let _ = self.file.flush();
    }

    /// Fragment sans fin de ligne, console + fichier.
    pub fn put(&mut self, msg: &str) {
        print!("{msg}");
        let _ = io::stdout().flush();
        let _ = write!(self.file, "{msg}");
        let _ = self.file.flush();
    }

    /// Progression console seulement (niveaux, points de patience).
    pub fn console(&mut self, msg: &str) {
        print!("{msg}");
        let _ = io::stdout().flush();
    }

    pub fn dot(&mut self) {
        self.console(".");
    }
}
