use std::{
    fs,
    path::{Path, PathBuf},
};

use strum_macros::{AsRefStr, Display, EnumString};

use super::{PlotError, Result};

/// File format of the figures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Format {
    #[default]
    Png,
    Fits,
}

/// Where and how figures are written
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    path: PathBuf,
    format: Format,
}
impl Output {
    pub fn new<P: AsRef<Path>>(path: P, format: Format) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            format,
        }
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
    pub fn format(&self) -> Format {
        self.format
    }
    /// File of the figure `name`, creating the output folder if needed
    pub fn filename(&self, name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.path)
            .map_err(|e| PlotError::CreateDir(e, self.path.clone()))?;
        Ok(self.path.join(format!("{name}.{}", self.format)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_follows_format() {
        let dir = tempfile::tempdir().unwrap();
        let output = Output::new(dir.path().join("fits"), Format::Fits);
        assert_eq!(
            output.filename("image").unwrap(),
            dir.path().join("fits").join("image.fits")
        );
        assert!(dir.path().join("fits").is_dir());
        assert_eq!("png".parse::<Format>().unwrap(), Format::Png);
    }
}
