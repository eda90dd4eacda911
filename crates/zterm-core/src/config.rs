use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub data_dir: PathBuf,
    /// Hide direct-message content in desktop notifications.
    pub hide_private_content: bool,
}

impl CoreConfig {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            hide_private_content: false,
        }
    }

    /// Relative paths (log files and the like) live under the data directory.
    pub fn resolve_path<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::new("zterm_data")
    }
}
