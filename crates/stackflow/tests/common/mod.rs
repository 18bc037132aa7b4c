use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("config")).unwrap();
        Self { root }
    }

    pub fn write_environment(&self, name: &str, content: &str) {
        let path = self.root.path().join("config").join(format!("{}.yml", name));
        fs::write(path, content).unwrap();
    }

    #[allow(dead_code)]
    pub fn write_settings(&self, content: &str) {
        fs::write(self.root.path().join("stackflow.yml"), content).unwrap();
    }

    #[allow(dead_code)]
    pub fn state_file(&self, environment: &str) -> PathBuf {
        self.root
            .path()
            .join(".stackflow")
            .join("state")
            .join(format!("{}.json", environment))
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }
}
