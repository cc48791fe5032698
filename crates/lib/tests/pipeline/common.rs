//! Shared test helpers for pipeline integration tests.

use std::path::{Path, PathBuf};

use embuild_lib::config::BuildConfiguration;
use embuild_lib::execute::ExecuteConfig;
use embuild_lib::scratch::{FixedScratch, ScratchProvider};
use embuild_lib::task::{TaskContext, TaskOutcome, run_target};
use tempfile::TempDir;

pub use embuild_lib::execute::CollectingSink;

/// A throwaway project: the working directory holds one C source, the
/// `scratch/` base sits outside it and `tools/` holds the fake emcc.
pub struct Project {
  root: TempDir,
  dir_name: String,
}

impl Project {
  pub fn new() -> Self {
    Self::named("project")
  }

  /// A project whose working directory is called `dir_name`.
  pub fn named(dir_name: &str) -> Self {
    let root = TempDir::new().unwrap();
    std::fs::create_dir_all(root.path().join(dir_name).join("src")).unwrap();
    std::fs::create_dir_all(root.path().join("tools")).unwrap();
    std::fs::write(root.path().join(dir_name).join("src/main.c"), "int main() { return 0; }").unwrap();
    Self {
      root,
      dir_name: dir_name.to_string(),
    }
  }

  pub fn cwd(&self) -> PathBuf {
    self.root.path().join(&self.dir_name)
  }

  /// Base directory the default scratch provider allocates under.
  pub fn scratch(&self) -> PathBuf {
    self.root.path().join("scratch")
  }

  /// True once no run has left anything behind under the scratch base.
  pub fn scratch_is_clean(&self) -> bool {
    std::fs::read_dir(self.scratch()).map_or(true, |mut entries| entries.next().is_none())
  }

  pub fn dest(&self, file: &str) -> PathBuf {
    self.cwd().join("dist").join(file)
  }

  /// Install a fake emcc running `body` and return the `emcc` setting for it.
  pub fn fake_emcc(&self, body: &str) -> String {
    let script = self.root.path().join("tools/emcc.sh");
    std::fs::write(&script, format!("#!/bin/sh\n{}\n", body)).unwrap();
    format!("/bin/sh {}", script.display())
  }

  pub fn config(&self, body: &str) -> BuildConfiguration {
    let mut config = BuildConfiguration::new("app", vec!["src/*.c".into()], "dist");
    config.options.emcc = self.fake_emcc(body);
    config.options.llvm = None;
    config
  }

  pub fn write_dest(&self, file: &str, contents: &str) {
    let path = self.dest(file);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
  }

  pub async fn build(&self, config: &BuildConfiguration, sink: &CollectingSink) -> TaskOutcome {
    self.build_with(config, sink, &FixedScratch::new(self.scratch())).await
  }

  pub async fn build_with(
    &self,
    config: &BuildConfiguration,
    sink: &CollectingSink,
    scratch: &dyn ScratchProvider,
  ) -> TaskOutcome {
    let ctx = TaskContext {
      cwd: self.cwd(),
      scratch,
      sink,
      execute: ExecuteConfig::default(),
    };
    run_target(config, &ctx).await.unwrap()
  }
}

pub fn display(path: &Path) -> String {
  path.display().to_string()
}
