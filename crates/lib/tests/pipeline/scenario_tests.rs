//! Build scenarios run through the full pipeline.

use std::fs;
use std::path::Path;

use embuild_lib::config::BuildConfiguration;
use embuild_lib::relocate::{ArtifactKind, Relocation};
use embuild_lib::scratch::{FixedScratch, TempScratch};

use super::common::{CollectingSink, Project, display};

/// A fake emcc that writes a script mentioning the working directory.
fn script_only_emcc(project: &Project) -> BuildConfiguration {
  let body = format!(
    "echo \"compiling $#\"\nprintf '%s' \"load('{}/src/main.c');\" > \"$2\"",
    display(&project.cwd())
  );
  project.config(&body)
}

#[tokio::test]
async fn script_relocated_and_stale_artifacts_removed() {
  let project = Project::new();
  project.write_dest("app.js.mem", "stale memory");
  project.write_dest("app.js.map", "stale map");
  let sink = CollectingSink::default();

  let outcome = project.build(&script_only_emcc(&project), &sink).await;

  assert!(outcome.success);
  assert_eq!(
    fs::read_to_string(project.dest("app.js")).unwrap(),
    "load('src/main.c');"
  );
  assert!(!project.dest("app.js.mem").exists());
  assert!(!project.dest("app.js.map").exists());
  assert_eq!(outcome.relocations.get(ArtifactKind::Script), Some(Relocation::Copied));
  assert_eq!(outcome.relocations.get(ArtifactKind::MemoryInit), Some(Relocation::RemovedStale));
  assert_eq!(outcome.relocations.get(ArtifactKind::SourceMap), Some(Relocation::RemovedStale));
  // -o, path, --memory-init-file, 1, one source
  assert_eq!(sink.stdout_lines(), vec!["compiling 5"]);
  assert!(project.scratch_is_clean());
}

#[tokio::test]
async fn failed_build_copies_nothing_but_cleans_up() {
  let project = Project::new();
  project.write_dest("app.js", "previous script");
  project.write_dest("app.js.map", "previous map");
  let sink = CollectingSink::default();

  let config = project.config("echo 'emcc: error: no input files' >&2\nexit 1");
  let outcome = project.build(&config, &sink).await;

  assert!(!outcome.success);
  assert_eq!(outcome.exit_code, Some(1));
  assert_eq!(sink.stderr_lines(), vec!["emcc: error: no input files"]);
  assert_eq!(outcome.relocations.copied().count(), 0);
  assert!(!project.dest("app.js").exists());
  assert!(!project.dest("app.js.map").exists());
  assert!(project.scratch_is_clean());
}

#[tokio::test]
async fn source_map_paths_made_relative() {
  let project = Project::new();
  let body = format!(
    "dir=$(dirname \"$2\")\n\
     printf '{{\"file\":\"%s/app.js\",\"sources\":[\"%s/src/main.c\"]}}' \"$dir\" '{cwd}' > \"$2.map\"\n\
     printf 'var a;' > \"$2\"\n\
     printf 'MEM' > \"$2.mem\"",
    cwd = display(&project.cwd())
  );
  let sink = CollectingSink::default();

  let outcome = project.build(&project.config(&body), &sink).await;

  assert!(outcome.success);
  assert_eq!(
    fs::read_to_string(project.dest("app.js.map")).unwrap(),
    r#"{"file":"app.js","sources":["/src/main.c"]}"#
  );
  assert_eq!(fs::read_to_string(project.dest("app.js.mem")).unwrap(), "MEM");
  assert_eq!(outcome.relocations.copied().count(), 3);
}

#[tokio::test]
async fn repeated_builds_are_byte_identical() {
  let project = Project::new();
  let body = format!(
    "printf '%s' '{cwd}/src/main.c' > \"$2\"\nprintf '%s' '{cwd}/src/main.c' > \"$2.map\"",
    cwd = display(&project.cwd())
  );
  let config = project.config(&body);
  let sink = CollectingSink::default();

  project.build(&config, &sink).await;
  let first_script = fs::read(project.dest("app.js")).unwrap();
  let first_map = fs::read(project.dest("app.js.map")).unwrap();

  project.build(&config, &sink).await;
  assert_eq!(fs::read(project.dest("app.js")).unwrap(), first_script);
  assert_eq!(fs::read(project.dest("app.js.map")).unwrap(), first_map);
}

#[tokio::test]
async fn compiler_options_reach_the_toolchain_intact() {
  let project = Project::new();
  let mut config = project.config("for arg in \"$@\"; do echo \"$arg\"; done");
  config
    .options
    .compiler_options
    .insert("EXPORTED_FUNCTIONS".into(), serde_json::json!(["_main", "_run"]));
  let sink = CollectingSink::default();

  project.build(&config, &sink).await;

  let args = sink.stdout_lines();
  assert!(args.contains(&"-s".to_string()));
  assert!(args.contains(&r#"EXPORTED_FUNCTIONS=["_main","_run"]"#.to_string()));
  assert_eq!(args.last().unwrap(), &display(&project.cwd().join("src/main.c")));
}

#[tokio::test]
async fn llvm_directory_exported_to_toolchain() {
  let project = Project::new();
  let mut config = project.config("echo \"LLVM=$LLVM\"");
  config.options.llvm = Some("toolchain/llvm/".into());
  let sink = CollectingSink::default();

  project.build(&config, &sink).await;

  assert_eq!(
    sink.stdout_lines(),
    vec![format!("LLVM={}", display(&project.cwd().join("toolchain/llvm")))]
  );
}

#[tokio::test]
async fn disabled_pruning_keeps_previous_artifacts() {
  let project = Project::new();
  project.write_dest("app.js.map", "previous map");
  let mut config = script_only_emcc(&project);
  config.options.prune_stale = false;
  let sink = CollectingSink::default();

  let outcome = project.build(&config, &sink).await;

  assert_eq!(outcome.relocations.get(ArtifactKind::SourceMap), Some(Relocation::KeptStale));
  assert_eq!(fs::read_to_string(project.dest("app.js.map")).unwrap(), "previous map");
}

#[tokio::test]
async fn temp_scratch_removed_after_build() {
  let project = Project::new();
  let config = project.config("dirname \"$2\"\nprintf 'x' > \"$2\"");
  let sink = CollectingSink::default();

  let outcome = project.build_with(&config, &sink, &TempScratch::new()).await;

  assert!(outcome.success);
  let scratch_dir = sink.stdout_lines().pop().unwrap();
  assert!(scratch_dir.contains("embuild-"));
  assert!(!Path::new(&scratch_dir).exists());
  assert!(project.dest("app.js").exists());
}

#[tokio::test]
async fn scratch_base_at_destination_keeps_its_files() {
  let project = Project::new();
  project.write_dest("README.txt", "hand written");
  let config = project.config("printf 'x' > \"$2\"\nprintf '%s' \"$2\" > \"$2.map\"");
  let sink = CollectingSink::default();

  let outcome = project
    .build_with(&config, &sink, &FixedScratch::new(project.cwd().join("dist")))
    .await;

  assert!(outcome.success);
  assert_eq!(fs::read_to_string(project.dest("README.txt")).unwrap(), "hand written");
  assert_eq!(fs::read_to_string(project.dest("app.js")).unwrap(), "x");
  assert_eq!(fs::read_to_string(project.dest("app.js.map")).unwrap(), "app.js");
  let mut left: Vec<String> = fs::read_dir(project.cwd().join("dist"))
    .unwrap()
    .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
    .collect();
  left.sort();
  assert_eq!(left, vec!["README.txt", "app.js", "app.js.map"]);
}

#[tokio::test]
async fn scratch_base_at_working_directory_keeps_the_project() {
  let project = Project::new();
  let config = project.config("printf 'x' > \"$2\"\nprintf '%s' \"$2\" > \"$2.map\"");
  let sink = CollectingSink::default();

  let outcome = project
    .build_with(&config, &sink, &FixedScratch::new(project.cwd().join(".")))
    .await;

  assert!(outcome.success);
  assert!(project.cwd().join("src/main.c").exists());
  assert_eq!(fs::read_to_string(project.dest("app.js.map")).unwrap(), "app.js");
  let leftovers = fs::read_dir(project.cwd())
    .unwrap()
    .filter(|entry| entry.as_ref().unwrap().file_name().to_string_lossy().starts_with("embuild-"))
    .count();
  assert_eq!(leftovers, 0);
}

#[tokio::test]
async fn paths_with_spaces_stay_single_arguments() {
  let project = Project::named("My Project");
  let config = project.config("for arg in \"$@\"; do echo \"[$arg]\"; done\nprintf 'x' > \"$2\"");
  let sink = CollectingSink::default();

  let outcome = project.build(&config, &sink).await;

  assert!(outcome.success);
  let args = sink.stdout_lines();
  assert_eq!(args.last().unwrap(), &format!("[{}]", display(&project.cwd().join("src/main.c"))));
  assert!(!args.iter().any(|arg| arg.ends_with("/My]")));
  assert_eq!(fs::read_to_string(project.dest("app.js")).unwrap(), "x");
}
