//! Task files driving the pipeline.

use std::fs;

use embuild_lib::config::TaskFile;
use embuild_lib::task::plan_target;

use super::common::{CollectingSink, Project, display};

fn task_file(project: &Project) -> String {
  let emcc = project.fake_emcc("printf '// built' > \"$2\"");
  serde_json::json!({
    "options": {
      "emcc": emcc,
      "llvm": null,
      "o": 2,
      "compilerOptions": { "EXPORTED_FUNCTIONS": ["_main"] }
    },
    "targets": {
      "release": { "srcs": "src/*.c", "dest": "dist/release" },
      "debug": {
        "srcs": ["src/*.c"],
        "dest": "dist/debug",
        "options": { "o": 0, "g": 4, "memoryInitFile": false }
      }
    }
  })
  .to_string()
}

#[tokio::test]
async fn every_target_builds_into_its_destination() {
  let project = Project::new();
  let path = project.cwd().join("embuild.json");
  fs::write(&path, task_file(&project)).unwrap();
  let sink = CollectingSink::default();

  let targets = TaskFile::load(&path).unwrap().targets().unwrap();
  assert_eq!(targets.len(), 2);

  for mut target in targets {
    // Both targets share the base name so the helper's paths line up.
    target.name = "app".into();
    let outcome = project.build(&target, &sink).await;
    assert!(outcome.success);
  }

  assert_eq!(
    fs::read_to_string(project.cwd().join("dist/release/app.js")).unwrap(),
    "// built"
  );
  assert_eq!(
    fs::read_to_string(project.cwd().join("dist/debug/app.js")).unwrap(),
    "// built"
  );
}

#[test]
fn target_options_shape_the_invocation() {
  let project = Project::new();
  let file = TaskFile::parse(&task_file(&project)).unwrap();
  let scratch = project.scratch();

  let release = plan_target(&file.target("release").unwrap(), &project.cwd(), &scratch).unwrap();
  assert_eq!(
    release.args,
    vec![
      format!("-o {}/release.js", display(&scratch)),
      "-O2".to_string(),
      "--memory-init-file 1".to_string(),
      r#"-s "EXPORTED_FUNCTIONS=[\"_main\"]""#.to_string(),
      display(&project.cwd().join("src/main.c")),
    ]
  );
  assert!(release.env.is_empty());

  let debug = plan_target(&file.target("debug").unwrap(), &project.cwd(), &scratch).unwrap();
  assert_eq!(
    debug.args,
    vec![
      format!("-o {}/debug.js", display(&scratch)),
      "-O0".to_string(),
      "-g4".to_string(),
      r#"-s "EXPORTED_FUNCTIONS=[\"_main\"]""#.to_string(),
      display(&project.cwd().join("src/main.c")),
    ]
  );
}
