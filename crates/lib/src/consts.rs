pub const APP_NAME: &str = "embuild";

/// Task file looked up in the working directory when none is given.
pub const DEFAULT_TASK_FILE: &str = "embuild.json";

/// Environment variable through which emcc locates its LLVM binaries.
pub const LLVM_ENV_VAR: &str = "LLVM";

/// emcc refuses to write an output path without this extension.
pub const SCRIPT_EXT: &str = ".js";

pub const DEFAULT_EMCC: &str = "emcc";
pub const DEFAULT_LLVM: &str = "/usr/local/bin/";
