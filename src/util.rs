use std::path::PathBuf;

pub const BOARD_REL_PATH: &str = "database/board_ascii.txt";
pub const HARBOR_REL_PATH: &str = "database/harbors.txt";

pub fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn default_paths() -> (PathBuf, PathBuf) {
    let root = repo_root();
    (root.join(BOARD_REL_PATH), root.join(HARBOR_REL_PATH))
}
