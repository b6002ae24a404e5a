//! Shared fixtures: scripted git repositories built through libgit2

#![allow(dead_code)]

use git2::{Oid, Repository, Signature, Time};
use std::path::Path;
use tempfile::TempDir;

/// Noon UTC on 2021-01-01
pub const JAN_1: i64 = 1_609_502_400;
pub const DAY: i64 = 86_400;

pub struct TestRepo {
    pub dir: TempDir,
    pub repo: Repository,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = Repository::init(dir.path()).expect("git init");
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Commit the given files (`None` deletes) at `epoch` seconds, UTC.
    pub fn commit(&self, epoch: i64, message: &str, files: &[(&str, Option<&str>)]) -> Oid {
        let mut index = self.repo.index().expect("index");
        for (name, content) in files {
            let full = self.path().join(name);
            match content {
                Some(body) => {
                    if let Some(parent) = full.parent() {
                        std::fs::create_dir_all(parent).expect("mkdir");
                    }
                    std::fs::write(&full, body).expect("write");
                    index.add_path(Path::new(name)).expect("add");
                }
                None => {
                    std::fs::remove_file(&full).expect("remove");
                    index.remove_path(Path::new(name)).expect("rm");
                }
            }
        }
        index.write().expect("write index");
        let tree_id = index.write_tree().expect("write tree");
        let tree = self.repo.find_tree(tree_id).expect("tree");

        let sig = Signature::new("Test User", "test@example.com", &Time::new(epoch, 0))
            .expect("signature");
        let parent = self
            .repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("commit")
    }
}

/// Three commits: a page and a script, a service, then the script removed.
pub fn sample_repo() -> TestRepo {
    let repo = TestRepo::new();
    repo.commit(
        JAN_1,
        "Initial commit",
        &[
            ("index.html", Some("<html>\n<body>\n</html>\n")),
            ("js/main.js", Some("init();\nrun();\n")),
        ],
    );
    repo.commit(
        JAN_1 + 4 * DAY,
        "feat: add api service",
        &[("js/services/api.js", Some("a\nb\nc\nd\n"))],
    );
    repo.commit(
        JAN_1 + 31 * DAY,
        "refactor: remove main, pay down tech debt",
        &[("js/main.js", None)],
    );
    repo
}
