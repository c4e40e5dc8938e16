use std::fs::Permissions;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use gdbpilot_engine::LaunchSpec;
use indoc::indoc;

/// Minimal GDB/MI responder, answering the commands a session issues.
const FAKE_GDB: &str = indoc! {r##"
    #!/bin/sh
    tty=
    for arg in "$@"; do
        case "$arg" in
            --tty=*) tty=${arg#--tty=} ;;
        esac
    done
    echo '=thread-group-added,id="i1"'
    echo '(gdb)'
    while IFS= read -r line; do
        token=${line%%[!0-9]*}
        cmd=${line#"$token"}
        case "$cmd" in
            -file-exec-and-symbols*)
                echo "${token}^done" ;;
            -exec-run)
                echo '=thread-group-started,id="i1",pid="4242"'
                echo "${token}^running"
                echo '*running,thread-id="all"'
                echo '(gdb)'
                echo hello > "${tty:-/dev/stdout}"
                echo '*stopped,reason="exited",exit-code="03"' ;;
            -environment-pwd)
                echo "${token}^done,cwd=\"$PWD\"" ;;
            -gdb-exit)
                echo "${token}^exit"
                exit 0 ;;
            *)
                echo "${token}^error,msg=\"Undefined command\"" ;;
        esac
        echo '(gdb)'
    done
"##};

/// Debugger which never exits on its own.
const STUBBORN_GDB: &str = indoc! {"
    #!/bin/sh
    exec sleep 60
"};

pub struct FakeGdb {
    _dir: tempfile::TempDir,
    path: PathBuf,
}

impl FakeGdb {
    pub fn new() -> Self {
        Self::with_script(FAKE_GDB)
    }

    pub fn stubborn() -> Self {
        Self::with_script(STUBBORN_GDB)
    }

    fn with_script(script: &str) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gdb");

        std::fs::write(&path, script).expect("write");
        std::fs::set_permissions(&path, Permissions::from_mode(0o755)).expect("chmod");

        Self { _dir: dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn spec(&self) -> LaunchSpec {
        LaunchSpec {
            program: self.path.clone(),
            args: Vec::new(),
            env: None,
            current_dir: None,
            inferior_tty: false,
        }
    }
}
