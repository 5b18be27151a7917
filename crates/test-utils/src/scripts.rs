#![allow(dead_code)]

//! Shell scripts standing in for the build toolchain and the debug server.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Marker file: while it exists in the workspace, the fake toolchain fails.
pub const FAIL_BUILD_MARKER: &str = "fail-build";

/// `go build -o OUT PKG`: writes a long-running shell "binary" to OUT.
const FAKE_TOOLCHAIN: &str = r#"#!/bin/sh
if [ "$1" != "build" ]; then
    echo "unexpected command: $*" >&2
    exit 2
fi
if [ -e fail-build ]; then
    echo "$4/main.go:3:2: undefined: x" >&2
    exit 1
fi
out="$3"
mkdir -p "$(dirname "$out")"
printf '#!/bin/sh\necho app running\nexec sleep 30\n' > "$out"
chmod +x "$out"
echo "built $4"
"#;

/// `dlv exec BIN --headless --listen=HOST:PORT ...`: announces the listen
/// address on stderr and becomes the binary.
const FAKE_DEBUG_SERVER: &str = r#"#!/bin/sh
echo "API server listening at: ${4#--listen=}" >&2
exec "$2"
"#;

/// Write an executable script and return its path.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).expect("write script");
    let mut perms = fs::metadata(&path).expect("script metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod script");
    path
}

/// Fake build toolchain in `dir`.
pub fn fake_toolchain(dir: &Path) -> PathBuf {
    write_script(dir, "fake-go", FAKE_TOOLCHAIN)
}

/// Fake headless debug server in `dir`.
pub fn fake_debug_server(dir: &Path) -> PathBuf {
    write_script(dir, "fake-dlv", FAKE_DEBUG_SERVER)
}

/// Lay out a minimal Go-style workspace: `cmd/http/main.go` and
/// `internal/`.
pub fn scaffold_workspace(root: &Path) {
    fs::create_dir_all(root.join("cmd/http")).expect("create cmd/http");
    fs::create_dir_all(root.join("internal")).expect("create internal");
    fs::write(root.join("cmd/http/main.go"), "package main\n\nfunc main() {}\n")
        .expect("write main.go");
}
