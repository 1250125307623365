//! Launcher scripts for directory-style outputs.
//!
//! Browsers block `fetch` from `file://` pages, so external data only loads
//! when Chrome runs with `--allow-file-access-from-files`. The launchers start
//! it that way, pointed at the main HTML file next to them.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;

/// POSIX launcher file name.
pub const SH_LAUNCHER: &str = "open.sh";

/// Windows launcher file name.
pub const BAT_LAUNCHER: &str = "open.bat";

/// Browser flag that lets `file://` pages read sibling files.
pub const FILE_ACCESS_FLAG: &str = "--allow-file-access-from-files";

/// Paths of the written launchers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launchers {
    pub sh: PathBuf,
    pub bat: PathBuf,
}

/// Write `open.sh` and `open.bat` into `dir`, both opening `main_file`
/// (relative to `dir`). Existing launchers are overwritten.
pub fn emit_launchers(dir: &Path, main_file: &str) -> Result<Launchers> {
    fs::create_dir_all(dir)?;

    let sh = dir.join(SH_LAUNCHER);
    fs::write(&sh, sh_script(main_file))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&sh)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&sh, perms)?;
    }

    let bat = dir.join(BAT_LAUNCHER);
    fs::write(&bat, bat_script(main_file))?;

    debug!(dir = %dir.display(), main_file, "Wrote launchers");
    Ok(Launchers { sh, bat })
}

/// Single-quote a string for POSIX sh.
fn sh_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

fn sh_script(main_file: &str) -> String {
    format!(
        r#"#!/bin/sh
# Opens {name} in Chrome with local file access enabled.
DIR="$(cd "$(dirname "$0")" && pwd)"
TARGET="$DIR"/{target}
FLAG={flag}

for candidate in google-chrome google-chrome-stable chromium chromium-browser chrome; do
    if command -v "$candidate" >/dev/null 2>&1; then
        exec "$candidate" "$FLAG" "$TARGET"
    fi
done

MAC_CHROME="/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"
if [ -x "$MAC_CHROME" ]; then
    exec "$MAC_CHROME" "$FLAG" "$TARGET"
fi

echo "Chrome not found. Open $TARGET in a browser started with $FLAG" >&2
exit 1
"#,
        name = main_file.replace(['\n', '\r'], " "),
        target = sh_quote(main_file),
        flag = FILE_ACCESS_FLAG,
    )
}

fn bat_script(main_file: &str) -> String {
    let windows_path = main_file.replace('/', "\\").replace('"', "");
    [
        "@echo off".to_string(),
        format!(
            "start \"\" chrome {} \"%~dp0{}\"",
            FILE_ACCESS_FLAG, windows_path
        ),
        String::new(),
    ]
    .join("\r\n")
}
