//! 外部ツール呼び出し

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result, anyhow, bail};

/// 実行ファイルと同じディレクトリ（外部ツールの既定の配置先）
pub fn default_bin_dir() -> Result<PathBuf> {
    let me = std::env::current_exe().context("failed to locate current executable")?;
    let dir = me.parent().with_context(|| format!("{} has no parent directory", me.display()))?;
    Ok(dir.to_path_buf())
}

/// `bin_dir/name` が存在するか確認して絶対パスを返す
pub fn resolve_tool(bin_dir: &Path, name: &str) -> Result<PathBuf> {
    let path = bin_dir.join(name);
    if !path.is_file() {
        bail!("external tool not found: {}", path.display());
    }
    fs::canonicalize(&path).with_context(|| format!("failed to resolve {}", path.display()))
}

/// コマンドを実行し、非ゼロ終了をエラーにする
pub fn run_step(step: &str, cmd: &mut Command) -> Result<()> {
    log::info!("[{step}] {cmd:?}");
    let status = cmd.status().with_context(|| format!("failed to spawn {step}"))?;
    if !status.success() {
        bail!("{step} exited with status {status}");
    }
    Ok(())
}

/// stdout を自プロセスの stdout と `log_path` の両方へ流しながら実行する（`| tee`）
pub fn run_step_tee(step: &str, cmd: &mut Command, log_path: &Path) -> Result<()> {
    log::info!("[{step}] {cmd:?} | tee {}", log_path.display());
    let mut log =
        File::create(log_path).with_context(|| format!("failed to create {}", log_path.display()))?;
    let mut child = cmd
        .stdout(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to spawn {step}"))?;
    let mut stdout = child.stdout.take().ok_or_else(|| anyhow!("failed to capture {step} stdout"))?;

    let copied = copy_tee(&mut stdout, &mut log, log_path);
    drop(stdout);
    if let Err(e) = copied {
        // 子プロセスを残さない
        let _ = child.kill();
        let _ = child.wait();
        return Err(e.context(format!("{step} aborted")));
    }

    let status = child.wait().with_context(|| format!("failed to wait for {step}"))?;
    if !status.success() {
        bail!("{step} exited with status {status}");
    }
    Ok(())
}

fn copy_tee<R: Read, W: Write>(src: &mut R, log: &mut W, log_path: &Path) -> Result<()> {
    let mut console = io::stdout();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = src.read(&mut buf).context("failed to read child output")?;
        if n == 0 {
            break;
        }
        log.write_all(&buf[..n]).with_context(|| format!("failed to write {}", log_path.display()))?;
        // console への書き込み失敗（パイプ切断等）でログ採取は止めない
        let _ = console.write_all(&buf[..n]);
    }
    log.flush().with_context(|| format!("failed to write {}", log_path.display()))?;
    let _ = console.flush();
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn run_step_reports_exit_status() {
        run_step("true", &mut Command::new("true")).unwrap();
        let err = run_step("false", &mut Command::new("false")).unwrap_err();
        assert!(err.to_string().starts_with("false exited with status"));
    }

    #[test]
    fn tee_captures_merged_output() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("train.log");
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("echo out; echo err 1>&2; exit 0").stderr(Stdio::null());
        run_step_tee("echo", &mut cmd, &log).unwrap();
        assert_eq!(fs::read_to_string(&log).unwrap(), "out\n");

        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("exec 2>&1; echo out; echo err 1>&2; exit 3");
        let err = run_step_tee("failing", &mut cmd, &log).unwrap_err();
        assert!(err.to_string().contains("failing exited"));
        assert_eq!(fs::read_to_string(&log).unwrap(), "out\nerr\n");
    }

    struct BrokenLog;

    impl Write for BrokenLog {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk full"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn copy_tee_stops_on_log_write_error() {
        let mut src: &[u8] = b"Iteration 0, Testing net (#0)\n";
        let err = copy_tee(&mut src, &mut BrokenLog, Path::new("train.log")).unwrap_err();
        assert_eq!(err.to_string(), "failed to write train.log");
    }

    // /dev/full は open できるが write が必ず ENOSPC になる
    #[cfg(target_os = "linux")]
    #[test]
    fn tee_kills_child_when_log_write_fails() {
        let mut cmd = Command::new("yes");
        let err = run_step_tee("yes", &mut cmd, Path::new("/dev/full")).unwrap_err();
        assert_eq!(err.to_string(), "yes aborted");
        assert!(format!("{err:#}").contains("failed to write /dev/full"));
    }

    #[test]
    fn resolve_tool_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_tool(dir.path(), "import-images").unwrap_err();
        assert!(err.to_string().contains("external tool not found"));

        fs::write(dir.path().join("import-images"), "").unwrap();
        let path = resolve_tool(dir.path(), "import-images").unwrap();
        assert!(path.is_absolute());
    }
}
