//! Stream geometry extraction via ffprobe

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tubely_core::StreamGeometry;

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("ffprobe failed: {0}")]
    Failed(String),

    #[error("ffprobe reported no streams")]
    NoStreams,

    #[error("ffprobe did not finish within {0:?}")]
    Timeout(Duration),
}

/// Reads the geometry of the primary stream of a local media file
#[async_trait]
pub trait ContentProber: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<StreamGeometry, ProbeError>;
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    width: Option<i64>,
    height: Option<i64>,
}

/// Parse `ffprobe -print_format json -show_streams` output.
///
/// Only the first stream is looked at, and it must carry positive dimensions.
pub fn parse_probe_output(stdout: &[u8]) -> Result<StreamGeometry, ProbeError> {
    let output: FfprobeOutput = serde_json::from_slice(stdout)
        .map_err(|e| ProbeError::Failed(format!("unparseable output: {}", e)))?;

    let stream = output.streams.first().ok_or(ProbeError::NoStreams)?;

    let dimension = |value: Option<i64>, name: &str| {
        value
            .filter(|v| *v > 0)
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| ProbeError::Failed(format!("first stream has no valid {}", name)))
    };

    Ok(StreamGeometry::new(
        dimension(stream.width, "width")?,
        dimension(stream.height, "height")?,
    ))
}

/// [`ContentProber`] backed by the ffprobe binary
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    program: String,
    timeout: Duration,
}

impl FfprobeProber {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

#[async_trait]
impl ContentProber for FfprobeProber {
    #[tracing::instrument(skip(self), fields(
        process.executable.path = %self.program,
        ffmpeg.operation = "probe"
    ))]
    async fn probe(&self, path: &Path) -> Result<StreamGeometry, ProbeError> {
        let start = std::time::Instant::now();

        let mut command = Command::new(&self.program);
        command
            .args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Dropping the output future on timeout kills the child.
        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(result) => {
                result.map_err(|e| ProbeError::Failed(format!("failed to run {}: {}", self.program, e)))?
            }
            Err(_) => {
                tracing::warn!(timeout_ms = self.timeout.as_millis(), "ffprobe timed out");
                return Err(ProbeError::Timeout(self.timeout));
            }
        };

        if !output.status.success() {
            return Err(ProbeError::Failed(format!(
                "exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let geometry = parse_probe_output(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            width = geometry.width,
            height = geometry.height,
            "Video probe completed"
        );

        Ok(geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_first_stream() {
        let out = br#"{"streams":[{"index":0,"codec_type":"video","width":1920,"height":1080},{"index":1,"codec_type":"audio"}]}"#;
        assert_eq!(
            parse_probe_output(out).unwrap(),
            StreamGeometry::new(1920, 1080)
        );
    }

    #[test]
    fn test_parse_no_streams() {
        assert!(matches!(
            parse_probe_output(br#"{"streams":[]}"#),
            Err(ProbeError::NoStreams)
        ));
        assert!(matches!(
            parse_probe_output(b"{}"),
            Err(ProbeError::NoStreams)
        ));
    }

    #[test]
    fn test_parse_rejects_missing_or_zero_dimensions() {
        assert!(matches!(
            parse_probe_output(br#"{"streams":[{"codec_type":"audio"}]}"#),
            Err(ProbeError::Failed(_))
        ));
        assert!(matches!(
            parse_probe_output(br#"{"streams":[{"width":1280,"height":0}]}"#),
            Err(ProbeError::Failed(_))
        ));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            parse_probe_output(b"not json"),
            Err(ProbeError::Failed(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_binary_is_probe_failure() {
        let prober = FfprobeProber::new(
            "/nonexistent/tubely-ffprobe",
            Duration::from_secs(5),
        );
        let result = prober.probe(Path::new("/tmp/does-not-matter.mp4")).await;
        assert!(matches!(result, Err(ProbeError::Failed(_))));
    }

    #[cfg(unix)]
    mod scripted {
        use super::*;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        fn fake_ffprobe(dir: &TempDir, body: &str) -> String {
            let path = dir.path().join("ffprobe");
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path.to_string_lossy().to_string()
        }

        #[tokio::test]
        async fn test_probe_reads_script_output() {
            let dir = tempfile::tempdir().unwrap();
            let program = fake_ffprobe(
                &dir,
                r#"echo '{"streams":[{"width":1080,"height":1920}]}'"#,
            );

            let prober = FfprobeProber::new(program, Duration::from_secs(10));
            let geometry = prober.probe(Path::new("video.mp4")).await.unwrap();
            assert_eq!(geometry, StreamGeometry::new(1080, 1920));
        }

        #[tokio::test]
        async fn test_probe_non_zero_exit() {
            let dir = tempfile::tempdir().unwrap();
            let program = fake_ffprobe(&dir, "echo 'moov atom not found' >&2\nexit 1");

            let prober = FfprobeProber::new(program, Duration::from_secs(10));
            match prober.probe(Path::new("video.mp4")).await {
                Err(ProbeError::Failed(msg)) => assert!(msg.contains("moov atom not found")),
                other => panic!("expected probe failure, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_probe_timeout() {
            let dir = tempfile::tempdir().unwrap();
            let program = fake_ffprobe(&dir, "sleep 10");

            let prober = FfprobeProber::new(program, Duration::from_millis(200));
            let start = std::time::Instant::now();
            let result = prober.probe(Path::new("video.mp4")).await;

            assert!(matches!(result, Err(ProbeError::Timeout(_))));
            assert!(start.elapsed() < Duration::from_secs(5));
        }
    }
}
