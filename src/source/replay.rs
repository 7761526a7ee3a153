use super::LandmarkSource;
use crate::error::{PluckError, Result};
use crate::landmarks::LandmarkFrame;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

/// One recorded tick
#[derive(Debug, Deserialize)]
struct ReplayRecord {
    #[serde(default)]
    hands: Vec<LandmarkFrame>,
}

/// Replays a JSON-lines landmark recording, one tick per line:
///
/// ```text
/// {"hands":[{"handedness":"Right","confidence":0.93,"landmarks":[[x,y,z], ...]}]}
/// ```
///
/// Blank lines are skipped. A line that fails to decode or parse becomes a
/// tick with no hands. End of file ends the stream.
pub struct ReplaySource {
    name: String,
    path: PathBuf,
    reader: BufReader<File>,
    buffer: Vec<u8>,
    line_number: u64,
    malformed_lines: u64,
}

impl ReplaySource {
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).await.map_err(|e| {
            PluckError::source(format!("cannot open replay {}: {}", path.display(), e))
        })?;

        debug!("Opened replay file {}", path.display());

        Ok(Self {
            name: format!("replay:{}", path.display()),
            path,
            reader: BufReader::new(file),
            buffer: Vec::new(),
            line_number: 0,
            malformed_lines: 0,
        })
    }

    /// Parse one recorded line into the hands it contains
    pub fn parse_line(line: &str) -> Result<Vec<LandmarkFrame>> {
        let record: ReplayRecord = serde_json::from_str(line)?;
        Ok(record.hands)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines_read(&self) -> u64 {
        self.line_number
    }

    pub fn malformed_lines(&self) -> u64 {
        self.malformed_lines
    }
}

#[async_trait]
impl LandmarkSource for ReplaySource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn next_frame(&mut self) -> Result<Option<Vec<LandmarkFrame>>> {
        loop {
            self.buffer.clear();
            if self.reader.read_until(b'\n', &mut self.buffer).await? == 0 {
                info!(
                    "Replay finished after {} lines ({} malformed)",
                    self.line_number, self.malformed_lines
                );
                return Ok(None);
            }
            self.line_number += 1;

            let parsed = match std::str::from_utf8(&self.buffer) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => Self::parse_line(line.trim_end()),
                Err(e) => Err(PluckError::source(format!("invalid UTF-8: {}", e))),
            };

            return match parsed {
                Ok(hands) => Ok(Some(hands)),
                Err(e) => {
                    self.malformed_lines += 1;
                    warn!(
                        "Skipping malformed replay line {} in {}: {}",
                        self.line_number,
                        self.path.display(),
                        e
                    );
                    Ok(Some(Vec::new()))
                }
            };
        }
    }
}
