use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Largest request taken from a single read; anything after it is dropped.
pub const READ_BUFFER_SIZE: usize = 8192;
/// Longest accepted filename in bytes.
pub const MAX_FILENAME_LEN: usize = 255;
/// 10 MiB
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

#[derive(Parser, Debug)]
#[command(version, about = "Upload, list and fetch files over plain HTTP", long_about = None)]
pub struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0")]
    pub address: IpAddr,

    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    /// Directory holding the stored files; must already exist
    #[arg(short, long, default_value = "uploads")]
    pub directory: PathBuf,

    /// Seconds to wait for a client to send its request (0 waits forever)
    #[arg(long, default_value_t = 5)]
    pub read_timeout: u64,

    #[arg(long, default_value_t = READ_BUFFER_SIZE)]
    pub read_buffer_size: usize,

    #[arg(long, default_value_t = MAX_UPLOAD_SIZE)]
    pub max_upload_size: usize,
}

impl Args {
    pub fn limits(&self) -> Limits {
        Limits {
            read_buffer_size: self.read_buffer_size,
            max_upload_size: self.max_upload_size,
            ..Limits::default()
        }
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout > 0).then(|| Duration::from_secs(self.read_timeout))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub read_buffer_size: usize,
    pub max_filename_len: usize,
    pub max_upload_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            read_buffer_size: READ_BUFFER_SIZE,
            max_filename_len: MAX_FILENAME_LEN,
            max_upload_size: MAX_UPLOAD_SIZE,
        }
    }
}
