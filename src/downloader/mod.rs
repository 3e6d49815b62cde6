mod client;

pub use client::{
    BatchOutcome, BatchProgressFn, DownloadEntry, DownloadProgress, Downloader, ProgressFn,
};
