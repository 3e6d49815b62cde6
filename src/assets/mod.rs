mod pipeline;

pub use pipeline::{
    download_all_assets, object_relative_path, object_url, AssetIndexFile, AssetObject,
    AssetOutcome, AssetProgressFn,
};
