//! Client library for Rhythm Doctor user levels: fetch level packages
//! (.rdzip) from arbitrary URLs, unzip them, and parse the quasi-JSON
//! .rdlevel documents they contain, tolerating the editor's known syntax
//! quirks.

pub mod archive;
pub mod bulk;
pub mod config;
pub mod control;
pub mod download;
pub mod filename;
pub mod http;
pub mod level;
pub mod logging;
pub mod rename;
pub mod sheet;

pub use archive::{download_unzip, unzip_level, AcquireError, ArchiveError};
pub use bulk::{
    download_level_async, download_many, download_unzip_async, get_setlist_urls_async,
    get_sheet_data_async, parse_url_async,
};
pub use control::AbortFlag;
pub use download::{download_level, DownloadError};
pub use filename::{resolve_filename, FilenameError};
pub use http::HttpOptions;
pub use level::{decode_level, parse_rdzip, parse_url, DecodeError, Level, PackageError};
pub use rename::unique_path;
pub use sheet::{get_setlist_urls, get_sheet_data, trim_list, SheetError};
