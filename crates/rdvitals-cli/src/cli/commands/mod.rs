pub mod download;
pub mod parse;
pub mod sheet;
pub mod unzip;
