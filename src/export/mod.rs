//! Report export

pub mod json;

pub use json::{
    read_existing_analysis, read_existing_images, write_json, ImageReportJson, REPORT_FILE_NAME,
};
