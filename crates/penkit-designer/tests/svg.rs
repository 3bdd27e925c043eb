#[path = "svg/import_files.rs"]
mod import_files;
#[path = "svg/layout.rs"]
mod layout;
