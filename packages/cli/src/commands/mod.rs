pub mod apply;
pub mod export;
pub mod init;
pub mod new;
pub mod seo;

pub use apply::{apply, ApplyArgs};
pub use export::{export, ExportArgs};
pub use init::{init, InitArgs};
pub use new::{new_page, NewArgs};
pub use seo::{seo, SeoArgs};
