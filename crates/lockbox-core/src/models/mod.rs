pub mod attachment;
pub mod upload;

pub use attachment::{Attachment, AttachmentResponse};
pub use upload::RawUpload;
