//! Domain entities - the core business objects.

mod post;
mod profile;
mod upload;
mod user;

pub use post::{Post, PostDraft, PostStatus, PostStatusKind, PublicPost, resolve_author};
pub use profile::Profile;
pub use upload::{MAX_IMAGE_BYTES, image_object_path, sanitize_extension, validate_image};
pub use user::User;
