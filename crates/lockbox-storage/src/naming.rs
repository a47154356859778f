//! Shared durable-object naming for storage backends.
//!
//! Object names: `{uid}.enc` for the original, `{uid}.preview.enc` for the
//! preview. Both backends must use this module so that metadata recorded
//! against one backend stays retrievable through the other.

use uuid::Uuid;

/// File/object name for an attachment variant.
pub fn object_name(uid: Uuid, preview: bool) -> String {
    if preview {
        format!("{}.preview.enc", uid)
    } else {
        format!("{}.enc", uid)
    }
}

/// Object key rooted under an optional prefix. `"p"` and `"p/"` both yield
/// `p/{name}`; an empty prefix yields the bare name.
pub fn object_key(prefix: &str, uid: Uuid, preview: bool) -> String {
    let name = object_name(uid, preview);
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        name
    } else {
        format!("{}/{}", prefix, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_name_deterministic() {
        let uid = Uuid::new_v4();
        assert_eq!(object_name(uid, false), format!("{}.enc", uid));
        assert_eq!(object_name(uid, true), format!("{}.preview.enc", uid));
    }

    #[test]
    fn test_object_key_prefix_normalization() {
        let uid = Uuid::new_v4();
        assert_eq!(object_key("p", uid, false), format!("p/{}.enc", uid));
        assert_eq!(object_key("p/", uid, false), format!("p/{}.enc", uid));
        assert_eq!(object_key("", uid, false), format!("{}.enc", uid));
        assert_eq!(
            object_key("nested/prefix/", uid, true),
            format!("nested/prefix/{}.preview.enc", uid)
        );
    }
}
