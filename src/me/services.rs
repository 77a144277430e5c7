use std::time::Duration;

use anyhow::Context;
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::repo_types::User;
use crate::state::AppState;

/// Presigned links to profile pictures stay valid this long.
pub const PICTURE_URL_TTL: Duration = Duration::from_secs(10 * 60);

pub fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

pub fn picture_key(user_id: Uuid, picture_id: Uuid, ext: &str) -> String {
    format!("users/{}/avatar-{}.{}", user_id, picture_id, ext)
}

/// Uploads a new profile picture and points the user at it. The previous
/// object is removed on a best-effort basis.
pub async fn replace_profile_picture(
    st: &AppState,
    user: &User,
    body: Bytes,
    content_type: &str,
) -> anyhow::Result<String> {
    let ext = ext_from_mime(content_type)
        .with_context(|| format!("unsupported content type {}", content_type))?;
    let key = picture_key(user.id, Uuid::new_v4(), ext);

    st.pictures.upload(&key, body, content_type).await?;
    User::set_profile_picture(&st.db, user.id, &key).await?;

    if let Some(old) = user.profile_picture_key.as_deref() {
        if let Err(e) = st.pictures.remove(old).await {
            warn!(error = %e, key = %old, "old profile picture not deleted");
        }
    }

    info!(user_id = %user.id, %key, "profile picture replaced");
    Ok(key)
}

pub async fn presign_picture(st: &AppState, key: &str) -> anyhow::Result<String> {
    st.pictures.signed_url(key, PICTURE_URL_TTL).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ext_from_mime() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/jpg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("image/heic"), Some("heic"));
        assert_eq!(ext_from_mime("application/octet-stream"), None);
    }

    #[test]
    fn picture_keys_are_scoped_by_user() {
        let user = Uuid::new_v4();
        let pic = Uuid::new_v4();
        assert_eq!(
            picture_key(user, pic, "png"),
            format!("users/{user}/avatar-{pic}.png")
        );
    }

    #[tokio::test]
    async fn picture_links_use_the_key_and_ten_minute_ttl() {
        let state = AppState::fake();
        let url = presign_picture(&state, "users/u/avatar-a.jpg").await.unwrap();
        assert!(url.contains("users/u/avatar-a.jpg"));
        assert!(url.ends_with("ttl=600"));
    }
}
