use axum::Extension;

use crate::api::UserView;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /auth/whoami - The authenticated caller
pub async fn whoami_get(Extension(auth_user): Extension<AuthUser>) -> ApiResult<UserView> {
    Ok(ApiResponse::success(UserView {
        id: auth_user.id,
        username: auth_user.username,
    }))
}
