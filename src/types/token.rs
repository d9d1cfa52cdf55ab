use serde::{Deserialize, Serialize};

use super::user::UserView;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub user: UserView,
    pub token: String,
    pub expire_in: usize,
}
