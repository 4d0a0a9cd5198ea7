use serde::Serialize;
use uuid::Uuid;

use crate::services::auth::identity::{Identity, Principal, Role};

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub role: Role,
    pub authorities: Vec<String>,
}

impl From<Identity> for MeResponse {
    fn from(identity: Identity) -> Self {
        let authorities = identity.authorities();
        Self {
            id: identity.id,
            firstname: identity.firstname,
            lastname: identity.lastname,
            email: identity.email,
            role: identity.role,
            authorities,
        }
    }
}
