use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_TENANT, INTERNAL_ADMIN_USERNAME, WILDCARD_TENANT};

/// Identity on whose behalf an operation runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserInfo {
    pub tenant_id: String,
    pub username: Option<String>,
    pub allowed_tenants: Vec<String>,
}

impl UserInfo {
    pub fn new(tenant_id: impl Into<String>, username: Option<String>) -> Self {
        let tenant_id = tenant_id.into();
        Self {
            allowed_tenants: vec![tenant_id.clone(), DEFAULT_TENANT.to_string()],
            tenant_id,
            username,
        }
    }

    /// Identity used for system generated work such as faucet funding.
    pub fn internal_admin() -> Self {
        Self {
            tenant_id: DEFAULT_TENANT.to_string(),
            username: Some(INTERNAL_ADMIN_USERNAME.to_string()),
            allowed_tenants: vec![WILDCARD_TENANT.to_string()],
        }
    }

    pub fn is_internal_admin(&self) -> bool {
        self.allowed_tenants.iter().any(|t| t == WILDCARD_TENANT)
    }

    pub fn can_access(&self, tenant_id: &str) -> bool {
        self.is_internal_admin() || self.allowed_tenants.iter().any(|t| t == tenant_id)
    }

    /// Tenant filter for searches, `None` meaning every tenant.
    pub fn tenant_filter(&self) -> Option<Vec<String>> {
        if self.is_internal_admin() {
            None
        } else {
            Some(self.allowed_tenants.clone())
        }
    }
}
