/// Tenant owning resources shared by every tenant.
pub const DEFAULT_TENANT: &str = "_";

pub const WILDCARD_TENANT: &str = "*";

pub const INTERNAL_ADMIN_USERNAME: &str = "internal-admin";
