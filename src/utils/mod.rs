//! Helpers shared across models and services.
use uuid::Uuid;

/// Random identifier for jobs, schedules, requests and generated idempotency keys.
pub fn generate_uuid() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_uuids_are_distinct_v4() {
        let first = generate_uuid();
        let second = generate_uuid();

        assert_ne!(first, second);
        assert_eq!(Uuid::parse_str(&first).unwrap().get_version_num(), 4);
    }
}
