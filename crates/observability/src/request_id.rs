use uuid::Uuid;

/// Header carrying the correlation id on requests and responses.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_LEN: usize = 128;

/// Fresh, time-ordered request id.
pub fn generate() -> String {
    Uuid::now_v7().to_string()
}

/// Accept a caller-supplied id if it is short, non-empty, visible ASCII.
pub fn sanitize(raw: &str) -> Option<&str> {
    let id = raw.trim();
    let ok = !id.is_empty() && id.len() <= MAX_LEN && id.bytes().all(|b| b.is_ascii_graphic());
    ok.then_some(id)
}

/// Id to use for a request: the caller's if acceptable, otherwise a new one.
pub fn resolve(incoming: Option<&str>) -> String {
    incoming
        .and_then(sanitize)
        .map(str::to_owned)
        .unwrap_or_else(generate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_v7() {
        let id = Uuid::parse_str(&generate()).unwrap();
        assert_eq!(id.get_version_num(), 7);
    }

    #[test]
    fn caller_ids_are_kept_when_sane() {
        assert_eq!(resolve(Some(" abc-123 ")), "abc-123");
    }

    #[test]
    fn unusable_caller_ids_are_replaced() {
        assert_ne!(resolve(Some("has space")), "has space");
        assert_ne!(resolve(Some("")), "");
        let long = "x".repeat(MAX_LEN + 1);
        assert_ne!(resolve(Some(&long)), long);
    }
}
