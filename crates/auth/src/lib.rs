use apotheca_domain::Role;
use http::HeaderMap;
use http::header;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub role: Role,
    pub pharmacy_id: Option<i64>,
    pub practitioner_id: Option<i64>,
    pub patient_id: Option<i64>,
    pub supervisor_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct AuthError {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for AuthError {}

impl SessionContext {
    // The session cookie is written by the login collaborator; this code
    // only reads it. Resolved once per request and passed down explicitly.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AuthError> {
        let role_raw = cookie_value(headers, "role").ok_or_else(|| AuthError {
            code: "ERR_SESSION_REQUIRED",
            message: "missing role in session cookie".to_string(),
        })?;

        let role = Role::parse(&role_raw).ok_or_else(|| AuthError {
            code: "ERR_SESSION_INVALID",
            message: format!("unknown session role {}", role_raw),
        })?;

        Ok(Self {
            role,
            pharmacy_id: id_cookie(headers, "pharmacy_id")?,
            practitioner_id: id_cookie(headers, "practitioner_id")?,
            patient_id: id_cookie(headers, "patient_id")?,
            supervisor_id: id_cookie(headers, "supervisor_id")?,
        })
    }
}

pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn id_cookie(headers: &HeaderMap, name: &'static str) -> Result<Option<i64>, AuthError> {
    match cookie_value(headers, name) {
        None => Ok(None),
        Some(raw) => raw.parse::<i64>().map(Some).map_err(|_| AuthError {
            code: "ERR_SESSION_INVALID",
            message: format!("session {} must be an integer", name),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers_with_cookie(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn parses_role_and_tenant_ids() {
        let headers = headers_with_cookie("role=pharmacy; pharmacy_id=7");
        let ctx = SessionContext::from_headers(&headers).expect("session should parse");
        assert_eq!(ctx.role, Role::Pharmacy);
        assert_eq!(ctx.pharmacy_id, Some(7));
        assert_eq!(ctx.practitioner_id, None);
    }

    #[test]
    fn missing_role_is_session_required() {
        let headers = headers_with_cookie("pharmacy_id=7");
        let err = SessionContext::from_headers(&headers).unwrap_err();
        assert_eq!(err.code, "ERR_SESSION_REQUIRED");

        let err = SessionContext::from_headers(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.code, "ERR_SESSION_REQUIRED");
    }

    #[test]
    fn unknown_role_is_session_invalid() {
        let headers = headers_with_cookie("role=auditor");
        let err = SessionContext::from_headers(&headers).unwrap_err();
        assert_eq!(err.code, "ERR_SESSION_INVALID");
    }

    #[test]
    fn non_numeric_id_is_session_invalid() {
        let headers = headers_with_cookie("role=pharmacy; pharmacy_id=seven");
        let err = SessionContext::from_headers(&headers).unwrap_err();
        assert_eq!(err.code, "ERR_SESSION_INVALID");
    }

    #[test]
    fn cookie_value_spans_multiple_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(
            header::COOKIE,
            HeaderValue::from_static("role=administrator"),
        );
        assert_eq!(
            cookie_value(&headers, "role").as_deref(),
            Some("administrator")
        );
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn empty_cookie_value_reads_as_absent() {
        let headers = headers_with_cookie("role=pharmacy; pharmacy_id=");
        let ctx = SessionContext::from_headers(&headers).expect("session should parse");
        assert_eq!(ctx.pharmacy_id, None);
    }
}
