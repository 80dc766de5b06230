use crate::{Error, Result};

/// The parts of the page URL the behaviors read: scheme, host, path and the
/// fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LocationParts {
    pub(crate) scheme: String,
    pub(crate) hostname: String,
    pub(crate) port: String,
    pub(crate) pathname: String,
    pub(crate) search: String,
    pub(crate) hash: String,
}

impl LocationParts {
    pub(crate) fn protocol(&self) -> String {
        format!("{}:", self.scheme)
    }

    pub(crate) fn host(&self) -> String {
        if self.port.is_empty() {
            self.hostname.clone()
        } else {
            format!("{}:{}", self.hostname, self.port)
        }
    }

    pub(crate) fn href(&self) -> String {
        format!(
            "{}//{}{}{}{}",
            self.protocol(),
            self.host(),
            self.pathname,
            self.search,
            self.hash
        )
    }

    /// Sets the fragment. `value` may carry the leading `#` or not; an empty
    /// fragment clears it.
    pub(crate) fn set_hash(&mut self, value: &str) {
        let bare = value.strip_prefix('#').unwrap_or(value);
        self.hash = if bare.is_empty() {
            String::new()
        } else {
            format!("#{bare}")
        };
    }

    pub(crate) fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let invalid = || Error::Config(format!("document_url is not an absolute url: {input}"));
        let scheme_end = trimmed.find(':').ok_or_else(invalid)?;
        let scheme = trimmed[..scheme_end].to_ascii_lowercase();
        if !is_valid_url_scheme(&scheme) {
            return Err(invalid());
        }
        let rest = trimmed[scheme_end + 1..]
            .strip_prefix("//")
            .ok_or_else(invalid)?;
        let authority_end = rest
            .find(|ch| ['/', '?', '#'].contains(&ch))
            .unwrap_or(rest.len());
        let authority = &rest[..authority_end];
        let (hostname, port) = match authority.rsplit_once(':') {
            Some((host, port)) if port.chars().all(|ch| ch.is_ascii_digit()) => {
                (host.to_ascii_lowercase(), port.to_string())
            }
            _ => (authority.to_ascii_lowercase(), String::new()),
        };
        let (pathname, search, hash) = split_path_search_hash(&rest[authority_end..]);
        Ok(Self {
            scheme,
            hostname,
            port,
            pathname: if pathname.is_empty() {
                "/".to_string()
            } else {
                pathname
            },
            search,
            hash,
        })
    }
}

fn is_valid_url_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    chars.next().is_some_and(|ch| ch.is_ascii_alphabetic())
        && chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.'))
}

fn split_path_search_hash(tail: &str) -> (String, String, String) {
    let (before_hash, hash) = match tail.find('#') {
        Some(pos) => (&tail[..pos], tail[pos..].to_string()),
        None => (tail, String::new()),
    };
    let (path, search) = match before_hash.find('?') {
        Some(pos) => (&before_hash[..pos], before_hash[pos..].to_string()),
        None => (before_hash, String::new()),
    };
    // A bare "#" is no fragment at all.
    let hash = if hash == "#" { String::new() } else { hash };
    (path.to_string(), search, hash)
}
